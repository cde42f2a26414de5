//! Cross-entity counter synchronization.
//!
//! `Course.enrolled` and `Course.certificatesGenerated` are derived from the
//! enrollment and certificate stores. The hooks here run inside the portal
//! operation that changed the child, and recount every course the child
//! referenced before or after the change. Recounting keeps the counters exact
//! across status edits and course reassignment. A missing course is a no-op.

use super::{Entity, Portal};

pub fn on_child_created<E: Entity>(portal: &mut Portal, child: &E) {
    if let Some(course_id) = child.counted_course() {
        recount_course(portal, course_id);
    }
}

pub fn on_child_updated<E: Entity>(portal: &mut Portal, before: &E, after: &E) {
    let old = before.counted_course();
    let new = after.counted_course();
    if let Some(course_id) = old {
        recount_course(portal, course_id);
    }
    if let Some(course_id) = new.filter(|id| Some(*id) != old) {
        recount_course(portal, course_id);
    }
}

pub fn on_child_deleted<E: Entity>(portal: &mut Portal, child: &E) {
    if let Some(course_id) = child.counted_course() {
        recount_course(portal, course_id);
    }
}

/// Recompute the derived counters of one course from its children.
pub fn recount_course(portal: &mut Portal, course_id: &str) {
    let enrolled = portal
        .enrollments
        .list()
        .iter()
        .filter(|e| e.course_id == course_id && e.status.is_active())
        .count() as u32;
    let certificates = portal
        .certificates
        .list()
        .iter()
        .filter(|c| c.course_id == course_id && c.status.is_generated())
        .count() as u32;

    let updated = portal.courses.modify(course_id, |course| {
        course.enrolled = enrolled;
        course.certificates_generated = certificates;
    });
    if updated.is_none() {
        tracing::debug!(course_id, "counter update skipped for missing course");
    }
}

/// Recompute counters of every course, e.g. after loading demo data.
pub fn recount_all(portal: &mut Portal) {
    let ids: Vec<String> = portal.courses.list().iter().map(|c| c.id.clone()).collect();
    for id in ids {
        recount_course(portal, &id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Certificate, CertificateForm, CertificateStatus, Course, CourseForm, CurrentUser,
        Enrollment, EnrollmentForm, EnrollmentStatus, Role,
    };

    fn admin() -> CurrentUser {
        CurrentUser::new("ADM1", "Admin", Role::Admin)
    }

    fn course(portal: &mut Portal, capacity: u32) -> Course {
        portal
            .create::<Course>(
                &admin(),
                CourseForm {
                    name: Some("Biology".into()),
                    code: Some("BIO-101".into()),
                    category: Some("Science".into()),
                    max_capacity: Some(capacity),
                    ..Default::default()
                },
            )
            .unwrap()
    }

    fn enroll(portal: &mut Portal, course_id: &str, student: &str) -> Enrollment {
        portal
            .create::<Enrollment>(
                &admin(),
                EnrollmentForm {
                    student_id: Some(student.into()),
                    student_name: Some(format!("Student {}", student)),
                    course_id: Some(course_id.into()),
                    ..Default::default()
                },
            )
            .unwrap()
    }

    fn enrolled(portal: &Portal, course_id: &str) -> u32 {
        portal.courses().get(course_id).unwrap().enrolled
    }

    fn expected_enrolled(portal: &Portal, course_id: &str) -> u32 {
        portal
            .enrollments()
            .list()
            .iter()
            .filter(|e| e.course_id == course_id && e.status != EnrollmentStatus::Withdrawn)
            .count() as u32
    }

    #[test]
    fn test_enroll_three_then_delete_one() {
        let mut portal = Portal::new();
        let course = course(&mut portal, 50);

        let first = enroll(&mut portal, &course.id, "STU1");
        enroll(&mut portal, &course.id, "STU2");
        enroll(&mut portal, &course.id, "STU3");
        assert_eq!(enrolled(&portal, &course.id), 3);

        assert!(portal.delete::<Enrollment>(&admin(), &first.id).unwrap());
        assert_eq!(enrolled(&portal, &course.id), 2);
    }

    #[test]
    fn test_counter_matches_children_after_mixed_operations() {
        let mut portal = Portal::new();
        let a = course(&mut portal, 50);
        let b = course(&mut portal, 50);

        let e1 = enroll(&mut portal, &a.id, "S1");
        let e2 = enroll(&mut portal, &a.id, "S2");
        let e3 = enroll(&mut portal, &b.id, "S3");
        portal.delete::<Enrollment>(&admin(), &e2.id).unwrap();
        enroll(&mut portal, &b.id, "S4");

        // Move e1 to course b.
        portal
            .update::<Enrollment>(
                &admin(),
                &e1.id,
                EnrollmentForm {
                    course_id: Some(b.id.clone()),
                    ..Default::default()
                },
            )
            .unwrap();
        // Withdraw e3.
        portal
            .update::<Enrollment>(
                &admin(),
                &e3.id,
                EnrollmentForm {
                    status: Some(EnrollmentStatus::Withdrawn),
                    ..Default::default()
                },
            )
            .unwrap();

        for course in [&a, &b] {
            assert_eq!(
                enrolled(&portal, &course.id),
                expected_enrolled(&portal, &course.id)
            );
        }
        assert_eq!(enrolled(&portal, &a.id), 0);
        assert_eq!(enrolled(&portal, &b.id), 2);
    }

    #[test]
    fn test_certificates_generated_excludes_revoked() {
        let mut portal = Portal::new();
        let course = course(&mut portal, 50);
        let form = |student: &str| CertificateForm {
            student_id: Some(student.into()),
            course_id: Some(course.id.clone()),
            ..Default::default()
        };

        let cert = portal.create::<Certificate>(&admin(), form("S1")).unwrap();
        portal.create::<Certificate>(&admin(), form("S2")).unwrap();
        assert_eq!(portal.courses().get(&course.id).unwrap().certificates_generated, 2);

        portal
            .update::<Certificate>(
                &admin(),
                &cert.id,
                CertificateForm {
                    status: Some(CertificateStatus::Revoked),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(portal.courses().get(&course.id).unwrap().certificates_generated, 1);
    }

    #[test]
    fn test_missing_parent_is_tolerated() {
        let mut portal = Portal::new();
        let course = course(&mut portal, 50);
        let enrollment = enroll(&mut portal, &course.id, "S1");

        assert!(portal.delete::<Course>(&admin(), &course.id).unwrap());
        // The orphaned enrollment can still be edited and deleted.
        portal
            .update::<Enrollment>(
                &admin(),
                &enrollment.id,
                EnrollmentForm {
                    progress: Some(50),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(portal.delete::<Enrollment>(&admin(), &enrollment.id).unwrap());

        let dangling = enroll(&mut portal, "C999", "S2");
        assert_eq!(dangling.course_id, "C999");
    }

    #[test]
    fn test_capacity_is_enforced() {
        let mut portal = Portal::new();
        let course = course(&mut portal, 2);
        enroll(&mut portal, &course.id, "S1");
        enroll(&mut portal, &course.id, "S2");

        let err = portal
            .create::<Enrollment>(
                &admin(),
                EnrollmentForm {
                    student_id: Some("S3".into()),
                    course_id: Some(course.id.clone()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.field_errors()[0].field, "courseId");
        assert_eq!(portal.enrollments().len(), 2);

        // A withdrawn enrollment does not take a seat.
        portal
            .create::<Enrollment>(
                &admin(),
                EnrollmentForm {
                    student_id: Some("S3".into()),
                    course_id: Some(course.id.clone()),
                    status: Some(EnrollmentStatus::Withdrawn),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(enrolled(&portal, &course.id), 2);
    }
}
