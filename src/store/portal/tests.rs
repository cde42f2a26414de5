use super::*;
use crate::models::{CourseForm, CourseStatus, EnrollmentForm, NotificationForm};

fn admin() -> CurrentUser {
    CurrentUser::new("ADM1", "Admin", Role::Admin)
}

fn faculty(id: &str) -> CurrentUser {
    CurrentUser::new(id, format!("Faculty {}", id), Role::Faculty)
}

fn student(id: &str) -> CurrentUser {
    CurrentUser::new(id, format!("Student {}", id), Role::Student)
}

fn course_form(name: &str, status: CourseStatus, mode: EnrollmentMode) -> CourseForm {
    CourseForm {
        name: Some(name.into()),
        code: Some(format!("{}-1", name)),
        category: Some("Science".into()),
        status: Some(status),
        enrollment_mode: Some(mode),
        ..Default::default()
    }
}

fn visible_course_ids(portal: &Portal, user: &CurrentUser) -> Vec<String> {
    portal
        .query::<Course>(user, &FilterState::default())
        .into_iter()
        .map(|c| c.id.clone())
        .collect()
}

#[test]
fn test_draft_course_appears_once_activated() {
    let mut portal = Portal::seeded();
    let stu = student("STU9");
    assert!(!visible_course_ids(&portal, &stu).contains(&"C002".to_string()));

    portal
        .update::<Course>(
            &admin(),
            "C002",
            CourseForm {
                status: Some(CourseStatus::Active),
                ..Default::default()
            },
        )
        .unwrap();

    assert!(visible_course_ids(&portal, &stu).contains(&"C002".to_string()));
}

#[test]
fn test_invalid_create_leaves_store_unchanged() {
    let mut portal = Portal::seeded();
    let before = portal.store::<Notification>().len();
    let revision = portal.revision();

    let err = portal
        .create::<Notification>(
            &admin(),
            NotificationForm {
                title: Some(String::new()),
                ..Default::default()
            },
        )
        .unwrap_err();

    let fields: Vec<_> = err.field_errors().iter().map(|f| f.field.as_str()).collect();
    assert!(fields.contains(&"title"));
    assert!(fields.contains(&"content"));
    assert_eq!(portal.store::<Notification>().len(), before);
    assert_eq!(portal.revision(), revision);
}

#[test]
fn test_role_permissions_gate_mutations() {
    let mut portal = Portal::new();
    let form = course_form("Physics", CourseStatus::Active, EnrollmentMode::Open);

    let parent = CurrentUser::new("PAR1", "Rosa", Role::Parent).with_wards(vec!["STU1".into()]);
    for user in [CurrentUser::guest(), parent, student("STU1")] {
        assert!(matches!(
            portal.create::<Course>(&user, form.clone()),
            Err(AppError::Forbidden(_))
        ));
    }
    assert!(portal.courses().is_empty());

    // Permission is checked before validation.
    assert!(matches!(
        portal.create::<Course>(&CurrentUser::guest(), CourseForm::default()),
        Err(AppError::Forbidden(_))
    ));
}

#[test]
fn test_faculty_owns_what_it_creates() {
    let mut portal = Portal::new();
    let owner = faculty("FAC1");
    let mut form = course_form("Physics", CourseStatus::Active, EnrollmentMode::Open);
    form.owner_id = Some("FAC2".into());

    let course = portal.create::<Course>(&owner, form).unwrap();
    assert_eq!(course.owner_id, "FAC1");
    assert_eq!(course.faculty, "Faculty FAC1");

    // Another faculty member can neither see nor edit it.
    let other = faculty("FAC2");
    assert!(visible_course_ids(&portal, &other).is_empty());
    let result = portal.update::<Course>(&other, &course.id, CourseForm::default());
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(!portal.delete::<Course>(&other, &course.id).unwrap());
    assert_eq!(portal.courses().len(), 1);
}

#[test]
fn test_update_missing_record_is_not_found() {
    let mut portal = Portal::new();
    let result = portal.update::<Course>(&admin(), "C404", CourseForm::default());
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(portal.revision(), 0);
}

#[test]
fn test_delete_is_idempotent() {
    let mut portal = Portal::new();
    let course = portal
        .create::<Course>(
            &admin(),
            course_form("Physics", CourseStatus::Draft, EnrollmentMode::Open),
        )
        .unwrap();

    assert!(portal.delete::<Course>(&admin(), &course.id).unwrap());
    let revision = portal.revision();
    assert!(!portal.delete::<Course>(&admin(), &course.id).unwrap());
    assert!(!portal.delete::<Course>(&admin(), "C999").unwrap());
    assert_eq!(portal.revision(), revision);
}

#[test]
fn test_subscribers_see_each_commit() {
    let mut portal = Portal::new();
    let mut changes = portal.subscribe();
    assert_eq!(*changes.borrow_and_update(), 0);

    portal
        .create::<Course>(
            &admin(),
            course_form("Physics", CourseStatus::Draft, EnrollmentMode::Open),
        )
        .unwrap();
    assert!(changes.has_changed().unwrap());
    assert_eq!(*changes.borrow_and_update(), 1);

    // Failed mutations publish nothing.
    let _ = portal.create::<Course>(&admin(), CourseForm::default());
    assert!(!changes.has_changed().unwrap());
    assert_eq!(portal.revision(), 1);
}

#[test]
fn test_student_self_enrollment_follows_course_mode() {
    let mut portal = Portal::new();
    let open = portal
        .create::<Course>(&admin(), course_form("Open", CourseStatus::Active, EnrollmentMode::Open))
        .unwrap();
    let approval = portal
        .create::<Course>(
            &admin(),
            course_form("Approval", CourseStatus::Published, EnrollmentMode::Approval),
        )
        .unwrap();
    let invite = portal
        .create::<Course>(
            &admin(),
            course_form("Invite", CourseStatus::Active, EnrollmentMode::InviteOnly),
        )
        .unwrap();
    let draft = portal
        .create::<Course>(&admin(), course_form("Draft", CourseStatus::Draft, EnrollmentMode::Open))
        .unwrap();

    let stu = student("STU1");
    let enroll = |course_id: &str| EnrollmentForm {
        student_id: Some("STU1".into()),
        course_id: Some(course_id.into()),
        progress: Some(80),
        ..Default::default()
    };

    let enrolled = portal.create::<Enrollment>(&stu, enroll(&open.id)).unwrap();
    assert_eq!(enrolled.status, EnrollmentStatus::Enrolled);
    assert_eq!(enrolled.progress, 0);
    assert_eq!(enrolled.student_name, "Student STU1");

    let pending = portal.create::<Enrollment>(&stu, enroll(&approval.id)).unwrap();
    assert_eq!(pending.status, EnrollmentStatus::Pending);

    assert!(portal.create::<Enrollment>(&stu, enroll(&invite.id)).is_err());
    assert!(portal.create::<Enrollment>(&stu, enroll(&draft.id)).is_err());

    let mut someone_else = enroll(&open.id);
    someone_else.student_id = Some("STU2".into());
    assert!(matches!(
        portal.create::<Enrollment>(&stu, someone_else),
        Err(AppError::Forbidden(_))
    ));

    assert_eq!(portal.courses().get(&open.id).unwrap().enrolled, 1);
    assert_eq!(portal.courses().get(&approval.id).unwrap().enrolled, 1);
}

#[test]
fn test_student_may_only_withdraw() {
    let mut portal = Portal::new();
    let course = portal
        .create::<Course>(&admin(), course_form("Open", CourseStatus::Active, EnrollmentMode::Open))
        .unwrap();
    let stu = student("STU1");
    let enrollment = portal
        .create::<Enrollment>(
            &stu,
            EnrollmentForm {
                student_id: Some("STU1".into()),
                course_id: Some(course.id.clone()),
                ..Default::default()
            },
        )
        .unwrap();

    let cheat = EnrollmentForm {
        progress: Some(100),
        ..Default::default()
    };
    assert!(matches!(
        portal.update::<Enrollment>(&stu, &enrollment.id, cheat),
        Err(AppError::Forbidden(_))
    ));

    let withdraw = EnrollmentForm {
        status: Some(EnrollmentStatus::Withdrawn),
        ..Default::default()
    };
    let withdrawn = portal.update::<Enrollment>(&stu, &enrollment.id, withdraw).unwrap();
    assert_eq!(withdrawn.status, EnrollmentStatus::Withdrawn);
    assert_eq!(portal.courses().get(&course.id).unwrap().enrolled, 0);
}

#[test]
fn test_reactivation_respects_capacity() {
    let mut portal = Portal::new();
    let mut form = course_form("Small", CourseStatus::Active, EnrollmentMode::Open);
    form.max_capacity = Some(1);
    let course = portal.create::<Course>(&admin(), form).unwrap();

    let enroll = |student: &str, status: EnrollmentStatus| EnrollmentForm {
        student_id: Some(student.into()),
        course_id: Some(course.id.clone()),
        status: Some(status),
        ..Default::default()
    };
    let withdrawn = portal
        .create::<Enrollment>(&admin(), enroll("S1", EnrollmentStatus::Withdrawn))
        .unwrap();
    portal
        .create::<Enrollment>(&admin(), enroll("S2", EnrollmentStatus::Enrolled))
        .unwrap();

    let reactivate = EnrollmentForm {
        status: Some(EnrollmentStatus::Enrolled),
        ..Default::default()
    };
    let err = portal
        .update::<Enrollment>(&admin(), &withdrawn.id, reactivate)
        .unwrap_err();
    assert_eq!(err.field_errors()[0].field, "courseId");
    assert_eq!(portal.courses().get(&course.id).unwrap().enrolled, 1);
}

#[test]
fn test_parent_sees_wards_enrollments() {
    let portal = Portal::seeded();
    let parent =
        CurrentUser::new("PAR1", "Rosa Lima", Role::Parent).with_wards(vec!["STU1".into()]);

    let enrollments = portal.query::<Enrollment>(&parent, &FilterState::default());
    assert!(!enrollments.is_empty());
    assert!(enrollments.iter().all(|e| e.student_id == "STU1"));

    // Published content of the ward's course, but not of a draft course.
    assert!(portal.find_visible::<Session>(&parent, "S001").is_some());
    assert!(portal.find_visible::<Session>(&parent, "S002").is_none());
}

#[test]
fn test_course_label_falls_back_for_dangling_reference() {
    let portal = Portal::seeded();
    assert_eq!(portal.course_label("C001"), "Introduction to Biology");
    assert_eq!(portal.course_label("C404"), UNKNOWN_COURSE);
}
