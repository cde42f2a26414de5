use super::*;
use crate::models::{Assignment, Course, Enrollment, NotificationTemplate, Session};
use crate::search::FilterState;
use crate::store::PortalEntity;

fn users() -> Vec<CurrentUser> {
    vec![
        CurrentUser::new("FAC1", "Dr. Maya Chen", Role::Faculty),
        CurrentUser::new("FAC2", "Prof. Omar Haddad", Role::Faculty),
        CurrentUser::new("STU1", "Ana Lima", Role::Student),
        CurrentUser::new("STU3", "Chloe Martin", Role::Student),
        CurrentUser::new("PAR1", "Rosa Lima", Role::Parent).with_wards(vec!["STU1".into()]),
        CurrentUser::guest(),
    ]
}

fn admin() -> CurrentUser {
    CurrentUser::new("ADM1", "Admin", Role::Admin)
}

fn ids<E: PortalEntity>(portal: &Portal, user: &CurrentUser) -> Vec<String> {
    portal
        .query::<E>(user, &FilterState::default())
        .into_iter()
        .map(|r| r.id().to_string())
        .collect()
}

#[test]
fn test_admin_sees_a_superset_of_every_role() {
    let portal = Portal::seeded();
    let admin_summary = portal.summary(&admin());
    let super_admin = CurrentUser::new("ROOT", "Root", Role::SuperAdmin);
    let super_summary = portal.summary(&super_admin);

    for user in users() {
        for (mine, all) in portal.summary(&user).iter().zip(&admin_summary) {
            assert_eq!(mine.kind, all.kind);
            assert!(mine.visible <= all.visible, "{:?} for {}", mine.kind, user.id);
        }
    }
    for (a, s) in admin_summary.iter().zip(&super_summary) {
        assert_eq!(a.visible, s.visible);
    }
    assert_eq!(admin_summary[0].visible, portal.courses().len());
}

#[test]
fn test_guest_sees_nothing() {
    let portal = Portal::seeded();
    for kind in portal.summary(&CurrentUser::guest()) {
        assert_eq!(kind.visible, 0, "{:?}", kind.kind);
    }
}

#[test]
fn test_faculty_sees_only_owned_courses() {
    let portal = Portal::seeded();
    let fac1 = CurrentUser::new("FAC1", "Dr. Maya Chen", Role::Faculty);
    let fac2 = CurrentUser::new("FAC2", "Prof. Omar Haddad", Role::Faculty);

    assert_eq!(ids::<Course>(&portal, &fac1), vec!["C001", "C002", "C005"]);
    assert_eq!(ids::<Course>(&portal, &fac2), vec!["C003", "C004"]);

    // Enrollments follow course ownership.
    let enrollments = portal.query::<Enrollment>(&fac2, &FilterState::default());
    assert!(enrollments.iter().all(|e| e.course_id == "C003" || e.course_id == "C004"));
}

#[test]
fn test_student_sees_published_or_enrolled_courses() {
    let portal = Portal::seeded();
    let stu = CurrentUser::new("STU3", "Chloe Martin", Role::Student);

    // C002 is a draft and C005 only has a withdrawn enrollment.
    assert_eq!(ids::<Course>(&portal, &stu), vec!["C001", "C003", "C004"]);
    assert_eq!(ids::<Enrollment>(&portal, &stu).len(), 2);
}

#[test]
fn test_course_content_needs_enrollment_and_publication() {
    let portal = Portal::seeded();
    let enrolled = CurrentUser::new("STU1", "Ana Lima", Role::Student);
    let outsider = CurrentUser::new("STU9", "Sam", Role::Student);

    assert_eq!(ids::<Session>(&portal, &enrolled), vec!["S001"]);
    assert!(ids::<Session>(&portal, &outsider).is_empty());
    // A002 is a draft in a course STU1 is not enrolled in.
    assert_eq!(ids::<Assignment>(&portal, &enrolled), vec!["A001"]);
}

#[test]
fn test_templates_are_private_to_their_author() {
    let portal = Portal::seeded();
    let author = CurrentUser::new("FAC1", "Dr. Maya Chen", Role::Faculty);
    let other = CurrentUser::new("FAC2", "Prof. Omar Haddad", Role::Faculty);
    let student = CurrentUser::new("STU1", "Ana Lima", Role::Student);

    assert_eq!(ids::<NotificationTemplate>(&portal, &author).len(), 1);
    assert!(ids::<NotificationTemplate>(&portal, &other).is_empty());
    assert!(ids::<NotificationTemplate>(&portal, &student).is_empty());
}

#[test]
fn test_empty_user_id_owns_nothing() {
    let portal = Portal::new();
    let anonymous = CurrentUser::new("", "Nobody", Role::Faculty);
    let viewer = portal.viewer(&anonymous);
    assert!(!viewer.is_owner(""));
    assert!(!viewer.is_owner("FAC1"));
}

#[test]
fn test_editable_implies_visible() {
    let portal = Portal::seeded();
    for user in users() {
        let viewer = portal.viewer(&user);
        for course in portal.courses().list() {
            if is_editable(course, &viewer) {
                assert!(is_visible(course, &viewer));
            }
        }
    }
}

#[test]
fn test_withdrawn_enrollment_does_not_link_course() {
    let portal = Portal::seeded();
    let viewer = portal.viewer(&CurrentUser::new("STU3", "Chloe Martin", Role::Student));
    assert!(viewer.is_linked_course("C003"));
    assert!(!viewer.is_linked_course("C005"));
}
