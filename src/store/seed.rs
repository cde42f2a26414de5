//! Built-in demo data, loaded when `LMS_SEED_DEMO_DATA` is on.
//!
//! Records go straight into the stores, bypassing role checks. Counters are
//! recomputed by the caller afterwards.

use chrono::{Duration, NaiveDate, Utc};

use super::Portal;
use crate::models::{
    AssessmentForm, AssessmentType, AssignmentForm, Audience, CertificateForm, CourseForm,
    CourseStatus, EnrollmentForm, EnrollmentMode, EnrollmentStatus, LearningPathForm,
    LearningPathStatus, NotificationForm, NotificationStatus, NotificationTemplateForm,
    NotificationType, Priority, SessionForm, SessionStatus, UploadStatus, UploadedFileForm,
    VirtualSessionForm, VirtualSessionStatus, WorkStatus,
};

const FACULTY_ID: &str = "FAC1";
const FACULTY_NAME: &str = "Dr. Maya Chen";
const OTHER_FACULTY_ID: &str = "FAC2";

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn course(
    name: &str,
    code: &str,
    category: &str,
    owner: (&str, &str),
    status: CourseStatus,
    mode: EnrollmentMode,
    capacity: u32,
) -> CourseForm {
    CourseForm {
        name: Some(name.to_string()),
        code: Some(code.to_string()),
        category: Some(category.to_string()),
        description: Some(format!("{} ({})", name, category)),
        owner_id: Some(owner.0.to_string()),
        faculty: Some(owner.1.to_string()),
        enrollment_mode: Some(mode),
        status: Some(status),
        max_capacity: Some(capacity),
    }
}

fn enrollment(
    student: (&str, &str),
    course_id: &str,
    status: EnrollmentStatus,
    progress: u32,
) -> EnrollmentForm {
    EnrollmentForm {
        student_id: Some(student.0.to_string()),
        student_name: Some(student.1.to_string()),
        course_id: Some(course_id.to_string()),
        status: Some(status),
        progress: Some(progress),
    }
}

pub(crate) fn load(portal: &mut Portal) {
    let now = Utc::now();
    let faculty = (FACULTY_ID, FACULTY_NAME);
    let other = (OTHER_FACULTY_ID, "Prof. Omar Haddad");

    for form in [
        course(
            "Introduction to Biology",
            "BIO-101",
            "Science",
            faculty,
            CourseStatus::Active,
            EnrollmentMode::Open,
            30,
        ),
        course(
            "Organic Chemistry",
            "CHEM-201",
            "Science",
            faculty,
            CourseStatus::Draft,
            EnrollmentMode::Open,
            25,
        ),
        course(
            "World History",
            "HIST-110",
            "Humanities",
            other,
            CourseStatus::Published,
            EnrollmentMode::Approval,
            40,
        ),
        course(
            "Creative Writing",
            "ENG-210",
            "Languages",
            other,
            CourseStatus::Active,
            EnrollmentMode::InviteOnly,
            15,
        ),
        course(
            "Statistics Basics",
            "MATH-150",
            "Mathematics",
            faculty,
            CourseStatus::Archived,
            EnrollmentMode::Open,
            30,
        ),
    ] {
        portal.courses.create(form, now);
    }

    let ana = ("STU1", "Ana Lima");
    let ben = ("STU2", "Ben Okafor");
    let chloe = ("STU3", "Chloe Martin");
    for form in [
        enrollment(ana, "C001", EnrollmentStatus::Enrolled, 40),
        enrollment(ana, "C004", EnrollmentStatus::Enrolled, 10),
        enrollment(ben, "C001", EnrollmentStatus::Completed, 100),
        enrollment(ben, "C003", EnrollmentStatus::Pending, 0),
        enrollment(chloe, "C003", EnrollmentStatus::Enrolled, 65),
        enrollment(chloe, "C005", EnrollmentStatus::Withdrawn, 20),
    ] {
        portal.enrollments.create(form, now);
    }

    let notifications = [
        (
            "Welcome to the new term",
            NotificationType::Announcement,
            Priority::Medium,
            Audience::All,
            NotificationStatus::Sent,
        ),
        (
            "Lab safety briefing",
            NotificationType::Reminder,
            Priority::High,
            Audience::Students,
            NotificationStatus::Draft,
        ),
        (
            "Parent-teacher evening",
            NotificationType::Event,
            Priority::Medium,
            Audience::Parents,
            NotificationStatus::Sent,
        ),
        (
            "Grading deadline",
            NotificationType::Alert,
            Priority::Urgent,
            Audience::Faculty,
            NotificationStatus::Scheduled,
        ),
    ];
    for (title, notification_type, priority, recipients, status) in notifications {
        let form = NotificationForm {
            title: Some(title.to_string()),
            notification_type: Some(notification_type),
            priority: Some(priority),
            recipients: Some(recipients),
            content: Some(format!("{}. Details are posted on the course pages.", title)),
            status: Some(status),
            owner_id: Some(FACULTY_ID.to_string()),
            scheduled_for: (status == NotificationStatus::Scheduled)
                .then(|| now + Duration::days(3)),
        };
        let created = portal.notifications.create(form, now);
        if status == NotificationStatus::Sent {
            portal.notifications.modify(&created.id, |n| n.sent_at = Some(now));
        }
    }

    portal.sessions.create(
        SessionForm {
            course_id: Some("C001".into()),
            title: Some("Cell structure".into()),
            owner_id: Some(FACULTY_ID.into()),
            scheduled_on: date(2026, 9, 14),
            duration_minutes: Some(90),
            objectives: Some(vec![
                "Identify organelles".into(),
                "Compare plant and animal cells".into(),
            ]),
            materials: Some(vec!["Microscope slides".into()]),
            notes: None,
            status: Some(SessionStatus::Published),
        },
        now,
    );
    portal.sessions.create(
        SessionForm {
            course_id: Some("C002".into()),
            title: Some("Functional groups".into()),
            owner_id: Some(FACULTY_ID.into()),
            scheduled_on: date(2026, 10, 2),
            duration_minutes: Some(60),
            objectives: Some(vec!["Name common functional groups".into()]),
            materials: None,
            notes: Some("Prepare model kits".into()),
            status: Some(SessionStatus::Draft),
        },
        now,
    );

    portal.assignments.create(
        AssignmentForm {
            course_id: Some("C001".into()),
            title: Some("Microscopy report".into()),
            description: Some("Describe three samples observed in the lab".into()),
            owner_id: Some(FACULTY_ID.into()),
            due_date: date(2026, 10, 20),
            max_points: Some(50),
            status: Some(WorkStatus::Active),
        },
        now,
    );
    portal.assignments.create(
        AssignmentForm {
            course_id: Some("C003".into()),
            title: Some("Primary source essay".into()),
            description: Some("Analyse one primary source from the reading list".into()),
            owner_id: Some(OTHER_FACULTY_ID.into()),
            due_date: date(2026, 11, 5),
            max_points: Some(100),
            status: Some(WorkStatus::Draft),
        },
        now,
    );

    portal.assessments.create(
        AssessmentForm {
            course_id: Some("C001".into()),
            title: Some("Unit 1 quiz".into()),
            assessment_type: Some(AssessmentType::Quiz),
            owner_id: Some(FACULTY_ID.into()),
            duration_minutes: Some(20),
            total_marks: Some(20),
            passing_marks: Some(12),
            status: Some(WorkStatus::Active),
        },
        now,
    );
    portal.assessments.create(
        AssessmentForm {
            course_id: Some("C003".into()),
            title: Some("Midterm exam".into()),
            assessment_type: Some(AssessmentType::Exam),
            owner_id: Some(OTHER_FACULTY_ID.into()),
            duration_minutes: Some(120),
            total_marks: Some(100),
            passing_marks: Some(50),
            status: Some(WorkStatus::Draft),
        },
        now,
    );

    portal.certificates.create(
        CertificateForm {
            student_id: Some(ben.0.into()),
            student_name: Some(ben.1.into()),
            course_id: Some("C001".into()),
            title: None,
            status: None,
            expires_on: date(2029, 6, 30),
        },
        now,
    );

    portal.virtual_sessions.create(
        VirtualSessionForm {
            course_id: Some("C001".into()),
            title: Some("Office hours".into()),
            owner_id: Some(FACULTY_ID.into()),
            platform: Some("Zoom".into()),
            starts_at: Some(now + Duration::days(2)),
            duration_minutes: Some(45),
            meeting_url: Some("https://meet.example.edu/bio-101".into()),
            status: Some(VirtualSessionStatus::Scheduled),
        },
        now,
    );

    portal.learning_paths.create(
        LearningPathForm {
            title: Some("Life sciences track".into()),
            description: Some("Biology followed by chemistry".into()),
            owner_id: Some(FACULTY_ID.into()),
            course_ids: Some(vec!["C001".into(), "C002".into()]),
            status: Some(LearningPathStatus::Published),
        },
        now,
    );

    portal.templates.create(
        NotificationTemplateForm {
            name: Some("Assignment reminder".into()),
            template_type: Some(NotificationType::Reminder),
            subject: Some("Assignment due soon".into()),
            body: Some("Your assignment is due this week.".into()),
            owner_id: Some(FACULTY_ID.into()),
        },
        now,
    );

    let syllabus = portal.uploads.create(
        UploadedFileForm {
            file_name: Some("bio-101-syllabus.pdf".into()),
            category: Some("Syllabus".into()),
            uploaded_by: Some(FACULTY_ID.into()),
        },
        now,
    );
    portal.uploads.modify(&syllabus.id, |f| {
        f.content_type = "application/pdf".to_string();
        f.size = 48_213;
        f.url = format!("/files/seed/{}", f.file_name);
        f.status = UploadStatus::Approved;
        f.reviewed_by = Some("ADM1".to_string());
        f.reviewed_at = Some(now);
    });

    tracing::info!(
        courses = portal.courses.len(),
        enrollments = portal.enrollments.len(),
        notifications = portal.notifications.len(),
        "demo data loaded"
    );
}

#[cfg(test)]
mod tests {
    use crate::models::{CourseStatus, CurrentUser, Role};
    use crate::store::Portal;

    #[test]
    fn test_seeded_counters_match_enrollments() {
        let portal = Portal::seeded();
        let bio = portal.courses().get("C001").unwrap();
        assert_eq!(bio.enrolled, 2);
        assert_eq!(bio.certificates_generated, 1);
        // Withdrawn enrollments do not count.
        assert_eq!(portal.courses().get("C005").unwrap().enrolled, 0);
        assert_eq!(portal.revision(), 0);
    }

    #[test]
    fn test_seed_has_draft_course_for_visibility_checks() {
        let portal = Portal::seeded();
        assert_eq!(portal.courses().get("C002").unwrap().status, CourseStatus::Draft);

        let admin = CurrentUser::new("ADM1", "Admin", Role::Admin);
        assert_eq!(portal.summary(&admin)[0].visible, portal.courses().len());
    }
}
