//! Enrollment model: the join between students and courses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{merge, EntityKind, Role};
use crate::export::{Cell, Exportable};
use crate::search::Searchable;
use crate::store::{Entity, Portal, Validator};
use crate::visibility::{Viewer, Visible};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Pending,
    #[default]
    Enrolled,
    Completed,
    Withdrawn,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "pending",
            EnrollmentStatus::Enrolled => "enrolled",
            EnrollmentStatus::Completed => "completed",
            EnrollmentStatus::Withdrawn => "withdrawn",
        }
    }

    /// Whether the enrollment holds a seat and links the student to the course.
    pub fn is_active(&self) -> bool {
        *self != EnrollmentStatus::Withdrawn
    }
}

/// A student's enrollment in a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub course_id: String,
    pub status: EnrollmentStatus,
    /// Completion percentage, 0 to 100.
    pub progress: u32,
    pub enrolled_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable enrollment fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentForm {
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub status: Option<EnrollmentStatus>,
    #[serde(default)]
    pub progress: Option<u32>,
}

impl Entity for Enrollment {
    type Form = EnrollmentForm;

    const KIND: EntityKind = EntityKind::Enrollment;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_form(id: String, form: EnrollmentForm, now: DateTime<Utc>) -> Self {
        Self {
            id,
            student_id: form.student_id.unwrap_or_default(),
            student_name: form.student_name.unwrap_or_default(),
            course_id: form.course_id.unwrap_or_default(),
            status: form.status.unwrap_or_default(),
            progress: form.progress.unwrap_or(0),
            enrolled_at: now,
            updated_at: now,
        }
    }

    fn merge_form(&mut self, form: EnrollmentForm, now: DateTime<Utc>) {
        merge(&mut self.student_id, form.student_id);
        merge(&mut self.student_name, form.student_name);
        merge(&mut self.course_id, form.course_id);
        merge(&mut self.status, form.status);
        merge(&mut self.progress, form.progress);
        self.updated_at = now;
    }

    fn to_form(&self) -> EnrollmentForm {
        EnrollmentForm {
            student_id: Some(self.student_id.clone()),
            student_name: Some(self.student_name.clone()),
            course_id: Some(self.course_id.clone()),
            status: Some(self.status),
            progress: Some(self.progress),
        }
    }

    fn validate(form: &EnrollmentForm, v: &mut Validator) {
        v.require_text("studentId", &form.student_id);
        v.require_text("courseId", &form.course_id);
        if let Some(progress) = form.progress {
            v.check("progress", progress <= 100, "progress must be between 0 and 100");
        }
    }

    fn counted_course(&self) -> Option<&str> {
        Some(&self.course_id)
    }
}

impl Visible for Enrollment {
    fn is_visible_to(&self, viewer: &Viewer) -> bool {
        match viewer.role() {
            Role::Faculty => viewer.owns_course(&self.course_id),
            Role::Student | Role::Parent => viewer.is_subject(&self.student_id),
            _ => false,
        }
    }

    fn is_editable_by(&self, viewer: &Viewer) -> bool {
        match viewer.role() {
            Role::Faculty => viewer.owns_course(&self.course_id),
            Role::Student => viewer.is_owner(&self.student_id),
            _ => false,
        }
    }
}

impl Searchable for Enrollment {
    const FACETS: &'static [&'static str] = &["status", "courseId", "studentId"];

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.student_name.as_str(),
            self.student_id.as_str(),
            self.course_id.as_str(),
            self.status.as_str(),
        ]
    }

    fn facet(&self, name: &str) -> Option<&str> {
        match name {
            "status" => Some(self.status.as_str()),
            "courseId" => Some(&self.course_id),
            "studentId" => Some(&self.student_id),
            _ => None,
        }
    }
}

impl Exportable for Enrollment {
    const CSV_HEADER: &'static [&'static str] = &[
        "id",
        "studentId",
        "studentName",
        "courseId",
        "course",
        "status",
        "progress",
    ];

    fn csv_row(&self, portal: &Portal) -> Vec<Cell> {
        vec![
            self.id.as_str().into(),
            self.student_id.as_str().into(),
            self.student_name.as_str().into(),
            self.course_id.as_str().into(),
            portal.course_label(&self.course_id).into(),
            self.status.as_str().into(),
            self.progress.into(),
        ]
    }
}
