//! Course catalog model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{merge, CurrentUser, EntityKind, Role};
use crate::export::{Cell, Exportable};
use crate::search::Searchable;
use crate::store::{Entity, Portal, Validator};
use crate::visibility::{Viewer, Visible};

/// Default seat limit for new courses.
pub const DEFAULT_MAX_CAPACITY: u32 = 30;

/// Publication state of a course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseStatus {
    #[default]
    Draft,
    Active,
    Published,
    Completed,
    Archived,
}

impl CourseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseStatus::Draft => "Draft",
            CourseStatus::Active => "Active",
            CourseStatus::Published => "Published",
            CourseStatus::Completed => "Completed",
            CourseStatus::Archived => "Archived",
        }
    }

    /// Statuses students and parents can see without an enrollment.
    pub fn is_published(&self) -> bool {
        matches!(self, CourseStatus::Active | CourseStatus::Published)
    }
}

/// How students get into a course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnrollmentMode {
    /// Self-enrollment is accepted immediately.
    #[default]
    Open,
    /// Self-enrollment lands in `pending` until staff approve it.
    Approval,
    /// Only staff can enroll students.
    InviteOnly,
}

impl EnrollmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentMode::Open => "open",
            EnrollmentMode::Approval => "approval",
            EnrollmentMode::InviteOnly => "inviteOnly",
        }
    }
}

/// A course in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub name: String,
    pub code: String,
    pub category: String,
    pub description: String,
    pub owner_id: String,
    /// Display name of the teaching faculty.
    pub faculty: String,
    pub enrollment_mode: EnrollmentMode,
    pub status: CourseStatus,
    pub max_capacity: u32,
    /// Non-withdrawn enrollments. Maintained by the synchronizer.
    pub enrolled: u32,
    /// Non-revoked certificates. Maintained by the synchronizer.
    pub certificates_generated: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable course fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub faculty: Option<String>,
    #[serde(default)]
    pub enrollment_mode: Option<EnrollmentMode>,
    #[serde(default)]
    pub status: Option<CourseStatus>,
    #[serde(default)]
    pub max_capacity: Option<u32>,
}

impl Course {
    pub fn is_full(&self) -> bool {
        self.enrolled >= self.max_capacity
    }
}

impl Entity for Course {
    type Form = CourseForm;

    const KIND: EntityKind = EntityKind::Course;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_form(id: String, form: CourseForm, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: form.name.unwrap_or_default(),
            code: form.code.unwrap_or_default(),
            category: form.category.unwrap_or_default(),
            description: form.description.unwrap_or_default(),
            owner_id: form.owner_id.unwrap_or_default(),
            faculty: form.faculty.unwrap_or_default(),
            enrollment_mode: form.enrollment_mode.unwrap_or_default(),
            status: form.status.unwrap_or_default(),
            max_capacity: form.max_capacity.unwrap_or(DEFAULT_MAX_CAPACITY),
            enrolled: 0,
            certificates_generated: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn merge_form(&mut self, form: CourseForm, now: DateTime<Utc>) {
        merge(&mut self.name, form.name);
        merge(&mut self.code, form.code);
        merge(&mut self.category, form.category);
        merge(&mut self.description, form.description);
        merge(&mut self.owner_id, form.owner_id);
        merge(&mut self.faculty, form.faculty);
        merge(&mut self.enrollment_mode, form.enrollment_mode);
        merge(&mut self.status, form.status);
        merge(&mut self.max_capacity, form.max_capacity);
        self.updated_at = now;
    }

    fn to_form(&self) -> CourseForm {
        CourseForm {
            name: Some(self.name.clone()),
            code: Some(self.code.clone()),
            category: Some(self.category.clone()),
            description: Some(self.description.clone()),
            owner_id: Some(self.owner_id.clone()),
            faculty: Some(self.faculty.clone()),
            enrollment_mode: Some(self.enrollment_mode),
            status: Some(self.status),
            max_capacity: Some(self.max_capacity),
        }
    }

    fn validate(form: &CourseForm, v: &mut Validator) {
        v.require_text("name", &form.name);
        v.require_text("code", &form.code);
        v.require_text("category", &form.category);
        if let Some(capacity) = form.max_capacity {
            v.check("maxCapacity", capacity >= 1, "maxCapacity must be at least 1");
        }
    }

    fn owner_id(&self) -> Option<&str> {
        Some(&self.owner_id)
    }

    fn assign_owner(form: &mut CourseForm, user: &CurrentUser) {
        if user.role == Role::Faculty || form.owner_id.is_none() {
            form.owner_id = Some(user.id.clone());
        }
        if form.faculty.as_deref().map_or(true, |f| f.trim().is_empty()) {
            form.faculty = Some(user.name.clone());
        }
    }
}

impl Visible for Course {
    fn is_visible_to(&self, viewer: &Viewer) -> bool {
        match viewer.role() {
            Role::Faculty => viewer.is_owner(&self.owner_id),
            Role::Student | Role::Parent => {
                self.status.is_published() || viewer.is_linked_course(&self.id)
            }
            _ => false,
        }
    }

    fn is_editable_by(&self, viewer: &Viewer) -> bool {
        viewer.role() == Role::Faculty && viewer.is_owner(&self.owner_id)
    }
}

impl Searchable for Course {
    const FACETS: &'static [&'static str] = &["status", "category", "enrollmentMode", "ownerId"];

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.code.as_str(),
            self.faculty.as_str(),
            self.category.as_str(),
        ]
    }

    fn facet(&self, name: &str) -> Option<&str> {
        match name {
            "status" => Some(self.status.as_str()),
            "category" => Some(&self.category),
            "enrollmentMode" => Some(self.enrollment_mode.as_str()),
            "ownerId" => Some(&self.owner_id),
            _ => None,
        }
    }
}

impl Exportable for Course {
    const CSV_HEADER: &'static [&'static str] = &[
        "id",
        "code",
        "name",
        "category",
        "faculty",
        "status",
        "enrolled",
        "maxCapacity",
        "certificatesGenerated",
    ];

    fn csv_row(&self, _portal: &Portal) -> Vec<Cell> {
        vec![
            self.id.as_str().into(),
            self.code.as_str().into(),
            self.name.as_str().into(),
            self.category.as_str().into(),
            self.faculty.as_str().into(),
            self.status.as_str().into(),
            self.enrolled.into(),
            self.max_capacity.into(),
            self.certificates_generated.into(),
        ]
    }
}
