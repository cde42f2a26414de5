//! Assignment model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{merge, CurrentUser, EntityKind, Role};
use crate::export::{Cell, Exportable};
use crate::search::Searchable;
use crate::store::{Entity, Portal, Validator};
use crate::visibility::{self, Viewer, Visible};

/// Lifecycle shared by assignments and assessments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkStatus {
    Active,
    Closed,
    #[default]
    Draft,
}

impl WorkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkStatus::Active => "active",
            WorkStatus::Closed => "closed",
            WorkStatus::Draft => "draft",
        }
    }

    pub fn is_published(&self) -> bool {
        *self != WorkStatus::Draft
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub description: String,
    pub owner_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub max_points: u32,
    pub status: WorkStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentForm {
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub max_points: Option<u32>,
    #[serde(default)]
    pub status: Option<WorkStatus>,
}

impl Entity for Assignment {
    type Form = AssignmentForm;

    const KIND: EntityKind = EntityKind::Assignment;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_form(id: String, form: AssignmentForm, now: DateTime<Utc>) -> Self {
        Self {
            id,
            course_id: form.course_id.unwrap_or_default(),
            title: form.title.unwrap_or_default(),
            description: form.description.unwrap_or_default(),
            owner_id: form.owner_id.unwrap_or_default(),
            due_date: form.due_date,
            max_points: form.max_points.unwrap_or(100),
            status: form.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn merge_form(&mut self, form: AssignmentForm, now: DateTime<Utc>) {
        merge(&mut self.course_id, form.course_id);
        merge(&mut self.title, form.title);
        merge(&mut self.description, form.description);
        merge(&mut self.owner_id, form.owner_id);
        if form.due_date.is_some() {
            self.due_date = form.due_date;
        }
        merge(&mut self.max_points, form.max_points);
        merge(&mut self.status, form.status);
        self.updated_at = now;
    }

    fn to_form(&self) -> AssignmentForm {
        AssignmentForm {
            course_id: Some(self.course_id.clone()),
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            owner_id: Some(self.owner_id.clone()),
            due_date: self.due_date,
            max_points: Some(self.max_points),
            status: Some(self.status),
        }
    }

    fn validate(form: &AssignmentForm, v: &mut Validator) {
        v.require_text("courseId", &form.course_id);
        v.require_text("title", &form.title);
    }

    fn owner_id(&self) -> Option<&str> {
        Some(&self.owner_id)
    }

    fn assign_owner(form: &mut AssignmentForm, user: &CurrentUser) {
        if user.role == Role::Faculty || form.owner_id.is_none() {
            form.owner_id = Some(user.id.clone());
        }
    }
}

impl Visible for Assignment {
    fn is_visible_to(&self, viewer: &Viewer) -> bool {
        visibility::course_content_visible(
            viewer,
            &self.owner_id,
            &self.course_id,
            self.status.is_published(),
        )
    }

    fn is_editable_by(&self, viewer: &Viewer) -> bool {
        visibility::course_content_editable(viewer, &self.owner_id, &self.course_id)
    }
}

impl Searchable for Assignment {
    const FACETS: &'static [&'static str] = &["status", "courseId"];

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.title.as_str(),
            self.description.as_str(),
            self.course_id.as_str(),
            self.status.as_str(),
        ]
    }

    fn facet(&self, name: &str) -> Option<&str> {
        match name {
            "status" => Some(self.status.as_str()),
            "courseId" => Some(&self.course_id),
            _ => None,
        }
    }
}

impl Exportable for Assignment {
    const CSV_HEADER: &'static [&'static str] =
        &["id", "courseId", "course", "title", "dueDate", "maxPoints", "status"];

    fn csv_row(&self, portal: &Portal) -> Vec<Cell> {
        vec![
            self.id.as_str().into(),
            self.course_id.as_str().into(),
            portal.course_label(&self.course_id).into(),
            self.title.as_str().into(),
            self.due_date.map(|d| d.to_string()).unwrap_or_default().into(),
            self.max_points.into(),
            self.status.as_str().into(),
        ]
    }
}
