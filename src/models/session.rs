//! Session (lesson plan) model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{merge, CurrentUser, EntityKind, Role};
use crate::export::{Cell, Exportable};
use crate::search::Searchable;
use crate::store::{Entity, Portal, Validator};
use crate::visibility::{self, Viewer, Visible};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    #[default]
    Draft,
    Published,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Draft => "Draft",
            SessionStatus::Published => "Published",
            SessionStatus::Completed => "Completed",
        }
    }

    pub fn is_published(&self) -> bool {
        *self != SessionStatus::Draft
    }
}

/// One planned lesson of a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub owner_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_on: Option<NaiveDate>,
    pub duration_minutes: u32,
    pub objectives: Vec<String>,
    pub materials: Vec<String>,
    pub notes: String,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionForm {
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub scheduled_on: Option<NaiveDate>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub objectives: Option<Vec<String>>,
    #[serde(default)]
    pub materials: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: Option<SessionStatus>,
}

impl Entity for Session {
    type Form = SessionForm;

    const KIND: EntityKind = EntityKind::Session;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_form(id: String, form: SessionForm, now: DateTime<Utc>) -> Self {
        Self {
            id,
            course_id: form.course_id.unwrap_or_default(),
            title: form.title.unwrap_or_default(),
            owner_id: form.owner_id.unwrap_or_default(),
            scheduled_on: form.scheduled_on,
            duration_minutes: form.duration_minutes.unwrap_or(60),
            objectives: form.objectives.unwrap_or_default(),
            materials: form.materials.unwrap_or_default(),
            notes: form.notes.unwrap_or_default(),
            status: form.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn merge_form(&mut self, form: SessionForm, now: DateTime<Utc>) {
        merge(&mut self.course_id, form.course_id);
        merge(&mut self.title, form.title);
        merge(&mut self.owner_id, form.owner_id);
        if form.scheduled_on.is_some() {
            self.scheduled_on = form.scheduled_on;
        }
        merge(&mut self.duration_minutes, form.duration_minutes);
        merge(&mut self.objectives, form.objectives);
        merge(&mut self.materials, form.materials);
        merge(&mut self.notes, form.notes);
        merge(&mut self.status, form.status);
        self.updated_at = now;
    }

    fn to_form(&self) -> SessionForm {
        SessionForm {
            course_id: Some(self.course_id.clone()),
            title: Some(self.title.clone()),
            owner_id: Some(self.owner_id.clone()),
            scheduled_on: self.scheduled_on,
            duration_minutes: Some(self.duration_minutes),
            objectives: Some(self.objectives.clone()),
            materials: Some(self.materials.clone()),
            notes: Some(self.notes.clone()),
            status: Some(self.status),
        }
    }

    fn validate(form: &SessionForm, v: &mut Validator) {
        v.require_text("courseId", &form.course_id);
        v.require_text("title", &form.title);
        if let Some(minutes) = form.duration_minutes {
            v.check("durationMinutes", minutes > 0, "durationMinutes must be positive");
        }
    }

    fn owner_id(&self) -> Option<&str> {
        Some(&self.owner_id)
    }

    fn assign_owner(form: &mut SessionForm, user: &CurrentUser) {
        if user.role == Role::Faculty || form.owner_id.is_none() {
            form.owner_id = Some(user.id.clone());
        }
    }
}

impl Visible for Session {
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

impl Searchable for Session {
    const FACETS: &'static [&'static str] = &["status", "courseId"];

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.course_id.as_str(), self.notes.as_str()];
        fields.extend(self.objectives.iter().map(String::as_str));
        fields
    }

    fn facet(&self, name: &str) -> Option<&str> {
        match name {
            "status" => Some(self.status.as_str()),
            "courseId" => Some(&self.course_id),
            _ => None,
        }
    }
}

impl Exportable for Session {
    const CSV_HEADER: &'static [&'static str] = &[
        "id",
        "courseId",
        "course",
        "title",
        "scheduledOn",
        "durationMinutes",
        "status",
    ];

    fn csv_row(&self, portal: &Portal) -> Vec<Cell> {
        vec![
            self.id.as_str().into(),
            self.course_id.as_str().into(),
            portal.course_label(&self.course_id).into(),
            self.title.as_str().into(),
            self.scheduled_on
                .map(|d| d.to_string())
                .unwrap_or_default()
                .into(),
            self.duration_minutes.into(),
            self.status.as_str().into(),
        ]
    }
}
