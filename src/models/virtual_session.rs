//! Virtual classroom session model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{merge, CurrentUser, EntityKind, Role};
use crate::export::{Cell, Exportable};
use crate::search::Searchable;
use crate::store::{Entity, Portal, Validator};
use crate::visibility::{self, Viewer, Visible};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VirtualSessionStatus {
    #[default]
    Scheduled,
    Live,
    Completed,
    Cancelled,
}

impl VirtualSessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VirtualSessionStatus::Scheduled => "Scheduled",
            VirtualSessionStatus::Live => "Live",
            VirtualSessionStatus::Completed => "Completed",
            VirtualSessionStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_published(&self) -> bool {
        *self != VirtualSessionStatus::Cancelled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualSession {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub owner_id: String,
    pub platform: String,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_url: Option<String>,
    pub status: VirtualSessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualSessionForm {
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub meeting_url: Option<String>,
    #[serde(default)]
    pub status: Option<VirtualSessionStatus>,
}

impl Entity for VirtualSession {
    type Form = VirtualSessionForm;

    const KIND: EntityKind = EntityKind::VirtualSession;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_form(id: String, form: VirtualSessionForm, now: DateTime<Utc>) -> Self {
        Self {
            id,
            course_id: form.course_id.unwrap_or_default(),
            title: form.title.unwrap_or_default(),
            owner_id: form.owner_id.unwrap_or_default(),
            platform: form.platform.unwrap_or_else(|| "Built-in".to_string()),
            starts_at: form.starts_at.unwrap_or(now),
            duration_minutes: form.duration_minutes.unwrap_or(60),
            meeting_url: form.meeting_url,
            status: form.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn merge_form(&mut self, form: VirtualSessionForm, now: DateTime<Utc>) {
        merge(&mut self.course_id, form.course_id);
        merge(&mut self.title, form.title);
        merge(&mut self.owner_id, form.owner_id);
        merge(&mut self.platform, form.platform);
        merge(&mut self.starts_at, form.starts_at);
        merge(&mut self.duration_minutes, form.duration_minutes);
        if form.meeting_url.is_some() {
            self.meeting_url = form.meeting_url;
        }
        merge(&mut self.status, form.status);
        self.updated_at = now;
    }

    fn to_form(&self) -> VirtualSessionForm {
        VirtualSessionForm {
            course_id: Some(self.course_id.clone()),
            title: Some(self.title.clone()),
            owner_id: Some(self.owner_id.clone()),
            platform: Some(self.platform.clone()),
            starts_at: Some(self.starts_at),
            duration_minutes: Some(self.duration_minutes),
            meeting_url: self.meeting_url.clone(),
            status: Some(self.status),
        }
    }

    fn validate(form: &VirtualSessionForm, v: &mut Validator) {
        v.require_text("courseId", &form.course_id);
        v.require_text("title", &form.title);
        v.require("startsAt", &form.starts_at);
        if let Some(minutes) = form.duration_minutes {
            v.check("durationMinutes", minutes > 0, "durationMinutes must be positive");
        }
    }

    fn owner_id(&self) -> Option<&str> {
        Some(&self.owner_id)
    }

    fn assign_owner(form: &mut VirtualSessionForm, user: &CurrentUser) {
        if user.role == Role::Faculty || form.owner_id.is_none() {
            form.owner_id = Some(user.id.clone());
        }
    }
}

impl Visible for VirtualSession {
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

impl Searchable for VirtualSession {
    const FACETS: &'static [&'static str] = &["status", "courseId", "platform"];

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.title.as_str(),
            self.platform.as_str(),
            self.course_id.as_str(),
            self.status.as_str(),
        ]
    }

    fn facet(&self, name: &str) -> Option<&str> {
        match name {
            "status" => Some(self.status.as_str()),
            "courseId" => Some(&self.course_id),
            "platform" => Some(&self.platform),
            _ => None,
        }
    }
}

impl Exportable for VirtualSession {
    const CSV_HEADER: &'static [&'static str] = &[
        "id",
        "courseId",
        "course",
        "title",
        "platform",
        "startsAt",
        "durationMinutes",
        "status",
    ];

    fn csv_row(&self, portal: &Portal) -> Vec<Cell> {
        vec![
            self.id.as_str().into(),
            self.course_id.as_str().into(),
            portal.course_label(&self.course_id).into(),
            self.title.as_str().into(),
            self.platform.as_str().into(),
            self.starts_at.to_rfc3339().into(),
            self.duration_minutes.into(),
            self.status.as_str().into(),
        ]
    }
}
