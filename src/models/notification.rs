//! Notification broadcast model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{merge, CurrentUser, EntityKind, Role};
use crate::export::{Cell, Exportable};
use crate::search::Searchable;
use crate::store::{Entity, FormMode, Portal, Validator};
use crate::visibility::{Viewer, Visible};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationType {
    #[default]
    Announcement,
    Alert,
    Reminder,
    Event,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Announcement => "Announcement",
            NotificationType::Alert => "Alert",
            NotificationType::Reminder => "Reminder",
            NotificationType::Event => "Event",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Urgent => "Urgent",
        }
    }
}

/// Who a broadcast is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Audience {
    All,
    Students,
    Faculty,
    Parents,
}

impl Audience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::All => "All",
            Audience::Students => "Students",
            Audience::Faculty => "Faculty",
            Audience::Parents => "Parents",
        }
    }

    pub fn includes(&self, role: Role) -> bool {
        match self {
            Audience::All => true,
            Audience::Students => role == Role::Student,
            Audience::Faculty => role == Role::Faculty,
            Audience::Parents => role == Role::Parent,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationStatus {
    #[default]
    Draft,
    Scheduled,
    Sent,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Draft => "Draft",
            NotificationStatus::Scheduled => "Scheduled",
            NotificationStatus::Sent => "Sent",
        }
    }
}

/// A broadcast notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub priority: Priority,
    pub recipients: Audience,
    pub content: String,
    pub status: NotificationStatus,
    pub owner_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    /// Incremented by the view action.
    pub view_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable notification fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationForm {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub notification_type: Option<NotificationType>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub recipients: Option<Audience>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub status: Option<NotificationStatus>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub scheduled_for: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn is_sent(&self) -> bool {
        self.status == NotificationStatus::Sent
    }
}

impl Entity for Notification {
    type Form = NotificationForm;

    const KIND: EntityKind = EntityKind::Notification;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_form(id: String, form: NotificationForm, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: form.title.unwrap_or_default(),
            notification_type: form.notification_type.unwrap_or_default(),
            priority: form.priority.unwrap_or_default(),
            recipients: form.recipients.unwrap_or(Audience::All),
            content: form.content.unwrap_or_default(),
            status: form.status.unwrap_or_default(),
            owner_id: form.owner_id.unwrap_or_default(),
            scheduled_for: form.scheduled_for,
            sent_at: None,
            view_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn merge_form(&mut self, form: NotificationForm, now: DateTime<Utc>) {
        merge(&mut self.title, form.title);
        merge(&mut self.notification_type, form.notification_type);
        merge(&mut self.priority, form.priority);
        merge(&mut self.recipients, form.recipients);
        merge(&mut self.content, form.content);
        // Sent is terminal, and only the send action reaches it.
        if let Some(status) = form.status {
            if !self.is_sent() && status != NotificationStatus::Sent {
                self.status = status;
            }
        }
        merge(&mut self.owner_id, form.owner_id);
        if form.scheduled_for.is_some() {
            self.scheduled_for = form.scheduled_for;
        }
        self.updated_at = now;
    }

    fn to_form(&self) -> NotificationForm {
        NotificationForm {
            title: Some(self.title.clone()),
            notification_type: Some(self.notification_type),
            priority: Some(self.priority),
            recipients: Some(self.recipients),
            content: Some(self.content.clone()),
            status: Some(self.status),
            owner_id: Some(self.owner_id.clone()),
            scheduled_for: self.scheduled_for,
        }
    }

    fn validate(form: &NotificationForm, v: &mut Validator) {
        v.require_text("title", &form.title);
        v.require("type", &form.notification_type);
        v.require("recipients", &form.recipients);
        v.require_text("content", &form.content);
        if v.mode() == FormMode::Create {
            v.check(
                "status",
                form.status != Some(NotificationStatus::Sent),
                "notifications are sent with the send action",
            );
            if form.status == Some(NotificationStatus::Scheduled) {
                v.check(
                    "scheduledFor",
                    form.scheduled_for.is_some(),
                    "scheduledFor is required for scheduled notifications",
                );
            }
        }
    }

    fn owner_id(&self) -> Option<&str> {
        Some(&self.owner_id)
    }

    fn assign_owner(form: &mut NotificationForm, user: &CurrentUser) {
        if user.role == Role::Faculty || form.owner_id.is_none() {
            form.owner_id = Some(user.id.clone());
        }
    }
}

impl Visible for Notification {
    fn is_visible_to(&self, viewer: &Viewer) -> bool {
        let addressed = self.is_sent() && self.recipients.includes(viewer.role());
        match viewer.role() {
            Role::Faculty => viewer.is_owner(&self.owner_id) || addressed,
            Role::Student | Role::Parent => addressed,
            _ => false,
        }
    }

    fn is_editable_by(&self, viewer: &Viewer) -> bool {
        viewer.role() == Role::Faculty && viewer.is_owner(&self.owner_id)
    }
}

impl Searchable for Notification {
    const FACETS: &'static [&'static str] = &["type", "status", "priority", "recipients"];

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.title.as_str(),
            self.notification_type.as_str(),
            self.recipients.as_str(),
            self.status.as_str(),
            self.content.as_str(),
        ]
    }

    fn facet(&self, name: &str) -> Option<&str> {
        match name {
            "type" => Some(self.notification_type.as_str()),
            "status" => Some(self.status.as_str()),
            "priority" => Some(self.priority.as_str()),
            "recipients" => Some(self.recipients.as_str()),
            _ => None,
        }
    }
}

impl Exportable for Notification {
    const CSV_HEADER: &'static [&'static str] = &[
        "id",
        "title",
        "type",
        "priority",
        "recipients",
        "status",
        "viewCount",
        "sentAt",
    ];

    fn csv_row(&self, _portal: &Portal) -> Vec<Cell> {
        vec![
            self.id.as_str().into(),
            self.title.as_str().into(),
            self.notification_type.as_str().into(),
            self.priority.as_str().into(),
            self.recipients.as_str().into(),
            self.status.as_str().into(),
            self.view_count.into(),
            self.sent_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_default()
                .into(),
        ]
    }
}
