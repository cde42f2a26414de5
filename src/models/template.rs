//! Reusable notification template model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{merge, CurrentUser, EntityKind, NotificationType, Role};
use crate::export::{Cell, Exportable};
use crate::search::Searchable;
use crate::store::{Entity, Portal, Validator};
use crate::visibility::{Viewer, Visible};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationTemplate {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub template_type: NotificationType,
    pub subject: String,
    pub body: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationTemplateForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub template_type: Option<NotificationType>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
}

impl Entity for NotificationTemplate {
    type Form = NotificationTemplateForm;

    const KIND: EntityKind = EntityKind::NotificationTemplate;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_form(id: String, form: NotificationTemplateForm, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: form.name.unwrap_or_default(),
            template_type: form.template_type.unwrap_or_default(),
            subject: form.subject.unwrap_or_default(),
            body: form.body.unwrap_or_default(),
            owner_id: form.owner_id.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn merge_form(&mut self, form: NotificationTemplateForm, now: DateTime<Utc>) {
        merge(&mut self.name, form.name);
        merge(&mut self.template_type, form.template_type);
        merge(&mut self.subject, form.subject);
        merge(&mut self.body, form.body);
        merge(&mut self.owner_id, form.owner_id);
        self.updated_at = now;
    }

    fn to_form(&self) -> NotificationTemplateForm {
        NotificationTemplateForm {
            name: Some(self.name.clone()),
            template_type: Some(self.template_type),
            subject: Some(self.subject.clone()),
            body: Some(self.body.clone()),
            owner_id: Some(self.owner_id.clone()),
        }
    }

    fn validate(form: &NotificationTemplateForm, v: &mut Validator) {
        v.require_text("name", &form.name);
        v.require_text("subject", &form.subject);
        v.require_text("body", &form.body);
    }

    fn owner_id(&self) -> Option<&str> {
        Some(&self.owner_id)
    }

    fn assign_owner(form: &mut NotificationTemplateForm, user: &CurrentUser) {
        if user.role == Role::Faculty || form.owner_id.is_none() {
            form.owner_id = Some(user.id.clone());
        }
    }
}

impl Visible for NotificationTemplate {
    fn is_visible_to(&self, viewer: &Viewer) -> bool {
        viewer.role() == Role::Faculty && viewer.is_owner(&self.owner_id)
    }

    fn is_editable_by(&self, viewer: &Viewer) -> bool {
        self.is_visible_to(viewer)
    }
}

impl Searchable for NotificationTemplate {
    const FACETS: &'static [&'static str] = &["type"];

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.subject.as_str(), self.body.as_str()]
    }

    fn facet(&self, name: &str) -> Option<&str> {
        match name {
            "type" => Some(self.template_type.as_str()),
            _ => None,
        }
    }
}

impl Exportable for NotificationTemplate {
    const CSV_HEADER: &'static [&'static str] = &["id", "name", "type", "subject"];

    fn csv_row(&self, _portal: &Portal) -> Vec<Cell> {
        vec![
            self.id.as_str().into(),
            self.name.as_str().into(),
            self.template_type.as_str().into(),
            self.subject.as_str().into(),
        ]
    }
}
