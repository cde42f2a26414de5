//! Learning path model: an ordered sequence of courses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{merge, CurrentUser, EntityKind, Role};
use crate::export::{Cell, Exportable};
use crate::search::Searchable;
use crate::store::{Entity, Portal, Validator};
use crate::visibility::{Viewer, Visible};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LearningPathStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl LearningPathStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LearningPathStatus::Draft => "Draft",
            LearningPathStatus::Published => "Published",
            LearningPathStatus::Archived => "Archived",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPath {
    pub id: String,
    pub title: String,
    pub description: String,
    pub owner_id: String,
    /// Course ids in study order. Not checked against the course store.
    pub course_ids: Vec<String>,
    pub status: LearningPathStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPathForm {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub course_ids: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<LearningPathStatus>,
}

impl Entity for LearningPath {
    type Form = LearningPathForm;

    const KIND: EntityKind = EntityKind::LearningPath;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_form(id: String, form: LearningPathForm, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: form.title.unwrap_or_default(),
            description: form.description.unwrap_or_default(),
            owner_id: form.owner_id.unwrap_or_default(),
            course_ids: form.course_ids.unwrap_or_default(),
            status: form.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn merge_form(&mut self, form: LearningPathForm, now: DateTime<Utc>) {
        merge(&mut self.title, form.title);
        merge(&mut self.description, form.description);
        merge(&mut self.owner_id, form.owner_id);
        merge(&mut self.course_ids, form.course_ids);
        merge(&mut self.status, form.status);
        self.updated_at = now;
    }

    fn to_form(&self) -> LearningPathForm {
        LearningPathForm {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            owner_id: Some(self.owner_id.clone()),
            course_ids: Some(self.course_ids.clone()),
            status: Some(self.status),
        }
    }

    fn validate(form: &LearningPathForm, v: &mut Validator) {
        v.require_text("title", &form.title);
        if let Some(ids) = &form.course_ids {
            let mut seen = std::collections::HashSet::new();
            v.check(
                "courseIds",
                ids.iter().all(|id| seen.insert(id.as_str())),
                "a course may appear only once in a learning path",
            );
        }
    }

    fn owner_id(&self) -> Option<&str> {
        Some(&self.owner_id)
    }

    fn assign_owner(form: &mut LearningPathForm, user: &CurrentUser) {
        if user.role == Role::Faculty || form.owner_id.is_none() {
            form.owner_id = Some(user.id.clone());
        }
    }
}

impl Visible for LearningPath {
    fn is_visible_to(&self, viewer: &Viewer) -> bool {
        match viewer.role() {
            Role::Faculty => {
                viewer.is_owner(&self.owner_id) || self.status == LearningPathStatus::Published
            }
            Role::Student | Role::Parent => self.status == LearningPathStatus::Published,
            _ => false,
        }
    }

    fn is_editable_by(&self, viewer: &Viewer) -> bool {
        viewer.role() == Role::Faculty && viewer.is_owner(&self.owner_id)
    }
}

impl Searchable for LearningPath {
    const FACETS: &'static [&'static str] = &["status"];

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.description.as_str()]
    }

    fn facet(&self, name: &str) -> Option<&str> {
        match name {
            "status" => Some(self.status.as_str()),
            _ => None,
        }
    }
}

impl Exportable for LearningPath {
    const CSV_HEADER: &'static [&'static str] =
        &["id", "title", "status", "courseCount", "courses"];

    fn csv_row(&self, portal: &Portal) -> Vec<Cell> {
        let courses: Vec<String> = self
            .course_ids
            .iter()
            .map(|id| portal.course_label(id))
            .collect();
        vec![
            self.id.as_str().into(),
            self.title.as_str().into(),
            self.status.as_str().into(),
            Cell::Number(self.course_ids.len() as i64),
            courses.join("; ").into(),
        ]
    }
}
