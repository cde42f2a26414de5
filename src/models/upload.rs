//! Uploaded file model with its approval workflow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{merge, CurrentUser, EntityKind, Role};
use crate::export::{Cell, Exportable};
use crate::search::Searchable;
use crate::store::{Entity, Portal, Validator};
use crate::visibility::{Viewer, Visible};

/// `Pending -> Approved | Rejected`, driven by admins only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Pending => "Pending",
            UploadStatus::Approved => "Approved",
            UploadStatus::Rejected => "Rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub id: String,
    pub file_name: String,
    pub category: String,
    pub content_type: String,
    pub size: u64,
    pub url: String,
    pub uploaded_by: String,
    pub status: UploadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Incremented by the download action.
    pub download_count: u32,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable upload metadata. Storage fields come from the file store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFileForm {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub uploaded_by: Option<String>,
}

impl Entity for UploadedFile {
    type Form = UploadedFileForm;

    const KIND: EntityKind = EntityKind::Upload;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_form(id: String, form: UploadedFileForm, now: DateTime<Utc>) -> Self {
        Self {
            id,
            file_name: form.file_name.unwrap_or_default(),
            category: form.category.unwrap_or_else(|| "General".to_string()),
            content_type: "application/octet-stream".to_string(),
            size: 0,
            url: String::new(),
            uploaded_by: form.uploaded_by.unwrap_or_default(),
            status: UploadStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            download_count: 0,
            uploaded_at: now,
            updated_at: now,
        }
    }

    fn merge_form(&mut self, form: UploadedFileForm, now: DateTime<Utc>) {
        merge(&mut self.file_name, form.file_name);
        merge(&mut self.category, form.category);
        self.updated_at = now;
    }

    fn to_form(&self) -> UploadedFileForm {
        UploadedFileForm {
            file_name: Some(self.file_name.clone()),
            category: Some(self.category.clone()),
            uploaded_by: Some(self.uploaded_by.clone()),
        }
    }

    fn validate(form: &UploadedFileForm, v: &mut Validator) {
        v.require_text("fileName", &form.file_name);
    }

    fn owner_id(&self) -> Option<&str> {
        Some(&self.uploaded_by)
    }

    fn assign_owner(form: &mut UploadedFileForm, user: &CurrentUser) {
        form.uploaded_by = Some(user.id.clone());
    }
}

impl Visible for UploadedFile {
    fn is_visible_to(&self, viewer: &Viewer) -> bool {
        match viewer.role() {
            Role::Guest => false,
            _ => viewer.is_owner(&self.uploaded_by) || self.status == UploadStatus::Approved,
        }
    }
}

impl Searchable for UploadedFile {
    const FACETS: &'static [&'static str] = &["status", "category", "uploadedBy"];

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.file_name.as_str(),
            self.category.as_str(),
            self.content_type.as_str(),
        ]
    }

    fn facet(&self, name: &str) -> Option<&str> {
        match name {
            "status" => Some(self.status.as_str()),
            "category" => Some(&self.category),
            "uploadedBy" => Some(&self.uploaded_by),
            _ => None,
        }
    }
}

impl Exportable for UploadedFile {
    const CSV_HEADER: &'static [&'static str] = &[
        "id",
        "fileName",
        "category",
        "size",
        "uploadedBy",
        "status",
        "downloadCount",
    ];

    fn csv_row(&self, _portal: &Portal) -> Vec<Cell> {
        vec![
            self.id.as_str().into(),
            self.file_name.as_str().into(),
            self.category.as_str().into(),
            self.size.into(),
            self.uploaded_by.as_str().into(),
            self.status.as_str().into(),
            self.download_count.into(),
        ]
    }
}
