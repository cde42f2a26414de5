//! Course completion certificate model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{merge, EntityKind, Role};
use crate::export::{Cell, Exportable};
use crate::search::Searchable;
use crate::store::{Entity, Portal, Validator};
use crate::visibility::{Viewer, Visible};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateStatus {
    #[default]
    Issued,
    Revoked,
    Expired,
}

impl CertificateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateStatus::Issued => "issued",
            CertificateStatus::Revoked => "revoked",
            CertificateStatus::Expired => "expired",
        }
    }

    /// Whether the certificate counts toward the course's generated total.
    pub fn is_generated(&self) -> bool {
        *self != CertificateStatus::Revoked
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub course_id: String,
    pub title: String,
    pub status: CertificateStatus,
    pub issued_on: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<NaiveDate>,
    /// Public code printed on the certificate.
    pub verification_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateForm {
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<CertificateStatus>,
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
}

fn verification_code() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..12].to_uppercase()
}

impl Entity for Certificate {
    type Form = CertificateForm;

    const KIND: EntityKind = EntityKind::Certificate;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_form(id: String, form: CertificateForm, now: DateTime<Utc>) -> Self {
        Self {
            id,
            student_id: form.student_id.unwrap_or_default(),
            student_name: form.student_name.unwrap_or_default(),
            course_id: form.course_id.unwrap_or_default(),
            title: form
                .title
                .unwrap_or_else(|| "Certificate of Completion".to_string()),
            status: form.status.unwrap_or_default(),
            issued_on: now.date_naive(),
            expires_on: form.expires_on,
            verification_code: verification_code(),
            created_at: now,
            updated_at: now,
        }
    }

    fn merge_form(&mut self, form: CertificateForm, now: DateTime<Utc>) {
        merge(&mut self.student_id, form.student_id);
        merge(&mut self.student_name, form.student_name);
        merge(&mut self.course_id, form.course_id);
        merge(&mut self.title, form.title);
        merge(&mut self.status, form.status);
        if form.expires_on.is_some() {
            self.expires_on = form.expires_on;
        }
        self.updated_at = now;
    }

    fn to_form(&self) -> CertificateForm {
        CertificateForm {
            student_id: Some(self.student_id.clone()),
            student_name: Some(self.student_name.clone()),
            course_id: Some(self.course_id.clone()),
            title: Some(self.title.clone()),
            status: Some(self.status),
            expires_on: self.expires_on,
        }
    }

    fn validate(form: &CertificateForm, v: &mut Validator) {
        v.require_text("studentId", &form.student_id);
        v.require_text("courseId", &form.course_id);
        if let Some(title) = &form.title {
            v.check("title", !title.trim().is_empty(), "title must not be blank");
        }
    }

    fn counted_course(&self) -> Option<&str> {
        Some(&self.course_id)
    }
}

impl Visible for Certificate {
    fn is_visible_to(&self, viewer: &Viewer) -> bool {
        match viewer.role() {
            Role::Faculty => viewer.owns_course(&self.course_id),
            Role::Student | Role::Parent => viewer.is_subject(&self.student_id),
            _ => false,
        }
    }

    fn is_editable_by(&self, viewer: &Viewer) -> bool {
        viewer.role() == Role::Faculty && viewer.owns_course(&self.course_id)
    }
}

impl Searchable for Certificate {
    const FACETS: &'static [&'static str] = &["status", "courseId", "studentId"];

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.student_name.as_str(),
            self.student_id.as_str(),
            self.course_id.as_str(),
            self.title.as_str(),
            self.verification_code.as_str(),
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

impl Exportable for Certificate {
    const CSV_HEADER: &'static [&'static str] = &[
        "id",
        "studentId",
        "studentName",
        "courseId",
        "course",
        "status",
        "issuedOn",
        "verificationCode",
    ];

    fn csv_row(&self, portal: &Portal) -> Vec<Cell> {
        vec![
            self.id.as_str().into(),
            self.student_id.as_str().into(),
            self.student_name.as_str().into(),
            self.course_id.as_str().into(),
            portal.course_label(&self.course_id).into(),
            self.status.as_str().into(),
            self.issued_on.to_string().into(),
            self.verification_code.as_str().into(),
        ]
    }
}
