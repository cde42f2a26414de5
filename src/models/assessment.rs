//! Assessment (quiz, exam, survey) model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{merge, CurrentUser, EntityKind, Role, WorkStatus};
use crate::export::{Cell, Exportable};
use crate::search::Searchable;
use crate::store::{Entity, Portal, Validator};
use crate::visibility::{self, Viewer, Visible};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssessmentType {
    Quiz,
    Exam,
    Survey,
}

impl AssessmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentType::Quiz => "Quiz",
            AssessmentType::Exam => "Exam",
            AssessmentType::Survey => "Survey",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: String,
    pub course_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub assessment_type: AssessmentType,
    pub owner_id: String,
    pub duration_minutes: u32,
    pub total_marks: u32,
    pub passing_marks: u32,
    pub status: WorkStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentForm {
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub assessment_type: Option<AssessmentType>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub total_marks: Option<u32>,
    #[serde(default)]
    pub passing_marks: Option<u32>,
    #[serde(default)]
    pub status: Option<WorkStatus>,
}

impl Entity for Assessment {
    type Form = AssessmentForm;

    const KIND: EntityKind = EntityKind::Assessment;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_form(id: String, form: AssessmentForm, now: DateTime<Utc>) -> Self {
        let total_marks = form.total_marks.unwrap_or(100);
        Self {
            id,
            course_id: form.course_id.unwrap_or_default(),
            title: form.title.unwrap_or_default(),
            assessment_type: form.assessment_type.unwrap_or(AssessmentType::Quiz),
            owner_id: form.owner_id.unwrap_or_default(),
            duration_minutes: form.duration_minutes.unwrap_or(30),
            total_marks,
            passing_marks: form.passing_marks.unwrap_or(total_marks * 2 / 5),
            status: form.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn merge_form(&mut self, form: AssessmentForm, now: DateTime<Utc>) {
        merge(&mut self.course_id, form.course_id);
        merge(&mut self.title, form.title);
        merge(&mut self.assessment_type, form.assessment_type);
        merge(&mut self.owner_id, form.owner_id);
        merge(&mut self.duration_minutes, form.duration_minutes);
        merge(&mut self.total_marks, form.total_marks);
        merge(&mut self.passing_marks, form.passing_marks);
        merge(&mut self.status, form.status);
        // A lowered total never leaves the pass mark above it.
        self.passing_marks = self.passing_marks.min(self.total_marks);
        self.updated_at = now;
    }

    fn to_form(&self) -> AssessmentForm {
        AssessmentForm {
            course_id: Some(self.course_id.clone()),
            title: Some(self.title.clone()),
            assessment_type: Some(self.assessment_type),
            owner_id: Some(self.owner_id.clone()),
            duration_minutes: Some(self.duration_minutes),
            total_marks: Some(self.total_marks),
            passing_marks: Some(self.passing_marks),
            status: Some(self.status),
        }
    }

    fn validate(form: &AssessmentForm, v: &mut Validator) {
        v.require_text("courseId", &form.course_id);
        v.require_text("title", &form.title);
        v.require("type", &form.assessment_type);
        if let (Some(total), Some(passing)) = (form.total_marks, form.passing_marks) {
            v.check(
                "passingMarks",
                passing <= total,
                "passingMarks cannot exceed totalMarks",
            );
        }
    }

    fn owner_id(&self) -> Option<&str> {
        Some(&self.owner_id)
    }

    fn assign_owner(form: &mut AssessmentForm, user: &CurrentUser) {
        if user.role == Role::Faculty || form.owner_id.is_none() {
            form.owner_id = Some(user.id.clone());
        }
    }
}

impl Visible for Assessment {
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

impl Searchable for Assessment {
    const FACETS: &'static [&'static str] = &["status", "type", "courseId"];

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.title.as_str(),
            self.assessment_type.as_str(),
            self.course_id.as_str(),
            self.status.as_str(),
        ]
    }

    fn facet(&self, name: &str) -> Option<&str> {
        match name {
            "status" => Some(self.status.as_str()),
            "type" => Some(self.assessment_type.as_str()),
            "courseId" => Some(&self.course_id),
            _ => None,
        }
    }
}

impl Exportable for Assessment {
    const CSV_HEADER: &'static [&'static str] = &[
        "id",
        "courseId",
        "course",
        "title",
        "type",
        "totalMarks",
        "passingMarks",
        "status",
    ];

    fn csv_row(&self, portal: &Portal) -> Vec<Cell> {
        vec![
            self.id.as_str().into(),
            self.course_id.as_str().into(),
            portal.course_label(&self.course_id).into(),
            self.title.as_str().into(),
            self.assessment_type.as_str().into(),
            self.total_marks.into(),
            self.passing_marks.into(),
            self.status.as_str().into(),
        ]
    }
}
