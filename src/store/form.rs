//! Form validation shared by every entity type.

use serde::Serialize;

/// Whether a form is a create draft or an edit patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FormMode {
    Create,
    Edit,
}

/// A validation failure on one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Collects field errors for one form submission.
///
/// On create every required field must be present. On edit a missing field
/// means "unchanged", but a present required field may not be blank.
#[derive(Debug)]
pub struct Validator {
    mode: FormMode,
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new(mode: FormMode) -> Self {
        Self {
            mode,
            errors: Vec::new(),
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    /// Required text field: present on create, never blank.
    pub fn require_text(&mut self, field: &str, value: &Option<String>) {
        match value {
            Some(v) if v.trim().is_empty() => self.error(field, format!("{} is required", field)),
            None if self.mode == FormMode::Create => {
                self.error(field, format!("{} is required", field))
            }
            _ => {}
        }
    }

    /// Required non-text field: present on create.
    pub fn require<T>(&mut self, field: &str, value: &Option<T>) {
        if value.is_none() && self.mode == FormMode::Create {
            self.error(field, format!("{} is required", field));
        }
    }

    pub fn check(&mut self, field: &str, ok: bool, message: impl Into<String>) {
        if !ok {
            self.error(field, message);
        }
    }

    pub fn error(&mut self, field: &str, message: impl Into<String>) {
        // One message per field is enough for inline display.
        if !self.errors.iter().any(|e| e.field == field) {
            self.errors.push(FieldError::new(field, message));
        }
    }

    pub fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_requires_presence() {
        let mut v = Validator::new(FormMode::Create);
        v.require_text("title", &None);
        v.require_text("content", &Some("  ".to_string()));
        v.require::<u32>("maxCapacity", &None);
        let errors = v.finish().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "content", "maxCapacity"]);
    }

    #[test]
    fn test_edit_allows_missing_but_not_blank() {
        let mut v = Validator::new(FormMode::Edit);
        v.require_text("title", &None);
        v.require::<u32>("maxCapacity", &None);
        assert!(v.finish().is_ok());

        let mut v = Validator::new(FormMode::Edit);
        v.require_text("title", &Some(String::new()));
        assert_eq!(v.finish().unwrap_err()[0].field, "title");
    }

    #[test]
    fn test_one_error_per_field() {
        let mut v = Validator::new(FormMode::Create);
        v.require_text("name", &None);
        v.check("name", false, "too short");
        let errors = v.finish().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "name is required");
    }
}
