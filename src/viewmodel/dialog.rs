//! Create, edit, view and delete flow for one entity kind.

use crate::errors::AppError;
use crate::models::CurrentUser;
use crate::store::{FieldError, Portal, PortalEntity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogMode {
    #[default]
    Create,
    Edit,
    View,
    Delete,
}

/// Two-step deletion: ask, then confirm or back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteState {
    #[default]
    Idle,
    ConfirmPending,
    Deleted,
}

/// Dialog state plus the form buffer it edits.
///
/// The buffer only holds editable fields, so ids, counters and workflow
/// stamps can never be written through a dialog.
#[derive(Debug, Clone)]
pub struct DialogController<E: PortalEntity> {
    is_open: bool,
    mode: DialogMode,
    form: E::Form,
    selected: Option<E>,
    errors: Vec<FieldError>,
    delete_state: DeleteState,
}

impl<E: PortalEntity> Default for DialogController<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: PortalEntity> DialogController<E> {
    pub fn new() -> Self {
        Self {
            is_open: false,
            mode: DialogMode::Create,
            form: E::Form::default(),
            selected: None,
            errors: Vec::new(),
            delete_state: DeleteState::Idle,
        }
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn mode(&self) -> DialogMode {
        self.mode
    }

    pub fn form(&self) -> &E::Form {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut E::Form {
        &mut self.form
    }

    pub fn selected(&self) -> Option<&E> {
        self.selected.as_ref()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Error recorded for `field` by the last submit, if any.
    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn delete_state(&self) -> DeleteState {
        self.delete_state
    }

    pub fn open_create(&mut self) {
        self.open(DialogMode::Create, E::Form::default(), None);
    }

    pub fn open_edit(&mut self, record: &E) {
        self.open(DialogMode::Edit, record.to_form(), Some(record.clone()));
    }

    pub fn open_view(&mut self, record: &E) {
        self.open(DialogMode::View, record.to_form(), Some(record.clone()));
    }

    /// Close without touching the store.
    pub fn cancel(&mut self) {
        self.close();
    }

    /// Validate and commit the buffer.
    ///
    /// On failure the dialog stays open with the field errors recorded. On
    /// success it closes and clears the buffer.
    pub fn submit(&mut self, portal: &mut Portal, user: &CurrentUser) -> Result<E, AppError> {
        if !self.is_open {
            return Err(AppError::BadRequest("dialog is not open".to_string()));
        }
        let result = match (self.mode, &self.selected) {
            (DialogMode::Create, _) => portal.create::<E>(user, self.form.clone()),
            (DialogMode::Edit, Some(selected)) => {
                portal.update::<E>(user, selected.id(), self.form.clone())
            }
            _ => {
                return Err(AppError::BadRequest(format!(
                    "cannot submit a {:?} dialog",
                    self.mode
                )))
            }
        };

        match result {
            Ok(record) => {
                self.close();
                Ok(record)
            }
            Err(err) => {
                self.errors = err.field_errors().to_vec();
                Err(err)
            }
        }
    }

    /// Ask for confirmation before deleting `record`.
    pub fn confirm_delete(&mut self, record: &E) {
        self.open(DialogMode::Delete, E::Form::default(), Some(record.clone()));
        self.delete_state = DeleteState::ConfirmPending;
    }

    /// Delete the record awaiting confirmation. Returns whether anything was removed.
    pub fn confirm(&mut self, portal: &mut Portal, user: &CurrentUser) -> Result<bool, AppError> {
        let Some(selected) = self
            .selected
            .as_ref()
            .filter(|_| self.delete_state == DeleteState::ConfirmPending)
        else {
            return Err(AppError::BadRequest("no deletion pending".to_string()));
        };

        let deleted = portal.delete::<E>(user, selected.id())?;
        self.close();
        if deleted {
            self.delete_state = DeleteState::Deleted;
        }
        Ok(deleted)
    }

    pub fn cancel_delete(&mut self) {
        self.close();
    }

    fn open(&mut self, mode: DialogMode, form: E::Form, selected: Option<E>) {
        self.is_open = true;
        self.mode = mode;
        self.form = form;
        self.selected = selected;
        self.errors.clear();
        self.delete_state = DeleteState::Idle;
    }

    fn close(&mut self) {
        self.is_open = false;
        self.form = E::Form::default();
        self.selected = None;
        self.errors.clear();
        self.delete_state = DeleteState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Course, CourseForm, Enrollment, EnrollmentForm, Notification, NotificationForm,
        NotificationStatus, Role,
    };

    fn admin() -> CurrentUser {
        CurrentUser::new("ADM1", "Admin", Role::Admin)
    }

    #[test]
    fn test_blank_title_keeps_dialog_open() {
        let mut portal = Portal::seeded();
        let before = portal.store::<Notification>().len();
        let mut dialog: DialogController<Notification> = DialogController::new();

        dialog.open_create();
        dialog.form_mut().title = Some(String::new());
        assert!(dialog.submit(&mut portal, &admin()).is_err());

        assert!(dialog.is_open());
        assert_eq!(dialog.mode(), DialogMode::Create);
        assert!(dialog.error_for("title").is_some());
        assert_eq!(portal.store::<Notification>().len(), before);
    }

    #[test]
    fn test_successful_create_closes_and_clears() {
        let mut portal = Portal::new();
        let mut dialog: DialogController<Course> = DialogController::new();

        dialog.open_create();
        *dialog.form_mut() = CourseForm {
            name: Some("Astronomy".into()),
            code: Some("AST-100".into()),
            category: Some("Science".into()),
            ..Default::default()
        };
        let course = dialog.submit(&mut portal, &admin()).unwrap();

        assert_eq!(course.id, "C001");
        assert!(!dialog.is_open());
        assert!(dialog.form().name.is_none());
        assert!(dialog.errors().is_empty());
        assert_eq!(portal.courses().len(), 1);
    }

    #[test]
    fn test_edit_round_trip_keeps_identity_and_counters() {
        let mut portal = Portal::seeded();
        let course = portal.courses().get("C001").unwrap().clone();
        let mut dialog: DialogController<Course> = DialogController::new();

        dialog.open_edit(&course);
        assert_eq!(dialog.form().name.as_deref(), Some(course.name.as_str()));
        dialog.form_mut().name = Some("Biology I".into());
        let updated = dialog.submit(&mut portal, &admin()).unwrap();

        assert_eq!(updated.id, course.id);
        assert_eq!(updated.name, "Biology I");
        assert_eq!(updated.enrolled, course.enrolled);
        assert_eq!(updated.created_at, course.created_at);
    }

    #[test]
    fn test_edit_rejects_blank_required_field() {
        let mut portal = Portal::seeded();
        let course = portal.courses().get("C001").unwrap().clone();
        let mut dialog: DialogController<Course> = DialogController::new();

        dialog.open_edit(&course);
        dialog.form_mut().code = Some("   ".into());
        assert!(dialog.submit(&mut portal, &admin()).is_err());
        assert!(dialog.error_for("code").is_some());
        assert_eq!(portal.courses().get("C001").unwrap().code, course.code);
    }

    #[test]
    fn test_editing_a_sent_notification_keeps_it_sent() {
        let mut portal = Portal::seeded();
        let sent = portal.store::<Notification>().get("N001").unwrap().clone();
        assert_eq!(sent.status, NotificationStatus::Sent);
        let mut dialog: DialogController<Notification> = DialogController::new();

        dialog.open_edit(&sent);
        dialog.form_mut().title = Some("Welcome back".into());
        let updated = dialog.submit(&mut portal, &admin()).unwrap();
        assert_eq!(updated.status, NotificationStatus::Sent);
        assert_eq!(updated.sent_at, sent.sent_at);
    }

    #[test]
    fn test_view_and_closed_dialogs_do_not_submit() {
        let mut portal = Portal::seeded();
        let course = portal.courses().get("C001").unwrap().clone();
        let mut dialog: DialogController<Course> = DialogController::new();
        let revision = portal.revision();

        assert!(dialog.submit(&mut portal, &admin()).is_err());
        dialog.open_view(&course);
        assert!(dialog.submit(&mut portal, &admin()).is_err());
        assert_eq!(portal.revision(), revision);
    }

    #[test]
    fn test_cancel_discards_buffer() {
        let mut portal = Portal::new();
        let mut dialog: DialogController<Course> = DialogController::new();
        dialog.open_create();
        dialog.form_mut().name = Some("Draft name".into());
        dialog.cancel();

        assert!(!dialog.is_open());
        assert!(dialog.form().name.is_none());
        assert!(portal.courses().is_empty());
        assert!(dialog.submit(&mut portal, &admin()).is_err());
    }

    #[test]
    fn test_two_step_delete() {
        let mut portal = Portal::seeded();
        let course = portal.courses().get("C005").unwrap().clone();
        let mut dialog: DialogController<Course> = DialogController::new();

        assert!(dialog.confirm(&mut portal, &admin()).is_err());

        dialog.confirm_delete(&course);
        assert_eq!(dialog.delete_state(), DeleteState::ConfirmPending);
        dialog.cancel_delete();
        assert_eq!(dialog.delete_state(), DeleteState::Idle);
        assert!(portal.courses().get("C005").is_some());

        dialog.confirm_delete(&course);
        assert!(dialog.confirm(&mut portal, &admin()).unwrap());
        assert_eq!(dialog.delete_state(), DeleteState::Deleted);
        assert!(portal.courses().get("C005").is_none());

        // Deleting the same record again is a no-op.
        dialog.confirm_delete(&course);
        assert!(!dialog.confirm(&mut portal, &admin()).unwrap());
        assert_eq!(dialog.delete_state(), DeleteState::Idle);
        assert!(!dialog.is_open());
    }

    #[test]
    fn test_enrollment_dialog_updates_course_counter() {
        let mut portal = Portal::seeded();
        let before = portal.courses().get("C003").unwrap().enrolled;
        let mut dialog: DialogController<Enrollment> = DialogController::new();

        dialog.open_create();
        *dialog.form_mut() = EnrollmentForm {
            student_id: Some("STU4".into()),
            student_name: Some("Dan Reyes".into()),
            course_id: Some("C003".into()),
            ..Default::default()
        };
        let created = dialog.submit(&mut portal, &admin()).unwrap();
        assert_eq!(portal.courses().get("C003").unwrap().enrolled, before + 1);

        dialog.confirm_delete(&created);
        dialog.confirm(&mut portal, &admin()).unwrap();
        assert_eq!(portal.courses().get("C003").unwrap().enrolled, before);
    }

    #[test]
    fn test_forbidden_submit_keeps_dialog_open() {
        let mut portal = Portal::new();
        let parent = CurrentUser::new("PAR1", "Rosa", Role::Parent);
        let mut dialog: DialogController<Notification> = DialogController::new();

        dialog.open_create();
        *dialog.form_mut() = NotificationForm {
            title: Some("Hello".into()),
            ..Default::default()
        };
        let err = dialog.submit(&mut portal, &parent).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(dialog.is_open());
    }
}
