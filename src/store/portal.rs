//! The portal aggregate: one store per entity kind plus a global revision.
//!
//! Every mutation goes through here so the child change, the synchronizer's
//! counter updates and the revision bump land as one state transition.

use chrono::Utc;
use tokio::sync::watch;

use super::{seed, sync, Entity, EntityStore, FormMode, Validator};
use crate::errors::AppError;
use crate::export::Exportable;
use crate::models::{
    Assessment, Assignment, Certificate, Course, CurrentUser, Enrollment,
    EnrollmentMode, EnrollmentStatus, KindSummary, LearningPath, Notification,
    NotificationTemplate, Role, Session, UploadedFile, VirtualSession,
};
use crate::search::{self, FilterState, Searchable};
use crate::visibility::{self, Viewer, Visible};

/// Label shown for references to courses that no longer exist.
pub const UNKNOWN_COURSE: &str = "Unknown course";

/// An entity kind the portal holds a store for.
pub trait PortalEntity: Entity + Searchable + Visible + Exportable {
    fn store(portal: &Portal) -> &EntityStore<Self>;

    fn store_mut(portal: &mut Portal) -> &mut EntityStore<Self>;

    /// Kind-specific checks that need other stores, run before a create commits.
    fn check_create(
        _portal: &Portal,
        _user: &CurrentUser,
        _form: &mut Self::Form,
    ) -> Result<(), AppError> {
        Ok(())
    }

    /// Kind-specific checks run before an edit commits.
    fn check_update(
        _portal: &Portal,
        _user: &CurrentUser,
        _existing: &Self,
        _form: &Self::Form,
    ) -> Result<(), AppError> {
        Ok(())
    }
}

macro_rules! portal_entity {
    ($ty:ty, $field:ident) => {
        impl PortalEntity for $ty {
            fn store(portal: &Portal) -> &EntityStore<Self> {
                &portal.$field
            }

            fn store_mut(portal: &mut Portal) -> &mut EntityStore<Self> {
                &mut portal.$field
            }
        }
    };
}

portal_entity!(Course, courses);
portal_entity!(Notification, notifications);
portal_entity!(Session, sessions);
portal_entity!(Assignment, assignments);
portal_entity!(Assessment, assessments);
portal_entity!(Certificate, certificates);
portal_entity!(VirtualSession, virtual_sessions);
portal_entity!(LearningPath, learning_paths);
portal_entity!(NotificationTemplate, templates);
portal_entity!(UploadedFile, uploads);

impl PortalEntity for Enrollment {
    fn store(portal: &Portal) -> &EntityStore<Self> {
        &portal.enrollments
    }

    fn store_mut(portal: &mut Portal) -> &mut EntityStore<Self> {
        &mut portal.enrollments
    }

    fn check_create(
        portal: &Portal,
        user: &CurrentUser,
        form: &mut Self::Form,
    ) -> Result<(), AppError> {
        let course_id = form.course_id.clone().unwrap_or_default();
        let course = portal.courses.get(&course_id);

        if user.role == Role::Student {
            if form.student_id.as_deref() != Some(user.id.as_str()) {
                return Err(AppError::Forbidden(
                    "Students can only enroll themselves".to_string(),
                ));
            }
            let viewer = portal.viewer(user);
            let Some(course) = course.filter(|c| visibility::is_visible(*c, &viewer)) else {
                return Err(AppError::field("courseId", "course is not open for enrollment"));
            };
            match course.enrollment_mode {
                EnrollmentMode::InviteOnly => {
                    return Err(AppError::field("courseId", "course is invite only"));
                }
                EnrollmentMode::Approval => form.status = Some(EnrollmentStatus::Pending),
                EnrollmentMode::Open => form.status = Some(EnrollmentStatus::Enrolled),
            }
            if form.student_name.is_none() {
                form.student_name = Some(user.name.clone());
            }
            form.progress = Some(0);
        }

        let active = form.status.unwrap_or_default().is_active();
        if let Some(course) = course {
            if active && course.is_full() {
                return Err(AppError::field(
                    "courseId",
                    format!("{} is at capacity ({} seats)", course.name, course.max_capacity),
                ));
            }
        }
        Ok(())
    }

    fn check_update(
        portal: &Portal,
        user: &CurrentUser,
        existing: &Self,
        form: &Self::Form,
    ) -> Result<(), AppError> {
        if user.role == Role::Student {
            let only_withdraw = form.student_id.as_ref().map_or(true, |s| *s == existing.student_id)
                && form.course_id.as_ref().map_or(true, |c| *c == existing.course_id)
                && form.progress.map_or(true, |p| p == existing.progress)
                && matches!(form.status, None | Some(EnrollmentStatus::Withdrawn));
            if !only_withdraw {
                return Err(AppError::Forbidden(
                    "Students can only withdraw from a course".to_string(),
                ));
            }
        }

        // Re-activating or moving an enrollment takes a seat in the target course.
        let target_course = form.course_id.as_deref().unwrap_or(&existing.course_id);
        let becomes_active = form.status.unwrap_or(existing.status).is_active();
        let already_counted = existing.status.is_active() && target_course == existing.course_id;
        if becomes_active && !already_counted {
            if let Some(course) = portal.courses.get(target_course) {
                if course.is_full() {
                    return Err(AppError::field(
                        "courseId",
                        format!("{} is at capacity ({} seats)", course.name, course.max_capacity),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// All entity stores plus the revision published to subscribers.
#[derive(Debug)]
pub struct Portal {
    pub(crate) courses: EntityStore<Course>,
    pub(crate) enrollments: EntityStore<Enrollment>,
    pub(crate) notifications: EntityStore<Notification>,
    pub(crate) sessions: EntityStore<Session>,
    pub(crate) assignments: EntityStore<Assignment>,
    pub(crate) assessments: EntityStore<Assessment>,
    pub(crate) certificates: EntityStore<Certificate>,
    pub(crate) virtual_sessions: EntityStore<VirtualSession>,
    pub(crate) learning_paths: EntityStore<LearningPath>,
    pub(crate) templates: EntityStore<NotificationTemplate>,
    pub(crate) uploads: EntityStore<UploadedFile>,
    revision: i64,
    changes: watch::Sender<i64>,
}

impl Default for Portal {
    fn default() -> Self {
        Self::new()
    }
}

impl Portal {
    /// An empty portal.
    pub fn new() -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            courses: EntityStore::new(),
            enrollments: EntityStore::new(),
            notifications: EntityStore::new(),
            sessions: EntityStore::new(),
            assignments: EntityStore::new(),
            assessments: EntityStore::new(),
            certificates: EntityStore::new(),
            virtual_sessions: EntityStore::new(),
            learning_paths: EntityStore::new(),
            templates: EntityStore::new(),
            uploads: EntityStore::new(),
            revision: 0,
            changes,
        }
    }

    /// A portal pre-filled with demo records.
    pub fn seeded() -> Self {
        let mut portal = Self::new();
        seed::load(&mut portal);
        sync::recount_all(&mut portal);
        portal
    }

    pub fn revision(&self) -> i64 {
        self.revision
    }

    /// Receive the revision after every committed mutation.
    pub fn subscribe(&self) -> watch::Receiver<i64> {
        self.changes.subscribe()
    }

    pub fn courses(&self) -> &EntityStore<Course> {
        &self.courses
    }

    pub fn enrollments(&self) -> &EntityStore<Enrollment> {
        &self.enrollments
    }

    pub fn store<E: PortalEntity>(&self) -> &EntityStore<E> {
        E::store(self)
    }

    pub fn viewer(&self, user: &CurrentUser) -> Viewer {
        Viewer::resolve(self, user)
    }

    /// Display name of a course, falling back for dangling references.
    pub fn course_label(&self, course_id: &str) -> String {
        self.courses
            .get(course_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| UNKNOWN_COURSE.to_string())
    }

    /// The record with `id` if it exists and `user` may see it.
    pub fn find_visible<E: PortalEntity>(&self, user: &CurrentUser, id: &str) -> Option<&E> {
        let viewer = self.viewer(user);
        E::store(self)
            .get(id)
            .filter(|r| visibility::is_visible(*r, &viewer))
    }

    /// Visible records of `E` matching `filter`, in store order.
    pub fn query<E: PortalEntity>(&self, user: &CurrentUser, filter: &FilterState) -> Vec<&E> {
        let viewer = self.viewer(user);
        search::apply(E::store(self).list(), &viewer, filter)
    }

    /// Visible record counts per kind, for dashboards.
    pub fn summary(&self, user: &CurrentUser) -> Vec<KindSummary> {
        let viewer = self.viewer(user);
        vec![
            self.visible_count::<Course>(&viewer),
            self.visible_count::<Enrollment>(&viewer),
            self.visible_count::<Notification>(&viewer),
            self.visible_count::<Session>(&viewer),
            self.visible_count::<Assignment>(&viewer),
            self.visible_count::<Assessment>(&viewer),
            self.visible_count::<Certificate>(&viewer),
            self.visible_count::<VirtualSession>(&viewer),
            self.visible_count::<LearningPath>(&viewer),
            self.visible_count::<NotificationTemplate>(&viewer),
            self.visible_count::<UploadedFile>(&viewer),
        ]
    }

    fn visible_count<E: PortalEntity>(&self, viewer: &Viewer) -> KindSummary {
        let all = FilterState::default();
        KindSummary {
            kind: E::KIND,
            visible: search::apply(E::store(self).list(), viewer, &all).len(),
        }
    }

    /// Validate `form`, append a new record and update dependent counters.
    pub fn create<E: PortalEntity>(
        &mut self,
        user: &CurrentUser,
        mut form: E::Form,
    ) -> Result<E, AppError> {
        if !user.role.can_manage(E::KIND) {
            return Err(AppError::forbidden(E::KIND, "create"));
        }

        let mut v = Validator::new(FormMode::Create);
        E::validate(&form, &mut v);
        v.finish()?;

        E::assign_owner(&mut form, user);
        E::check_create(self, user, &mut form)?;

        let record = E::store_mut(self).create(form, Utc::now());
        sync::on_child_created(self, &record);
        self.commit();

        tracing::info!(kind = ?E::KIND, id = record.id(), user = %user.id, "record created");
        Ok(record)
    }

    /// Merge `form` over a visible, editable record and resync counters.
    pub fn update<E: PortalEntity>(
        &mut self,
        user: &CurrentUser,
        id: &str,
        form: E::Form,
    ) -> Result<E, AppError> {
        if !user.role.can_manage(E::KIND) {
            return Err(AppError::forbidden(E::KIND, "edit"));
        }

        let viewer = self.viewer(user);
        let existing = E::store(self)
            .get(id)
            .filter(|r| visibility::is_visible(*r, &viewer))
            .cloned()
            .ok_or_else(|| AppError::not_found(E::KIND, id))?;
        if !visibility::is_editable(&existing, &viewer) {
            return Err(AppError::forbidden(E::KIND, "edit"));
        }

        let mut v = Validator::new(FormMode::Edit);
        E::validate(&form, &mut v);
        v.finish()?;
        E::check_update(self, user, &existing, &form)?;

        let updated = E::store_mut(self)
            .update(id, form, Utc::now())
            .ok_or_else(|| AppError::not_found(E::KIND, id))?;
        sync::on_child_updated(self, &existing, &updated);
        self.commit();

        tracing::info!(kind = ?E::KIND, id, user = %user.id, "record updated");
        Ok(updated)
    }

    /// Remove a record. Absent or invisible ids are a no-op returning `false`.
    pub fn delete<E: PortalEntity>(
        &mut self,
        user: &CurrentUser,
        id: &str,
    ) -> Result<bool, AppError> {
        if !user.role.can_manage(E::KIND) {
            return Err(AppError::forbidden(E::KIND, "delete"));
        }

        let viewer = self.viewer(user);
        let Some(existing) = E::store(self)
            .get(id)
            .filter(|r| visibility::is_visible(*r, &viewer))
            .cloned()
        else {
            tracing::debug!(kind = ?E::KIND, id, "delete of unknown record ignored");
            return Ok(false);
        };
        if !visibility::is_editable(&existing, &viewer) {
            return Err(AppError::forbidden(E::KIND, "delete"));
        }

        if !E::store_mut(self).delete(id) {
            return Ok(false);
        }
        sync::on_child_deleted(self, &existing);
        self.commit();

        tracing::info!(kind = ?E::KIND, id, user = %user.id, "record deleted");
        Ok(true)
    }

    /// Bump the revision and notify subscribers.
    pub(crate) fn commit(&mut self) {
        self.revision += 1;
        self.changes.send_replace(self.revision);
    }
}

#[cfg(test)]
mod tests;
