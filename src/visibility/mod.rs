//! Role-scoped record visibility.
//!
//! A [`Viewer`] is the current user plus the join data the rules need:
//! which courses the user (or a parent's wards) is enrolled in, and which
//! courses the user owns. Viewers are resolved fresh for every derivation,
//! so identity changes and status changes apply on the next recomputation.

use std::collections::HashSet;

use crate::models::{CurrentUser, Role};
use crate::store::Portal;

/// The current user together with resolved enrollment and ownership links.
#[derive(Debug, Clone)]
pub struct Viewer {
    user: CurrentUser,
    linked_courses: HashSet<String>,
    owned_courses: HashSet<String>,
}

impl Viewer {
    /// Resolve links for `user` against the portal's current contents.
    pub fn resolve(portal: &Portal, user: &CurrentUser) -> Self {
        let subjects = user.subject_ids();

        let linked_courses = if subjects.is_empty() {
            HashSet::new()
        } else {
            portal
                .enrollments()
                .list()
                .iter()
                .filter(|e| e.status.is_active() && subjects.contains(&e.student_id.as_str()))
                .map(|e| e.course_id.clone())
                .collect()
        };

        let owned_courses = if user.role == Role::Faculty {
            portal
                .courses()
                .list()
                .iter()
                .filter(|c| c.owner_id == user.id)
                .map(|c| c.id.clone())
                .collect()
        } else {
            HashSet::new()
        };

        Self {
            user: user.clone(),
            linked_courses,
            owned_courses,
        }
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    /// Whether `owner_id` names the current user.
    pub fn is_owner(&self, owner_id: &str) -> bool {
        !self.user.id.is_empty() && self.user.id == owner_id
    }

    /// Whether the user (or a ward) holds a non-withdrawn enrollment in the course.
    pub fn is_linked_course(&self, course_id: &str) -> bool {
        self.linked_courses.contains(course_id)
    }

    pub fn owns_course(&self, course_id: &str) -> bool {
        self.owned_courses.contains(course_id)
    }

    /// Whether `student_id` is the user or one of their wards.
    pub fn is_subject(&self, student_id: &str) -> bool {
        self.user.subject_ids().contains(&student_id)
    }
}

/// Per-entity visibility rules for non-administrative roles.
pub trait Visible {
    fn is_visible_to(&self, viewer: &Viewer) -> bool;

    /// Whether a non-admin viewer may edit or delete this record.
    fn is_editable_by(&self, _viewer: &Viewer) -> bool {
        false
    }
}

/// Whether `record` is visible to `viewer`.
///
/// Administrative roles see everything; guests see nothing.
pub fn is_visible<E: Visible + ?Sized>(record: &E, viewer: &Viewer) -> bool {
    match viewer.role() {
        Role::SuperAdmin | Role::Admin => true,
        Role::Guest => false,
        _ => record.is_visible_to(viewer),
    }
}

/// Whether `viewer` may edit or delete `record`. Implies visibility.
pub fn is_editable<E: Visible + ?Sized>(record: &E, viewer: &Viewer) -> bool {
    match viewer.role() {
        Role::SuperAdmin | Role::Admin => true,
        Role::Guest => false,
        _ => record.is_visible_to(viewer) && record.is_editable_by(viewer),
    }
}

/// Shared rule for content that hangs off a course (sessions, assignments,
/// assessments, virtual sessions).
///
/// Faculty see what they own or what belongs to their courses. Students and
/// parents see published items of courses they are enrolled in.
pub fn course_content_visible(
    viewer: &Viewer,
    owner_id: &str,
    course_id: &str,
    published: bool,
) -> bool {
    match viewer.role() {
        Role::SuperAdmin | Role::Admin => true,
        Role::Faculty => viewer.is_owner(owner_id) || viewer.owns_course(course_id),
        Role::Student | Role::Parent => published && viewer.is_linked_course(course_id),
        Role::Guest => false,
    }
}

/// Faculty may edit course content they own or that belongs to their courses.
pub fn course_content_editable(viewer: &Viewer, owner_id: &str, course_id: &str) -> bool {
    viewer.role() == Role::Faculty && (viewer.is_owner(owner_id) || viewer.owns_course(course_id))
}

#[cfg(test)]
mod tests;
