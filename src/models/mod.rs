//! Data models for the LMS portal.
//!
//! Every record type keeps its editable fields apart from system-owned ones
//! (id, counters, timestamps). Edits arrive through the companion `*Form` type,
//! which only carries editable fields.

mod assessment;
mod assignment;
mod certificate;
mod course;
mod datastore;
mod enrollment;
mod learning_path;
mod notification;
mod session;
mod template;
mod upload;
mod user;
mod virtual_session;

pub use assessment::*;
pub use assignment::*;
pub use certificate::*;
pub use course::*;
pub use datastore::*;
pub use enrollment::*;
pub use learning_path::*;
pub use notification::*;
pub use session::*;
pub use template::*;
pub use upload::*;
pub use user::*;
pub use virtual_session::*;

use serde::{Deserialize, Serialize};

/// The entity types managed by the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Course,
    Enrollment,
    Notification,
    Session,
    Assignment,
    Assessment,
    Certificate,
    VirtualSession,
    LearningPath,
    NotificationTemplate,
    Upload,
}

impl EntityKind {
    pub const ALL: [EntityKind; 11] = [
        EntityKind::Course,
        EntityKind::Enrollment,
        EntityKind::Notification,
        EntityKind::Session,
        EntityKind::Assignment,
        EntityKind::Assessment,
        EntityKind::Certificate,
        EntityKind::VirtualSession,
        EntityKind::LearningPath,
        EntityKind::NotificationTemplate,
        EntityKind::Upload,
    ];

    /// Prefix of the sequential ids handed out by the store.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            EntityKind::Course => "C",
            EntityKind::Enrollment => "E",
            EntityKind::Notification => "N",
            EntityKind::Session => "S",
            EntityKind::Assignment => "A",
            EntityKind::Assessment => "AS",
            EntityKind::Certificate => "CERT",
            EntityKind::VirtualSession => "VS",
            EntityKind::LearningPath => "LP",
            EntityKind::NotificationTemplate => "T",
            EntityKind::Upload => "F",
        }
    }

    /// Collection segment used in API paths.
    pub fn path(&self) -> &'static str {
        match self {
            EntityKind::Course => "courses",
            EntityKind::Enrollment => "enrollments",
            EntityKind::Notification => "notifications",
            EntityKind::Session => "sessions",
            EntityKind::Assignment => "assignments",
            EntityKind::Assessment => "assessments",
            EntityKind::Certificate => "certificates",
            EntityKind::VirtualSession => "virtual-sessions",
            EntityKind::LearningPath => "learning-paths",
            EntityKind::NotificationTemplate => "notification-templates",
            EntityKind::Upload => "uploads",
        }
    }

    /// Human readable singular name, used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Course => "Course",
            EntityKind::Enrollment => "Enrollment",
            EntityKind::Notification => "Notification",
            EntityKind::Session => "Session",
            EntityKind::Assignment => "Assignment",
            EntityKind::Assessment => "Assessment",
            EntityKind::Certificate => "Certificate",
            EntityKind::VirtualSession => "Virtual session",
            EntityKind::LearningPath => "Learning path",
            EntityKind::NotificationTemplate => "Notification template",
            EntityKind::Upload => "Upload",
        }
    }
}

/// Overwrite `target` when the form carries a value.
pub(crate) fn merge<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_prefixes_and_paths_are_unique() {
        let prefixes: HashSet<_> = EntityKind::ALL.iter().map(|k| k.id_prefix()).collect();
        let paths: HashSet<_> = EntityKind::ALL.iter().map(|k| k.path()).collect();
        assert_eq!(prefixes.len(), EntityKind::ALL.len());
        assert_eq!(paths.len(), EntityKind::ALL.len());
    }
}
