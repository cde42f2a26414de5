//! Identity supplied by the identity provider for each request.

use serde::{Deserialize, Serialize};

use super::EntityKind;

/// Portal role of the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Faculty,
    Student,
    Parent,
    /// Unrecognized or absent role.
    Guest,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Faculty => "faculty",
            Role::Student => "student",
            Role::Parent => "parent",
            Role::Guest => "guest",
        }
    }

    /// Parse a role header value. Anything unrecognized maps to `Guest`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "super_admin" | "superadmin" => Role::SuperAdmin,
            "admin" => Role::Admin,
            "faculty" | "teacher" => Role::Faculty,
            "student" => Role::Student,
            "parent" => Role::Parent,
            _ => Role::Guest,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }

    /// Students and parents only see published content or content linked to them.
    pub fn is_dependent(&self) -> bool {
        matches!(self, Role::Student | Role::Parent)
    }

    /// Whether this role may create, edit and delete records of `kind`.
    pub fn can_manage(&self, kind: EntityKind) -> bool {
        match self {
            Role::SuperAdmin | Role::Admin => true,
            Role::Faculty => kind != EntityKind::Upload,
            // Students may self-enroll; the enrollment rules narrow this further.
            Role::Student => kind == EntityKind::Enrollment,
            Role::Parent | Role::Guest => false,
        }
    }

    /// Whether this role may upload files.
    pub fn can_upload(&self) -> bool {
        *self != Role::Guest
    }

    pub fn permissions(&self) -> Permissions {
        Permissions {
            manage: EntityKind::ALL
                .iter()
                .copied()
                .filter(|k| self.can_manage(*k))
                .collect(),
            can_upload: self.can_upload(),
            can_approve_uploads: self.is_admin(),
            can_send_notifications: self.can_manage(EntityKind::Notification),
        }
    }
}

/// Capabilities derived from a role, reported to the UI shell.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub manage: Vec<EntityKind>,
    pub can_upload: bool,
    pub can_approve_uploads: bool,
    pub can_send_notifications: bool,
}

/// The user a request acts on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub role: Role,
    /// Student ids a parent is linked to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wards: Vec<String>,
}

impl CurrentUser {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            wards: Vec::new(),
        }
    }

    pub fn guest() -> Self {
        Self::new("", "Guest", Role::Guest)
    }

    pub fn with_wards(mut self, wards: Vec<String>) -> Self {
        self.wards = wards;
        self
    }

    /// Student ids whose enrollments and certificates this user may see.
    pub fn subject_ids(&self) -> Vec<&str> {
        match self.role {
            Role::Student => vec![self.id.as_str()],
            Role::Parent => self.wards.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("Admin"), Role::Admin);
        assert_eq!(Role::parse("super-admin"), Role::SuperAdmin);
        assert_eq!(Role::parse(" student "), Role::Student);
        assert_eq!(Role::parse("janitor"), Role::Guest);
        assert_eq!(Role::parse(""), Role::Guest);
    }

    #[test]
    fn test_manage_permissions() {
        assert!(Role::Admin.can_manage(EntityKind::Upload));
        assert!(Role::Faculty.can_manage(EntityKind::Course));
        assert!(!Role::Faculty.can_manage(EntityKind::Upload));
        assert!(Role::Student.can_manage(EntityKind::Enrollment));
        assert!(!Role::Student.can_manage(EntityKind::Course));
        assert!(!Role::Guest.can_upload());
    }

    #[test]
    fn test_subject_ids() {
        let student = CurrentUser::new("STU1", "Ana", Role::Student);
        assert_eq!(student.subject_ids(), vec!["STU1"]);

        let parent = CurrentUser::new("P1", "Bo", Role::Parent)
            .with_wards(vec!["STU1".into(), "STU2".into()]);
        assert_eq!(parent.subject_ids(), vec!["STU1", "STU2"]);

        let admin = CurrentUser::new("ADM", "Root", Role::Admin);
        assert!(admin.subject_ids().is_empty());
    }
}
