//! Portal-wide metadata returned to the UI shell.

use serde::Serialize;

use super::{CurrentUser, EntityKind, Permissions};

/// Revision information for change detection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInfo {
    pub revision_id: i64,
    pub generated_at: String,
}

/// Visible record count of one entity kind.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KindSummary {
    pub kind: EntityKind,
    pub visible: usize,
}

/// Dashboard counts for the current user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalSummary {
    pub revision_id: i64,
    pub kinds: Vec<KindSummary>,
}

/// Identity as resolved by the backend, with derived capabilities.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Me {
    pub user: CurrentUser,
    pub permissions: Permissions,
}
