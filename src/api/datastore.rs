//! Portal-wide endpoints: revision, identity and dashboard counts.

use axum::extract::State;
use chrono::Utc;

use super::{success, ApiResult};
use crate::models::{CurrentUser, Me, PortalSummary, RevisionInfo};
use crate::AppState;

/// GET /api/revision - Get the current revision info.
pub async fn get_revision(State(state): State<AppState>) -> ApiResult<RevisionInfo> {
    let revision_id = state.portal.read().await.revision();

    success(
        RevisionInfo {
            revision_id,
            generated_at: Utc::now().to_rfc3339(),
        },
        revision_id,
    )
}

/// GET /api/me - The identity the request acts as, with its permissions.
pub async fn get_me(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Me> {
    let revision_id = state.portal.read().await.revision();
    let permissions = user.role.permissions();

    success(Me { user, permissions }, revision_id)
}

/// GET /api/summary - Visible record counts per kind.
pub async fn get_summary(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<PortalSummary> {
    let portal = state.portal.read().await;
    let revision_id = portal.revision();

    success(
        PortalSummary {
            revision_id,
            kinds: portal.summary(&user),
        },
        revision_id,
    )
}
