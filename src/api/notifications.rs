//! Notification workflow endpoints.

use axum::extract::{Path, State};

use super::{at_revision, success, ApiResult};
use crate::models::{CurrentUser, Notification};
use crate::AppState;

/// POST /api/notifications/{id}/send - Deliver and mark as sent.
pub async fn send_notification(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Notification> {
    let mut portal = state.portal.write().await;
    let revision_id = portal.revision();
    let sent = portal
        .send_notification(&user, &id, &state.channels)
        .map_err(at_revision(revision_id))?;
    success(sent, portal.revision())
}

/// POST /api/notifications/{id}/view - Count a view.
pub async fn view_notification(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Notification> {
    let mut portal = state.portal.write().await;
    let revision_id = portal.revision();
    let viewed = portal
        .record_notification_view(&user, &id)
        .map_err(at_revision(revision_id))?;
    success(viewed, portal.revision())
}
