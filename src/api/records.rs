//! Generic record endpoints, instantiated per entity kind.

use std::collections::BTreeMap;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::{at_revision, error, success, ApiResult};
use crate::errors::{AppError, AppErrorWithRevision};
use crate::export;
use crate::models::CurrentUser;
use crate::search::{FilterState, Page};
use crate::store::PortalEntity;
use crate::viewmodel::ListView;
use crate::AppState;

/// Query keys with a fixed meaning; every other key is a facet filter.
const SEARCH_PARAM: &str = "q";
const PAGE_PARAM: &str = "page";
const PAGE_SIZE_PARAM: &str = "pageSize";

/// Parsed list query string.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub filter: FilterState,
    pub page: usize,
    pub page_size: Option<usize>,
}

impl ListQuery {
    /// Split raw query parameters into search term, paging and facets of `E`.
    pub fn parse<E: PortalEntity>(mut params: BTreeMap<String, String>) -> Result<Self, AppError> {
        let search_term = params.remove(SEARCH_PARAM).unwrap_or_default();
        let page = match params.remove(PAGE_PARAM) {
            Some(raw) => parse_number(PAGE_PARAM, &raw)?,
            None => 1,
        };
        let page_size = params
            .remove(PAGE_SIZE_PARAM)
            .map(|raw| parse_number(PAGE_SIZE_PARAM, &raw))
            .transpose()?;

        let filter = FilterState {
            search_term,
            facets: params,
        };
        let unknown = filter.unknown_facets::<E>();
        if !unknown.is_empty() {
            return Err(AppError::BadRequest(format!(
                "Unknown filter {} for {}; expected one of: {}",
                unknown.join(", "),
                E::KIND.path(),
                E::FACETS.join(", ")
            )));
        }

        Ok(Self {
            filter,
            page,
            page_size,
        })
    }
}

fn parse_number(name: &str, raw: &str) -> Result<usize, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("{} must be a positive integer", name)))
}

/// Result of a delete request.
#[derive(Debug, Serialize)]
pub struct DeleteResult {
    pub deleted: bool,
}

/// GET /api/{kind} - Filtered, visible, paginated list.
pub async fn list_records<E: PortalEntity>(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<BTreeMap<String, String>>,
) -> ApiResult<Page<E>> {
    let portal = state.portal.read().await;
    let revision_id = portal.revision();

    let query = match ListQuery::parse::<E>(params) {
        Ok(query) => query,
        Err(e) => return error(e, revision_id),
    };

    let mut view = ListView::<E>::new(
        query.page_size.unwrap_or(state.config.default_page_size),
        state.config.max_page_size,
    );
    view.set_filter(query.filter);
    view.set_page(query.page);

    success(view.view(&portal, &user), revision_id)
}

/// GET /api/{kind}/{id} - One visible record.
pub async fn get_record<E: PortalEntity>(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<E> {
    let portal = state.portal.read().await;
    let revision_id = portal.revision();

    match portal.find_visible::<E>(&user, &id) {
        Some(record) => success(record.clone(), revision_id),
        None => error(AppError::not_found(E::KIND, &id), revision_id),
    }
}

/// POST /api/{kind} - Create a record from a form.
pub async fn create_record<E: PortalEntity>(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<E::Form>, JsonRejection>,
) -> ApiResult<E> {
    let mut portal = state.portal.write().await;
    let revision_id = portal.revision();

    let Json(form) = match payload {
        Ok(form) => form,
        Err(e) => return error(AppError::BadRequest(e.body_text()), revision_id),
    };

    let record = portal.create::<E>(&user, form).map_err(at_revision(revision_id))?;
    success(record, portal.revision())
}

/// PUT /api/{kind}/{id} - Merge a partial form into a record.
pub async fn update_record<E: PortalEntity>(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<E::Form>, JsonRejection>,
) -> ApiResult<E> {
    let mut portal = state.portal.write().await;
    let revision_id = portal.revision();

    let Json(form) = match payload {
        Ok(form) => form,
        Err(e) => return error(AppError::BadRequest(e.body_text()), revision_id),
    };

    let record = portal
        .update::<E>(&user, &id, form)
        .map_err(at_revision(revision_id))?;
    success(record, portal.revision())
}

/// DELETE /api/{kind}/{id} - Delete a record; absent ids report `deleted: false`.
pub async fn delete_record<E: PortalEntity>(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<DeleteResult> {
    let mut portal = state.portal.write().await;
    let revision_id = portal.revision();

    let deleted = portal
        .delete::<E>(&user, &id)
        .map_err(at_revision(revision_id))?;
    success(DeleteResult { deleted }, portal.revision())
}

/// GET /api/{kind}/export - CSV of every visible record matching the filters.
pub async fn export_records<E: PortalEntity>(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Response, AppErrorWithRevision> {
    let portal = state.portal.read().await;
    let revision_id = portal.revision();

    let query = ListQuery::parse::<E>(params).map_err(at_revision(revision_id))?;
    let records = portal.query::<E>(&user, &query.filter);
    let csv = export::to_csv(&records, &portal);

    tracing::debug!(kind = ?E::KIND, rows = records.len(), "export generated");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}.csv\"", E::KIND.path()),
            ),
        ],
        csv,
    )
        .into_response())
}
