//! LMS Portal Backend
//!
//! Role-scoped CRUD over an in-memory learning-management data set: entity
//! stores, visibility rules, search and pagination, dialog flows and the
//! counters that keep courses in step with their enrollments, served over a
//! REST API.

pub mod api;
pub mod auth;
pub mod config;
pub mod delivery;
pub mod errors;
pub mod export;
pub mod models;
pub mod search;
pub mod storage;
pub mod store;
pub mod viewmodel;
pub mod visibility;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use delivery::{DeliveryChannel, LogChannel};
use models::{
    Assessment, Assignment, Certificate, Course, Enrollment, LearningPath, Notification,
    NotificationTemplate, Session, UploadedFile, VirtualSession,
};
use storage::{FileStorage, SimulatedStorage};
use store::{Portal, PortalEntity};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub portal: Arc<RwLock<Portal>>,
    pub storage: Arc<dyn FileStorage>,
    pub channels: Arc<Vec<Arc<dyn DeliveryChannel>>>,
    pub config: Arc<Config>,
}

impl AppState {
    /// State with in-memory storage and log delivery, seeded per `config`.
    pub fn new(config: Config) -> Self {
        let portal = if config.seed_demo_data {
            Portal::seeded()
        } else {
            Portal::new()
        };
        Self::with_portal(portal, config)
    }

    pub fn with_portal(portal: Portal, config: Config) -> Self {
        Self {
            portal: Arc::new(RwLock::new(portal)),
            storage: Arc::new(SimulatedStorage::new()),
            channels: Arc::new(vec![Arc::new(LogChannel) as Arc<dyn DeliveryChannel>]),
            config: Arc::new(config),
        }
    }

    /// Replace the file storage backend.
    pub fn with_storage(mut self, storage: Arc<dyn FileStorage>) -> Self {
        self.storage = storage;
        self
    }
}

/// List, get, create, update, delete and export routes for one kind.
fn record_routes<E: PortalEntity>(router: Router<AppState>) -> Router<AppState> {
    let base = format!("/api/{}", E::KIND.path());
    router
        .route(
            &base,
            get(api::list_records::<E>).post(api::create_record::<E>),
        )
        .route(&format!("{}/export", base), get(api::export_records::<E>))
        .route(
            &format!("{}/{{id}}", base),
            get(api::get_record::<E>)
                .put(api::update_record::<E>)
                .delete(api::delete_record::<E>),
        )
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    let mut api_routes = Router::new()
        .route("/api/revision", get(api::get_revision))
        .route("/api/me", get(api::get_me))
        .route("/api/summary", get(api::get_summary));

    api_routes = record_routes::<Course>(api_routes);
    api_routes = record_routes::<Enrollment>(api_routes);
    api_routes = record_routes::<Notification>(api_routes);
    api_routes = record_routes::<Session>(api_routes);
    api_routes = record_routes::<Assignment>(api_routes);
    api_routes = record_routes::<Assessment>(api_routes);
    api_routes = record_routes::<Certificate>(api_routes);
    api_routes = record_routes::<VirtualSession>(api_routes);
    api_routes = record_routes::<LearningPath>(api_routes);
    api_routes = record_routes::<NotificationTemplate>(api_routes);

    let api_routes = api_routes
        // Notification workflow
        .route("/api/notifications/{id}/send", post(api::send_notification))
        .route("/api/notifications/{id}/view", post(api::view_notification))
        // Uploads: created by multipart upload; deleting also frees the stored bytes
        .route(
            "/api/uploads",
            get(api::list_records::<UploadedFile>).post(api::upload_file),
        )
        .route("/api/uploads/export", get(api::export_records::<UploadedFile>))
        .route(
            "/api/uploads/{id}",
            get(api::get_record::<UploadedFile>)
                .put(api::update_record::<UploadedFile>)
                .delete(api::delete_upload),
        )
        .route("/api/uploads/{id}/approve", post(api::approve_upload))
        .route("/api/uploads/{id}/reject", post(api::reject_upload))
        .route("/api/uploads/{id}/download", post(api::download_upload))
        .route("/files/{key}/{name}", get(api::serve_file))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
