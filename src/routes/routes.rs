//! Defines routes for page, attachment and metadata operations.
//!
//! ## Structure
//! - **Health**
//!   - `GET    /healthz`, `GET /readyz`
//!
//! - **Pages**
//!   - `GET    /pages`: list readable pages
//!   - `POST   /pages`: create page (metadata created alongside)
//!   - `GET    /pages/{id}`: page with its metadata
//!   - `PUT    /pages/{id}`: update page (needs `check_access_update` role)
//!   - `DELETE /pages/{id}`: delete page and metadata (needs `check_access_delete` role)
//!   - `GET    /pages/{id}/children`, `GET /pages/{id}/parent`
//!   - `GET    /pages/{id}/attachments`
//!
//! - **Attachments** (permissions borrowed from the owning page)
//!   - `POST   /attachments`, `DELETE /attachments/{id}`
//!
//! - **Metadata**
//!   - `GET    /metadata/{id}`, `PATCH /metadata/{id}`

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        metadata_handlers::{get_metadata, update_metadata},
        page_handlers::{
            create_attachment, create_page, delete_attachment, delete_page, get_page,
            list_pages, page_attachments, page_children, page_parent, update_page,
        },
    },
    services::repository::Repository,
};
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Build and return the router for all routes.
///
/// The router carries shared state (`Repository`) to all handlers.
pub fn routes() -> Router<Repository> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Page routes
        .route("/pages", get(list_pages).post(create_page))
        .route(
            "/pages/{id}",
            get(get_page).put(update_page).delete(delete_page),
        )
        .route("/pages/{id}/children", get(page_children))
        .route("/pages/{id}/parent", get(page_parent))
        .route("/pages/{id}/attachments", get(page_attachments))
        // Attachment routes
        .route("/attachments", post(create_attachment))
        .route("/attachments/{id}", delete(delete_attachment))
        // Metadata routes
        .route("/metadata/{id}", get(get_metadata).patch(update_metadata))
}
