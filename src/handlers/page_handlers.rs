//! HTTP handlers for pages and their attachments.
//! Access filtering, role checks and metadata upkeep all happen in the
//! `Repository`; handlers only translate between JSON and models.

use crate::{
    behavior::{CallerContext, ContentRecord, Criteria},
    errors::AppError,
    models::{attachment::Attachment, metadata::MetadataRecord, page::Page},
    services::repository::Repository,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

/// Body of `POST /pages` and `PUT /pages/{id}`.
#[derive(Debug, Deserialize)]
pub struct PageInput {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// Body of `POST /attachments`.
#[derive(Debug, Deserialize)]
pub struct AttachmentInput {
    pub page_id: i64,
    pub name: String,
    pub url: String,
}

/// A page together with its metadata row.
#[derive(Debug, Serialize)]
pub struct PageResponse {
    #[serde(flatten)]
    pub page: Page,
    pub metadata: Option<MetadataRecord>,
}

async fn load_page(repo: &Repository, caller: &CallerContext, id: i64) -> Result<Page, AppError> {
    repo.find_by_id::<Page>(caller, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("{} #{} not found", Page::MODEL, id)))
}

/// GET `/pages`: pages readable by the caller.
pub async fn list_pages(
    State(repo): State<Repository>,
    caller: CallerContext,
) -> Result<Json<Vec<Page>>, AppError> {
    let pages = repo
        .find_all::<Page>(&caller, Criteria::new().order_by("t.id ASC"))
        .await?;
    Ok(Json(pages))
}

/// GET `/pages/{id}`
pub async fn get_page(
    State(repo): State<Repository>,
    caller: CallerContext,
    Path(id): Path<i64>,
) -> Result<Json<PageResponse>, AppError> {
    let page = load_page(&repo, &caller, id).await?;
    let metadata = repo.interceptor().resolver().resolve(&page).await?;
    Ok(Json(PageResponse { page, metadata }))
}

/// POST `/pages`: create a page; its metadata row is created alongside.
pub async fn create_page(
    State(repo): State<Repository>,
    caller: CallerContext,
    Json(input): Json<PageInput>,
) -> Result<impl IntoResponse, AppError> {
    let mut page = Page::new(input.title, input.body);
    let metadata = repo.save(&caller, &mut page).await?;
    Ok((StatusCode::CREATED, Json(PageResponse { page, metadata })))
}

/// PUT `/pages/{id}`: replace title and body.
pub async fn update_page(
    State(repo): State<Repository>,
    caller: CallerContext,
    Path(id): Path<i64>,
    Json(input): Json<PageInput>,
) -> Result<Json<PageResponse>, AppError> {
    let (page, metadata) = repo
        .update_with::<Page, _>(&caller, id, move |page| {
            page.title = input.title;
            page.body = input.body;
        })
        .await?;
    Ok(Json(PageResponse { page, metadata }))
}

/// DELETE `/pages/{id}`: removes the page and its metadata row.
pub async fn delete_page(
    State(repo): State<Repository>,
    caller: CallerContext,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let page = load_page(&repo, &caller, id).await?;
    repo.delete(&caller, &page).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/pages/{id}/children`: readable child pages in tree order.
pub async fn page_children(
    State(repo): State<Repository>,
    caller: CallerContext,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Page>>, AppError> {
    let page = load_page(&repo, &caller, id).await?;
    let mut navigator = repo.navigator(&caller, &page);
    let children = navigator.children().await?.to_vec();
    Ok(Json(children))
}

/// GET `/pages/{id}/parent`: `null` when the page is a root or the parent
/// is not readable.
pub async fn page_parent(
    State(repo): State<Repository>,
    caller: CallerContext,
    Path(id): Path<i64>,
) -> Result<Json<Option<Page>>, AppError> {
    let page = load_page(&repo, &caller, id).await?;
    let mut navigator = repo.navigator(&caller, &page);
    let parent = navigator.parent().await?.cloned();
    Ok(Json(parent))
}

/// GET `/pages/{id}/attachments`
pub async fn page_attachments(
    State(repo): State<Repository>,
    caller: CallerContext,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Attachment>>, AppError> {
    load_page(&repo, &caller, id).await?;
    let criteria = Criteria::new()
        .where_eq("t.page_id", id)
        .order_by("t.id ASC");
    let attachments = repo.find_all::<Attachment>(&caller, criteria).await?;
    Ok(Json(attachments))
}

/// POST `/attachments`: requires the update role of the owning page.
pub async fn create_attachment(
    State(repo): State<Repository>,
    caller: CallerContext,
    Json(input): Json<AttachmentInput>,
) -> Result<impl IntoResponse, AppError> {
    load_page(&repo, &caller, input.page_id).await?;
    let mut attachment = Attachment {
        id: None,
        page_id: input.page_id,
        name: input.name,
        url: input.url,
    };
    repo.save(&caller, &mut attachment).await?;
    Ok((StatusCode::CREATED, Json(attachment)))
}

/// DELETE `/attachments/{id}`: requires the delete role of the owning page.
pub async fn delete_attachment(
    State(repo): State<Repository>,
    caller: CallerContext,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let attachment = repo
        .find_by_id::<Attachment>(&caller, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("{} #{} not found", Attachment::MODEL, id)))?;
    repo.delete(&caller, &attachment).await?;
    Ok(StatusCode::NO_CONTENT)
}
