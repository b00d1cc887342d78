use axum::extract::{Path, State};
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tracing::info;
use wanderlust_core::{validate_listing, ListingId};

use crate::error::{AppError, Result};
use crate::extract::ListingBody;
use crate::state::AppState;
use crate::views::{render, EditTemplate, IndexTemplate, NewTemplate, ShowTemplate};

/// `302 Found` to `location`.
fn found(location: impl Into<String>) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.into())]).into_response()
}

/// A malformed id can never match a stored listing.
fn parse_id(raw: &str) -> Result<ListingId> {
    ListingId::parse(raw).map_err(|_| AppError::listing_not_found())
}

pub async fn index_handler(State(state): State<AppState>) -> Result<Html<String>> {
    let listings = state.repository().list().await?;
    render(IndexTemplate::new(&listings))
}

pub async fn new_form_handler() -> Result<Html<String>> {
    render(NewTemplate)
}

pub async fn show_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Html<String>> {
    let id = parse_id(&id)?;
    let listing = state
        .repository()
        .get(&id)
        .await?
        .ok_or_else(AppError::listing_not_found)?;
    render(ShowTemplate::new(&listing))
}

pub async fn create_handler(
    State(state): State<AppState>,
    ListingBody(body): ListingBody,
) -> Result<Response> {
    let draft = validate_listing(&body)?;
    let listing = state.repository().insert(draft).await?;
    info!(listing_id = %listing.id, "created listing");
    Ok(found("/listings"))
}

pub async fn edit_form_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Html<String>> {
    let id = parse_id(&id)?;
    let listing = state
        .repository()
        .get(&id)
        .await?
        .ok_or_else(AppError::listing_not_found)?;
    render(EditTemplate::new(&listing))
}

pub async fn update_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
    ListingBody(body): ListingBody,
) -> Result<Response> {
    let draft = validate_listing(&body)?;
    let id = parse_id(&id)?;
    state
        .repository()
        .update(&id, draft)
        .await?
        .ok_or_else(AppError::listing_not_found)?;
    info!(listing_id = %id, "updated listing");
    Ok(found(format!("/listings/{id}")))
}

pub async fn delete_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    if !state.repository().delete(&id).await? {
        return Err(AppError::listing_not_found());
    }
    info!(listing_id = %id, "deleted listing");
    Ok(found("/listings"))
}
