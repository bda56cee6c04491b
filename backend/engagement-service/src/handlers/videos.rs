use actix_web::{web, HttpResponse};
use tracing::debug;

use crate::error::Result;
use crate::middleware::{AuthenticatedUser, MaybeUser};
use crate::response;
use crate::services::{PageParams, VideoListRequest};
use crate::AppState;

/// GET /videos?page&limit&query&sortBy&sortType&userId
pub async fn list_videos(
    state: web::Data<AppState>,
    query: web::Query<VideoListRequest>,
    viewer: MaybeUser,
) -> Result<HttpResponse> {
    debug!(viewer = ?viewer.0, "Video listing requested");
    let listing = state.queries.list_videos(&query).await?;
    Ok(response::ok(listing, "Videos fetched successfully"))
}

pub async fn video_comments(
    state: web::Data<AppState>,
    video_id: web::Path<String>,
    query: web::Query<PageParams>,
) -> Result<HttpResponse> {
    let page = state.queries.video_comments(&video_id, *query).await?;
    Ok(response::ok(page, "Comments fetched successfully"))
}

pub async fn video_by_id(
    state: web::Data<AppState>,
    video_id: web::Path<String>,
) -> Result<HttpResponse> {
    let video = state.content.video_by_id(&video_id).await?;
    Ok(response::ok(video, "Video fetched successfully"))
}

/// PATCH /videos/{video_id}/publish; owner only
pub async fn toggle_publish(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    video_id: web::Path<String>,
) -> Result<HttpResponse> {
    let publish = state.content.toggle_publish(&video_id, user.0).await?;
    Ok(response::ok(publish, "Video status toggled successfully"))
}
