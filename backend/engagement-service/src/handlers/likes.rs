use actix_web::{web, HttpResponse};

use crate::domain::TargetKind;
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::response;
use crate::services::PageParams;
use crate::AppState;

async fn toggle(
    state: &AppState,
    kind: TargetKind,
    target_id: &str,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let state_after = state.toggles.toggle_like(kind, target_id, user.0).await?;
    let verb = if state_after.liked { "liked" } else { "unliked" };
    Ok(response::ok(
        state_after,
        format!("{} {} successfully", kind.label(), verb),
    ))
}

pub async fn toggle_video_like(
    state: web::Data<AppState>,
    video_id: web::Path<String>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    toggle(&state, TargetKind::Video, &video_id, user).await
}

pub async fn toggle_comment_like(
    state: web::Data<AppState>,
    comment_id: web::Path<String>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    toggle(&state, TargetKind::Comment, &comment_id, user).await
}

pub async fn toggle_tweet_like(
    state: web::Data<AppState>,
    tweet_id: web::Path<String>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    toggle(&state, TargetKind::Tweet, &tweet_id, user).await
}

/// Videos liked by the caller. Extractors run in argument order, so an
/// anonymous caller gets 401 before the query string is looked at.
pub async fn liked_videos(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<PageParams>,
) -> Result<HttpResponse> {
    let page = query.request()?;
    let liked = state.toggles.list_liked_videos(user.0, page).await?;
    Ok(response::ok(liked, "Liked videos fetched successfully"))
}
