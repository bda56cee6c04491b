use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::response;
use crate::services::ContentBody;
use crate::AppState;

/// POST /videos/{video_id}/comments
pub async fn add_comment(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    video_id: web::Path<String>,
    body: web::Json<ContentBody>,
) -> Result<HttpResponse> {
    let comment = state.content.add_comment(&video_id, user.0, &body).await?;
    Ok(response::created(comment, "Comment added successfully"))
}

pub async fn update_comment(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    comment_id: web::Path<String>,
    body: web::Json<ContentBody>,
) -> Result<HttpResponse> {
    let comment = state
        .content
        .update_comment(&comment_id, user.0, &body)
        .await?;
    Ok(response::ok(comment, "Comment updated successfully"))
}

pub async fn delete_comment(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    comment_id: web::Path<String>,
) -> Result<HttpResponse> {
    state.content.delete_comment(&comment_id, user.0).await?;
    Ok(response::ok((), "Comment deleted successfully"))
}
