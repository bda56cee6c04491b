use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::response;
use crate::services::PlaylistBody;
use crate::AppState;

pub async fn playlist_detail(
    state: web::Data<AppState>,
    playlist_id: web::Path<String>,
) -> Result<HttpResponse> {
    let playlist = state.queries.playlist_detail(&playlist_id).await?;
    Ok(response::ok(playlist, "Playlist fetched successfully"))
}

pub async fn create_playlist(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<PlaylistBody>,
) -> Result<HttpResponse> {
    let playlist = state.content.create_playlist(user.0, &body).await?;
    Ok(response::created(playlist, "Playlist created successfully"))
}

pub async fn update_playlist(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    playlist_id: web::Path<String>,
    body: web::Json<PlaylistBody>,
) -> Result<HttpResponse> {
    let playlist = state
        .content
        .update_playlist(&playlist_id, user.0, &body)
        .await?;
    Ok(response::ok(playlist, "Playlist updated successfully"))
}

pub async fn delete_playlist(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    playlist_id: web::Path<String>,
) -> Result<HttpResponse> {
    state.content.delete_playlist(&playlist_id, user.0).await?;
    Ok(response::ok((), "Playlist deleted successfully"))
}

/// PATCH /playlists/{playlist_id}/videos/{video_id}
pub async fn add_video(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (playlist_id, video_id) = path.into_inner();
    let playlist = state
        .content
        .add_video_to_playlist(&playlist_id, &video_id, user.0)
        .await?;
    Ok(response::ok(playlist, "Video added to playlist successfully"))
}

pub async fn remove_video(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (playlist_id, video_id) = path.into_inner();
    let playlist = state
        .content
        .remove_video_from_playlist(&playlist_id, &video_id, user.0)
        .await?;
    Ok(response::ok(playlist, "Video removed from playlist successfully"))
}
