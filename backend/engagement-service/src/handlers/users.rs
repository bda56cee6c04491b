use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::response;
use crate::services::PageParams;
use crate::AppState;

pub async fn user_tweets(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
    query: web::Query<PageParams>,
) -> Result<HttpResponse> {
    let page = state.queries.user_tweets(&user_id, *query).await?;
    Ok(response::ok(page, "User tweets fetched successfully"))
}

pub async fn user_playlists(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
    query: web::Query<PageParams>,
) -> Result<HttpResponse> {
    let page = state.queries.user_playlists(&user_id, *query).await?;
    Ok(response::ok(page, "User playlists fetched successfully"))
}
