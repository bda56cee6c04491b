use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::response;
use crate::services::PageParams;
use crate::AppState;

pub async fn channel_stats(
    state: web::Data<AppState>,
    channel_id: web::Path<String>,
) -> Result<HttpResponse> {
    let stats = state.queries.channel_stats(&channel_id).await?;
    Ok(response::ok(stats, "Channel stats fetched successfully"))
}

pub async fn channel_videos(
    state: web::Data<AppState>,
    channel_id: web::Path<String>,
    query: web::Query<PageParams>,
) -> Result<HttpResponse> {
    let page = state.queries.channel_videos(&channel_id, *query).await?;
    Ok(response::ok(page, "Channel videos fetched successfully"))
}
