use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::response;
use crate::services::PageParams;
use crate::AppState;

pub async fn toggle_subscription(
    state: web::Data<AppState>,
    channel_id: web::Path<String>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let result = state
        .toggles
        .toggle_subscription(&channel_id, user.0)
        .await?;
    let message = if result.subscribed {
        "Subscribed Successfully"
    } else {
        "Unsubscribed Successfully"
    };
    Ok(response::ok(result, message))
}

pub async fn channel_subscribers(
    state: web::Data<AppState>,
    channel_id: web::Path<String>,
    query: web::Query<PageParams>,
) -> Result<HttpResponse> {
    let page = state
        .queries
        .channel_subscribers(&channel_id, *query)
        .await?;
    Ok(response::ok(page, "Subscribers fetched successfully"))
}

pub async fn subscribed_channels(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
    query: web::Query<PageParams>,
) -> Result<HttpResponse> {
    let page = state
        .queries
        .subscribed_channels(&user_id, *query)
        .await?;
    Ok(response::ok(page, "Subscribed channels fetched successfully"))
}
