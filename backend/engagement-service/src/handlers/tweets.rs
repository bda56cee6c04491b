use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::response;
use crate::services::ContentBody;
use crate::AppState;

pub async fn create_tweet(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<ContentBody>,
) -> Result<HttpResponse> {
    let tweet = state.content.create_tweet(user.0, &body).await?;
    Ok(response::created(tweet, "Tweet added successfully"))
}

pub async fn update_tweet(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    tweet_id: web::Path<String>,
    body: web::Json<ContentBody>,
) -> Result<HttpResponse> {
    let tweet = state.content.update_tweet(&tweet_id, user.0, &body).await?;
    Ok(response::ok(tweet, "Tweet updated successfully"))
}

pub async fn delete_tweet(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    tweet_id: web::Path<String>,
) -> Result<HttpResponse> {
    state.content.delete_tweet(&tweet_id, user.0).await?;
    Ok(response::ok((), "Tweet deleted successfully"))
}
