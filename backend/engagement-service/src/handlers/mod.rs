/// HTTP handlers for engagement endpoints
///
/// Everything except `/metrics` lives under `/api/v1`. Path ids arrive as raw
/// strings and are validated by the engines, so a malformed id is a 400
/// envelope rather than a routing miss.
pub mod channels;
pub mod comments;
pub mod health;
pub mod likes;
pub mod playlists;
pub mod subscriptions;
pub mod tweets;
pub mod users;
pub mod videos;

use actix_web::web;

use crate::error::AppError;

pub const API_PREFIX: &str = "/api/v1";

/// Query/path/body extraction failures become `InvalidArgument` envelopes
fn extractor_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::invalid(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::invalid(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::invalid(err.to_string()).into()),
    );
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    extractor_configs(cfg);

    cfg.route("/metrics", web::get().to(health::metrics_handler)).service(
        web::scope(API_PREFIX)
            .route("/healthcheck", web::get().to(health::healthcheck))
            .route("/health/ready", web::get().to(health::ready))
            .route("/videos", web::get().to(videos::list_videos))
            .route("/videos/{video_id}", web::get().to(videos::video_by_id))
            .route(
                "/videos/{video_id}/publish",
                web::patch().to(videos::toggle_publish),
            )
            .route(
                "/videos/{video_id}/comments",
                web::get().to(videos::video_comments),
            )
            .route(
                "/videos/{video_id}/comments",
                web::post().to(comments::add_comment),
            )
            .route(
                "/comments/{comment_id}",
                web::patch().to(comments::update_comment),
            )
            .route(
                "/comments/{comment_id}",
                web::delete().to(comments::delete_comment),
            )
            .route("/tweets", web::post().to(tweets::create_tweet))
            .route("/tweets/{tweet_id}", web::patch().to(tweets::update_tweet))
            .route("/tweets/{tweet_id}", web::delete().to(tweets::delete_tweet))
            .route(
                "/videos/{video_id}/like",
                web::post().to(likes::toggle_video_like),
            )
            .route(
                "/comments/{comment_id}/like",
                web::post().to(likes::toggle_comment_like),
            )
            .route(
                "/tweets/{tweet_id}/like",
                web::post().to(likes::toggle_tweet_like),
            )
            .route("/likes/videos", web::get().to(likes::liked_videos))
            .route(
                "/channels/{channel_id}/subscribe",
                web::post().to(subscriptions::toggle_subscription),
            )
            .route(
                "/channels/{channel_id}/subscribers",
                web::get().to(subscriptions::channel_subscribers),
            )
            .route(
                "/channels/{channel_id}/stats",
                web::get().to(channels::channel_stats),
            )
            .route(
                "/channels/{channel_id}/videos",
                web::get().to(channels::channel_videos),
            )
            .route("/users/{user_id}/tweets", web::get().to(users::user_tweets))
            .route(
                "/users/{user_id}/playlists",
                web::get().to(users::user_playlists),
            )
            .route(
                "/users/{user_id}/subscriptions",
                web::get().to(subscriptions::subscribed_channels),
            )
            .route("/playlists", web::post().to(playlists::create_playlist))
            .route(
                "/playlists/{playlist_id}",
                web::get().to(playlists::playlist_detail),
            )
            .route(
                "/playlists/{playlist_id}",
                web::patch().to(playlists::update_playlist),
            )
            .route(
                "/playlists/{playlist_id}",
                web::delete().to(playlists::delete_playlist),
            )
            .route(
                "/playlists/{playlist_id}/videos/{video_id}",
                web::patch().to(playlists::add_video),
            )
            .route(
                "/playlists/{playlist_id}/videos/{video_id}",
                web::delete().to(playlists::remove_video),
            ),
    );
}
