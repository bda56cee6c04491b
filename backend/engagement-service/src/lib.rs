/// Engagement Service Library
///
/// Likes, subscriptions and the aggregate read side of the video platform:
/// paged listings of videos, comments, tweets, playlists and subscribers, plus
/// per-channel statistics.
///
/// # Modules
///
/// - `domain`: entities, identifiers and listing parameters
/// - `repository`: store traits with PostgreSQL and in-memory implementations
/// - `services`: the relation toggle engine, the aggregation query engine and
///   the owner-checked content engine
/// - `handlers`: HTTP endpoints wrapping the engines in the response envelope
/// - `middleware`: identity resolution and request metrics
/// - `config`, `error`, `metrics`, `response`: ambient plumbing
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod repository;
pub mod response;
pub mod services;

use std::sync::Arc;

pub use config::Config;
pub use error::{AppError, Result};

use repository::{Repositories, StoreHealth};
use services::{AggregationQueryEngine, ContentEngine, RelationToggleEngine};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub toggles: RelationToggleEngine,
    pub queries: AggregationQueryEngine,
    pub content: ContentEngine,
    pub health: Arc<dyn StoreHealth>,
}

impl AppState {
    pub fn new(repos: Repositories, allow_self_subscription: bool) -> Self {
        Self {
            health: repos.health.clone(),
            toggles: RelationToggleEngine::new(repos.clone(), allow_self_subscription),
            queries: AggregationQueryEngine::new(repos.clone()),
            content: ContentEngine::new(repos),
        }
    }
}
