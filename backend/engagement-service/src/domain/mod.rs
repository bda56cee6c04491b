pub mod ids;
pub mod models;
pub mod query;

pub use ids::parse_id;
pub use models::*;
pub use query::{compare_titles, SortDirection, VideoQuery, VideoSortField};
