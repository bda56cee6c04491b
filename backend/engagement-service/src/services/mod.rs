pub mod aggregation;
pub mod content;
pub mod listings;
pub mod pagination;
pub mod toggle;

pub use aggregation::{AggregationQueryEngine, PageParams, VideoListRequest};
pub use content::{ContentBody, ContentEngine, PlaylistBody};
pub use pagination::{PageRequest, Paged};
pub use toggle::RelationToggleEngine;
