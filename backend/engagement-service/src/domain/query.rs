//! Video listing parameters

use std::cmp::Ordering;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoSortField {
    #[default]
    CreatedAt,
    Title,
    Views,
    Duration,
}

impl VideoSortField {
    /// SQL sort keys over `videos v`, most significant first. Titles sort
    /// case-folded under the byte collation so the order does not depend on
    /// the database locale; [`compare_titles`] is the in-process equivalent.
    pub fn sort_keys(self) -> &'static [&'static str] {
        match self {
            VideoSortField::CreatedAt => &["v.created_at"],
            VideoSortField::Title => &[r#"LOWER(v.title) COLLATE "C""#, r#"v.title COLLATE "C""#],
            VideoSortField::Views => &["v.view_count"],
            VideoSortField::Duration => &["v.duration_seconds"],
        }
    }
}

/// Case-folded comparison with the raw text as tie-break.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

impl FromStr for VideoSortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(VideoSortField::CreatedAt),
            "title" => Ok(VideoSortField::Title),
            "views" => Ok(VideoSortField::Views),
            "duration" => Ok(VideoSortField::Duration),
            other => Err(AppError::invalid(format!("Invalid sort field: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// `asc` (any case) sorts ascending; anything else, including absence,
    /// sorts descending.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw {
            Some(v) if v.trim().eq_ignore_ascii_case("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Validated listVideos query handed to the store
#[derive(Debug, Clone, PartialEq)]
pub struct VideoQuery {
    pub owner_id: Option<Uuid>,
    pub search: Option<String>,
    pub sort: VideoSortField,
    pub direction: SortDirection,
    pub offset: i64,
    pub limit: i64,
}

impl VideoQuery {
    /// ILIKE pattern for the search text with `%`, `_` and `\` escaped.
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_deref().map(|text| {
            let mut escaped = String::with_capacity(text.len() + 2);
            escaped.push('%');
            for ch in text.chars() {
                if matches!(ch, '%' | '_' | '\\') {
                    escaped.push('\\');
                }
                escaped.push(ch);
            }
            escaped.push('%');
            escaped
        })
    }

    /// Case-insensitive substring match against title or description.
    pub fn matches_text(&self, title: &str, description: &str) -> bool {
        match &self.search {
            None => true,
            Some(text) => {
                let needle = text.to_lowercase();
                title.to_lowercase().contains(&needle)
                    || description.to_lowercase().contains(&needle)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(search: Option<&str>) -> VideoQuery {
        VideoQuery {
            owner_id: None,
            search: search.map(str::to_string),
            sort: VideoSortField::default(),
            direction: SortDirection::default(),
            offset: 0,
            limit: 10,
        }
    }

    #[test]
    fn parses_supported_sort_fields() {
        assert_eq!("createdAt".parse::<VideoSortField>().unwrap(), VideoSortField::CreatedAt);
        assert_eq!("views".parse::<VideoSortField>().unwrap(), VideoSortField::Views);
        assert_eq!(
            "duration".parse::<VideoSortField>().unwrap().sort_keys(),
            &["v.duration_seconds"]
        );
        assert!("bogus".parse::<VideoSortField>().is_err());
        assert!("CreatedAt".parse::<VideoSortField>().is_err());
    }

    #[test]
    fn direction_defaults_to_descending() {
        assert_eq!(SortDirection::from_param(Some("asc")), SortDirection::Asc);
        assert_eq!(SortDirection::from_param(Some("ASC")), SortDirection::Asc);
        assert_eq!(SortDirection::from_param(Some("up")), SortDirection::Desc);
        assert_eq!(SortDirection::from_param(None), SortDirection::Desc);
    }

    #[test]
    fn titles_compare_case_folded() {
        let mut titles = vec!["banana", "Cherry", "apple", "Banana", "_intro", "Zebra"];
        titles.sort_by(|a, b| compare_titles(a, b));
        assert_eq!(titles, vec!["_intro", "apple", "Banana", "banana", "Cherry", "Zebra"]);
    }

    #[test]
    fn search_pattern_escapes_wildcards() {
        assert_eq!(query(Some("50%_off")).search_pattern().unwrap(), "%50\\%\\_off%");
        assert_eq!(query(None).search_pattern(), None);
    }

    #[test]
    fn text_match_is_case_insensitive_substring() {
        let q = query(Some("Cat"));
        assert!(q.matches_text("cats and dogs", ""));
        assert!(q.matches_text("Untitled", "a concatenated clip"));
        assert!(!q.matches_text("Ocean", "waves"));
    }
}
