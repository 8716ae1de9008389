use serde::{Deserialize, Serialize};

/// Field the projection orders by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Title,
    Author,
    Series,
    Rating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Filter and sort configuration chosen by the user.
///
/// Replaced wholesale on every change. A field that is `None`, empty or
/// zero is unset and matches every item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Filters {
    pub status: Option<String>,
    pub author: Option<String>,
    pub series: Option<String>,
    pub min_rating: Option<f32>,
    pub search: String,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
}

impl Filters {
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_series(mut self, series: impl Into<String>) -> Self {
        self.series = Some(series.into());
        self
    }

    pub fn with_min_rating(mut self, rating: f32) -> Self {
        self.min_rating = Some(rating);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn sorted_by(mut self, key: SortKey, direction: SortDirection) -> Self {
        self.sort_key = key;
        self.sort_direction = direction;
        self
    }

    pub(crate) fn status_filter(&self) -> Option<&str> {
        non_empty(self.status.as_deref())
    }

    pub(crate) fn author_filter(&self) -> Option<&str> {
        non_empty(self.author.as_deref())
    }

    pub(crate) fn series_filter(&self) -> Option<&str> {
        non_empty(self.series.as_deref())
    }

    pub(crate) fn rating_filter(&self) -> Option<f32> {
        self.min_rating.filter(|r| *r > 0.0)
    }

    /// Whitespace-only search is unset; otherwise the text is matched as typed.
    pub(crate) fn search_filter(&self) -> Option<&str> {
        if self.search.trim().is_empty() {
            None
        } else {
            Some(&self.search)
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
