//! # Filter/Sort Projection
//!
//! Pure functions over a merged collection:
//!
//! - [`filter_options`]: distinct statuses, authors and series, sorted.
//! - [`filter_books`]: items matching every set field of a [`Filters`].
//! - [`sort_books`]: stable ordering by one key and direction.
//! - [`filtered_and_sorted`]: the two combined, as presentation consumes it.
//!
//! String keys use [`locale_compare`]: letters compare without case or
//! accents first, so `Émile` sits between `Anna` and `Zola`. Exact ties are
//! broken with lowercase before uppercase, then unaccented before accented.

use crate::model::{BookResource, Filters, SortDirection, SortKey};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Values offered in the filter drop-downs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub statuses: Vec<String>,
    pub authors: Vec<String>,
    pub series: Vec<String>,
}

pub fn filter_options(items: &[BookResource]) -> FilterOptions {
    let mut statuses = BTreeSet::new();
    let mut authors = BTreeSet::new();
    let mut series = BTreeSet::new();

    for book in items {
        if let Some(status) = book.reading_status().filter(|s| !s.is_empty()) {
            statuses.insert(status);
        }
        if let Some(author) = book.author_name().filter(|s| !s.is_empty()) {
            authors.insert(author);
        }
        if let Some(name) = book.series_name().filter(|s| !s.is_empty()) {
            series.insert(name);
        }
    }

    FilterOptions {
        statuses: sorted_strings(statuses),
        authors: sorted_strings(authors),
        series: sorted_strings(series),
    }
}

fn sorted_strings(set: BTreeSet<&str>) -> Vec<String> {
    let mut values: Vec<String> = set.into_iter().map(str::to_string).collect();
    values.sort_by(|a, b| locale_compare(a, b));
    values
}

/// True when `book` satisfies every set field of `filters`.
pub fn matches(book: &BookResource, filters: &Filters) -> bool {
    if let Some(status) = filters.status_filter() {
        if book.reading_status() != Some(status) {
            return false;
        }
    }
    if let Some(author) = filters.author_filter() {
        if book.author_name() != Some(author) {
            return false;
        }
    }
    if let Some(series) = filters.series_filter() {
        if book.series_name() != Some(series) {
            return false;
        }
    }
    if let Some(min) = filters.rating_filter() {
        match book.effective_rating() {
            Some(rating) if rating >= min => {}
            _ => return false,
        }
    }
    if let Some(needle) = filters.search_filter() {
        let needle = needle.to_lowercase();
        let hit = |field: Option<&str>| field.is_some_and(|f| f.to_lowercase().contains(&needle));
        if !(hit(Some(book.title.as_str())) || hit(book.author_name()) || hit(book.series_name())) {
            return false;
        }
    }
    true
}

pub fn filter_books<'a>(items: &'a [BookResource], filters: &Filters) -> Vec<&'a BookResource> {
    items.iter().filter(|book| matches(book, filters)).collect()
}

/// Stable sort: ties keep their merge order in both directions.
pub fn sort_books(items: &mut [&BookResource], key: SortKey, direction: SortDirection) {
    items.sort_by(|a, b| {
        let ordering = compare_by(a, b, key);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

pub fn filtered_and_sorted(items: &[BookResource], filters: &Filters) -> Vec<BookResource> {
    let mut selected = filter_books(items, filters);
    sort_books(&mut selected, filters.sort_key, filters.sort_direction);
    selected.into_iter().cloned().collect()
}

fn compare_by(a: &BookResource, b: &BookResource, key: SortKey) -> Ordering {
    match key {
        SortKey::Title => locale_compare(&a.title, &b.title),
        SortKey::Author => locale_compare(a.author_name().unwrap_or(""), b.author_name().unwrap_or("")),
        SortKey::Series => locale_compare(a.series_name().unwrap_or(""), b.series_name().unwrap_or("")),
        SortKey::Rating => {
            let ra = a.effective_rating().unwrap_or(0.0);
            let rb = b.effective_rating().unwrap_or(0.0);
            ra.total_cmp(&rb)
        }
    }
}

/// Alphabetic comparison: accent- and case-folded first, lowercase before
/// uppercase on ties.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    collation_key(a).cmp(&collation_key(b)).then_with(|| {
        a.chars()
            .zip(b.chars())
            .find(|(x, y)| x != y)
            .map(|(x, y)| match (x.is_lowercase(), y.is_lowercase()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => x.cmp(&y),
            })
            .unwrap_or_else(|| a.len().cmp(&b.len()))
    })
}

/// Lowercase base letters: NFD with combining marks dropped. Letters that
/// have no decomposition are folded by hand.
fn collation_key(s: &str) -> String {
    let mut key = String::with_capacity(s.len());
    for c in s.nfd().filter(|c| !is_combining_mark(*c)).flat_map(char::to_lowercase) {
        match c {
            'ø' => key.push('o'),
            'đ' => key.push('d'),
            'ł' => key.push('l'),
            'æ' => key.push_str("ae"),
            'œ' => key.push_str("oe"),
            'ß' => key.push_str("ss"),
            other => key.push(other),
        }
    }
    key
}
