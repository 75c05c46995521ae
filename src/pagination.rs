//! Cursor pagination for Sentry list endpoints.
//!
//! Sentry returns the cursor for the next page in the `Link` header:
//!
//! ```text
//! <https://sentry.io/api/0/projects/?cursor=0:0:1>; rel="previous"; results="false"; cursor="0:0:1",
//! <https://sentry.io/api/0/projects/?cursor=0:100:0>; rel="next"; results="true"; cursor="0:100:0"
//! ```

use reqwest::header::{HeaderMap, LINK};
use serde::Serialize;

/// A page of results from the Sentry API.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "T: Serialize")]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Cursor for the following page, absent on the last page.
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Create a new page from items and the next cursor.
    #[must_use]
    pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        Self { items, next_cursor }
    }

    /// Whether there are more pages.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    /// Map the items to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }

    /// Returns true if this page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns an iterator over the items in this page.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// One entry of a `Link` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct LinkEntry {
    rel: Option<String>,
    results: Option<String>,
    cursor: Option<String>,
}

fn parse_link_entry(entry: &str) -> Option<LinkEntry> {
    let entry = entry.trim();
    let rest = entry.strip_prefix('<')?;
    let (_, params) = rest.split_once('>')?;

    let mut link = LinkEntry::default();
    for param in params.split(';') {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').to_string();
        match key.trim() {
            "rel" => link.rel = Some(value),
            "results" => link.results = Some(value),
            "cursor" => link.cursor = Some(value),
            _ => {}
        }
    }
    Some(link)
}

/// Split a `Link` header into entries. Entries start with `<`, so a comma
/// only separates entries when the next token opens a new URL.
fn split_link_header(header: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut start = 0;
    for (idx, _) in header.match_indices(',') {
        if header[idx + 1..].trim_start().starts_with('<') {
            entries.push(&header[start..idx]);
            start = idx + 1;
        }
    }
    entries.push(&header[start..]);
    entries
}

/// Extract the cursor of the next page, if the Service says it has results.
#[must_use]
pub fn parse_next_cursor(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(split_link_header)
        .filter_map(parse_link_entry)
        .find(|link| link.rel.as_deref() == Some("next"))
        .filter(|link| link.results.as_deref() == Some("true"))
        .and_then(|link| link.cursor)
        .filter(|cursor| !cursor.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(link: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(LINK, HeaderValue::from_static(link));
        headers
    }

    #[test]
    fn test_next_cursor_with_results() {
        let h = headers(
            "<https://sentry.io/api/0/projects/?&cursor=100:-1:1>; rel=\"previous\"; results=\"false\"; cursor=\"100:-1:1\", \
             <https://sentry.io/api/0/projects/?&cursor=100:1:0>; rel=\"next\"; results=\"true\"; cursor=\"100:1:0\"",
        );
        assert_eq!(parse_next_cursor(&h), Some("100:1:0".to_string()));
    }

    #[test]
    fn test_next_cursor_without_results() {
        let h = headers(
            "<https://sentry.io/api/0/projects/?&cursor=100:-1:1>; rel=\"previous\"; results=\"true\"; cursor=\"100:-1:1\", \
             <https://sentry.io/api/0/projects/?&cursor=100:1:0>; rel=\"next\"; results=\"false\"; cursor=\"100:1:0\"",
        );
        assert_eq!(parse_next_cursor(&h), None);
    }

    #[test]
    fn test_next_cursor_empty_or_missing() {
        let h = headers("<https://sentry.io/api/0/projects/>; rel=\"next\"; results=\"true\"; cursor=\"\"");
        assert_eq!(parse_next_cursor(&h), None);
        assert_eq!(parse_next_cursor(&HeaderMap::new()), None);
    }

    #[test]
    fn test_comma_inside_url() {
        let h = headers(
            "<https://sentry.io/api/0/projects/?query=a,b&cursor=0:100:0>; rel=\"next\"; results=\"true\"; cursor=\"0:100:0\"",
        );
        assert_eq!(parse_next_cursor(&h), Some("0:100:0".to_string()));
    }

    #[test]
    fn test_page_map() {
        let page = Page::new(vec![1, 2, 3], Some("c1".to_string()));
        let mapped = page.map(|x| x * 2);
        assert_eq!(mapped.items, vec![2, 4, 6]);
        assert!(mapped.has_more());
        assert!(!Page::<i32>::new(vec![], None).has_more());
    }
}
