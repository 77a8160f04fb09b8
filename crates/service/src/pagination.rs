//! Pagination utilities for service layer
//!
//! `Pagination` normalizes the requested page; `Paginated` is the
//! length-aware result handed to the page renderer, including the
//! navigable page links the list view draws its controls from.

use std::ops::RangeInclusive;

use serde::Serialize;

pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 100;
/// Page numbers kept on each side of the current page before collapsing.
pub const ON_EACH_SIDE: u64 = 3;
pub const PREVIOUS_LABEL: &str = "&laquo; Previous";
pub const NEXT_LABEL: &str = "Next &raquo;";
pub const SEPARATOR_LABEL: &str = "...";

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32) -> Self { Self { page, per_page } }

    /// Read a `?page=` value; anything but a positive integer means page 1.
    pub fn page_from_query(raw: Option<&str>) -> u32 {
        raw.and_then(|s| s.trim().parse::<u32>().ok()).filter(|p| *p > 0).unwrap_or(1)
    }

    /// Clamp to sane defaults and convert to `u64` as (zero-based page index, per page)
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, MAX_PER_PAGE);
        ((page - 1) as u64, per_page as u64)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: DEFAULT_PER_PAGE } }
}

/// One entry of the pagination control strip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub url: Option<String>,
    pub label: String,
    pub active: bool,
}

/// A page of items with everything needed to draw pagination controls.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub current_page: u64,
    pub data: Vec<T>,
    pub first_page_url: String,
    pub from: Option<u64>,
    pub last_page: u64,
    pub last_page_url: String,
    pub links: Vec<PageLink>,
    pub next_page_url: Option<String>,
    pub path: String,
    pub per_page: u64,
    pub prev_page_url: Option<String>,
    pub to: Option<u64>,
    pub total: u64,
}

impl<T> Paginated<T> {
    /// `data` must already be the slice for `pagination`'s page; `path` is the
    /// base URL page numbers are appended to.
    pub fn new(data: Vec<T>, total: u64, pagination: Pagination, path: &str) -> Self {
        let (index, per_page) = pagination.normalize();
        let current = index + 1;
        let last = total.div_ceil(per_page).max(1);
        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            let from = index * per_page + 1;
            (Some(from), Some(from + data.len() as u64 - 1))
        };
        let prev_page_url = (current > 1).then(|| page_url(path, current - 1));
        let next_page_url = (current < last).then(|| page_url(path, current + 1));
        let links = build_links(current, last, path, prev_page_url.clone(), next_page_url.clone());
        Self {
            current_page: current,
            data,
            first_page_url: page_url(path, 1),
            from,
            last_page: last,
            last_page_url: page_url(path, last),
            links,
            next_page_url,
            path: path.to_string(),
            per_page,
            prev_page_url,
            to,
            total,
        }
    }

    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// More than one page exists.
    pub fn has_pages(&self) -> bool { self.last_page > 1 }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            current_page: self.current_page,
            data: self.data.into_iter().map(f).collect(),
            first_page_url: self.first_page_url,
            from: self.from,
            last_page: self.last_page,
            last_page_url: self.last_page_url,
            links: self.links,
            next_page_url: self.next_page_url,
            path: self.path,
            per_page: self.per_page,
            prev_page_url: self.prev_page_url,
            to: self.to,
            total: self.total,
        }
    }
}

fn page_url(path: &str, page: u64) -> String { format!("{path}?page={page}") }

#[derive(Debug, PartialEq, Eq)]
enum Element {
    Pages(RangeInclusive<u64>),
    Separator,
}

/// Page numbers to show: all of them for short lists, otherwise the edges
/// plus a slider around the current page, joined by separators.
fn window(current: u64, last: u64) -> Vec<Element> {
    use Element::*;
    if last < ON_EACH_SIDE * 2 + 8 {
        return vec![Pages(1..=last)];
    }
    let window = ON_EACH_SIDE + 4;
    if current <= window {
        vec![Pages(1..=window + ON_EACH_SIDE), Separator, Pages(last - 1..=last)]
    } else if current > last - window {
        vec![Pages(1..=2), Separator, Pages(last - (window + ON_EACH_SIDE - 1)..=last)]
    } else {
        vec![
            Pages(1..=2),
            Separator,
            Pages(current - ON_EACH_SIDE..=current + ON_EACH_SIDE),
            Separator,
            Pages(last - 1..=last),
        ]
    }
}

fn build_links(current: u64, last: u64, path: &str, prev: Option<String>, next: Option<String>) -> Vec<PageLink> {
    let mut links = vec![PageLink { url: prev, label: PREVIOUS_LABEL.into(), active: false }];
    for element in window(current, last) {
        match element {
            Element::Separator => links.push(PageLink { url: None, label: SEPARATOR_LABEL.into(), active: false }),
            Element::Pages(range) => links.extend(range.map(|p| PageLink {
                url: Some(page_url(path, p)),
                label: p.to_string(),
                active: p == current,
            })),
        }
    }
    links.push(PageLink { url: next, label: NEXT_LABEL.into(), active: false });
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels<T>(p: &Paginated<T>) -> Vec<&str> { p.links.iter().map(|l| l.label.as_str()).collect() }

    fn page_of(total: u64, page: u32) -> Paginated<u64> {
        let p = Pagination::new(page, 10);
        let (index, per) = p.normalize();
        let data: Vec<u64> = (index * per..total.min(index * per + per)).collect();
        Paginated::new(data, total, p, "/products")
    }

    #[test]
    fn normalize_clamps_zero_to_defaults() {
        let (idx, per) = Pagination { page: 0, per_page: 0 }.normalize();
        assert_eq!(idx, 0);
        assert_eq!(per, 1);
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let (idx, per) = Pagination { page: 5, per_page: 1000 }.normalize();
        assert_eq!(idx, 4);
        assert_eq!(per, 100);
    }

    #[test]
    fn default_values_are_sane() {
        let d = Pagination::default();
        assert_eq!(d.page, 1);
        assert_eq!(d.per_page, 10);
    }

    #[test]
    fn page_query_falls_back_to_first_page() {
        assert_eq!(Pagination::page_from_query(None), 1);
        assert_eq!(Pagination::page_from_query(Some("abc")), 1);
        assert_eq!(Pagination::page_from_query(Some("0")), 1);
        assert_eq!(Pagination::page_from_query(Some("-2")), 1);
        assert_eq!(Pagination::page_from_query(Some("3")), 3);
    }

    #[test]
    fn empty_result_has_single_page() {
        let p = page_of(0, 1);
        assert!(p.is_empty());
        assert!(!p.has_pages());
        assert_eq!(p.last_page, 1);
        assert_eq!(p.from, None);
        assert_eq!(p.to, None);
        assert_eq!(labels(&p), vec![PREVIOUS_LABEL, "1", NEXT_LABEL]);
        assert!(p.links[1].active);
        assert_eq!(p.prev_page_url, None);
        assert_eq!(p.next_page_url, None);
    }

    #[test]
    fn middle_page_metadata() {
        let p = page_of(25, 2);
        assert_eq!(p.current_page, 2);
        assert_eq!(p.last_page, 3);
        assert_eq!(p.from, Some(11));
        assert_eq!(p.to, Some(20));
        assert_eq!(p.per_page, 10);
        assert_eq!(p.prev_page_url.as_deref(), Some("/products?page=1"));
        assert_eq!(p.next_page_url.as_deref(), Some("/products?page=3"));
        assert_eq!(p.first_page_url, "/products?page=1");
        assert_eq!(p.last_page_url, "/products?page=3");
        let active: Vec<&str> = p.links.iter().filter(|l| l.active).map(|l| l.label.as_str()).collect();
        assert_eq!(active, vec!["2"]);
    }

    #[test]
    fn last_partial_page() {
        let p = page_of(25, 3);
        assert_eq!(p.data.len(), 5);
        assert_eq!(p.from, Some(21));
        assert_eq!(p.to, Some(25));
        assert_eq!(p.next_page_url, None);
    }

    #[test]
    fn page_beyond_last_is_empty_but_valid() {
        let p = page_of(25, 9);
        assert!(p.is_empty());
        assert_eq!(p.current_page, 9);
        assert_eq!(p.last_page, 3);
        assert_eq!(p.from, None);
        assert_eq!(p.prev_page_url.as_deref(), Some("/products?page=8"));
        assert_eq!(p.next_page_url, None);
        assert!(p.links.iter().all(|l| !l.active));
    }

    #[test]
    fn slider_near_beginning() {
        let p = page_of(200, 2);
        assert_eq!(
            labels(&p),
            vec![PREVIOUS_LABEL, "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "...", "19", "20", NEXT_LABEL]
        );
        assert_eq!(p.links[11].url, None);
    }

    #[test]
    fn slider_near_end() {
        let p = page_of(200, 18);
        assert_eq!(
            labels(&p),
            vec![PREVIOUS_LABEL, "1", "2", "...", "11", "12", "13", "14", "15", "16", "17", "18", "19", "20", NEXT_LABEL]
        );
    }

    #[test]
    fn slider_in_the_middle() {
        let p = page_of(200, 10);
        assert_eq!(
            labels(&p),
            vec![PREVIOUS_LABEL, "1", "2", "...", "7", "8", "9", "10", "11", "12", "13", "...", "19", "20", NEXT_LABEL]
        );
    }

    #[test]
    fn thirteen_pages_are_listed_in_full() {
        let p = page_of(130, 7);
        assert_eq!(p.links.len(), 13 + 2);
        assert!(p.links.iter().all(|l| l.label != SEPARATOR_LABEL));
    }

    #[test]
    fn map_keeps_metadata() {
        let p = page_of(25, 2).map(|n| n.to_string());
        assert_eq!(p.data[0], "10");
        assert_eq!(p.total, 25);
        assert_eq!(p.links.len(), 5);
    }
}
