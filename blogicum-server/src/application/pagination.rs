//! Fixed-size pages over an ordered listing.
//!
//! Out-of-range page numbers are clamped into `1..=num_pages`, so every
//! request resolves to a real page. An empty listing still has one (empty)
//! page.

use serde::{Deserialize, Serialize};

pub const PAGE_SIZE: u64 = 10;

/// The `?page=` query parameter. Kept as text so that garbage degrades to the
/// first page instead of failing extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn requested(&self) -> Option<&str> {
        self.page.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    count: u64,
    per_page: u64,
}

impl Paginator {
    pub fn new(count: u64, per_page: u64) -> Self {
        Self {
            count,
            per_page: per_page.max(1),
        }
    }

    pub fn num_pages(&self) -> u64 {
        self.count.div_ceil(self.per_page).max(1)
    }

    pub fn resolve(&self, requested: Option<&str>) -> u64 {
        let number = requested
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or(1);
        number.clamp(1, self.num_pages() as i64) as u64
    }

    pub fn offset(&self, number: u64) -> u64 {
        (number.saturating_sub(1)) * self.per_page
    }

    pub fn limit(&self) -> u64 {
        self.per_page
    }

    pub fn page<T>(&self, object_list: Vec<T>, number: u64) -> Page<T> {
        let num_pages = self.num_pages();
        let (start_index, end_index) = if self.count == 0 {
            (0, 0)
        } else if number == num_pages {
            (self.offset(number) + 1, self.count)
        } else {
            (self.offset(number) + 1, number * self.per_page)
        };

        Page {
            object_list,
            number,
            num_pages,
            count: self.count,
            per_page: self.per_page,
            has_next: number < num_pages,
            has_previous: number > 1,
            next_page_number: (number < num_pages).then_some(number + 1),
            previous_page_number: (number > 1).then_some(number - 1),
            start_index,
            end_index,
        }
    }
}

/// One page of a listing plus what a template needs to draw navigation.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub object_list: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub per_page: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<u64>,
    pub previous_page_number: Option<u64>,
    pub start_index: u64,
    pub end_index: u64,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.object_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_list.is_empty()
    }
}
