//! Pagination math for list pages

use serde::Serialize;

/// One page worth of navigation data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub per_page: usize,
    /// Number of pages (at least 1)
    pub total: usize,
    /// 1-based current page, clamped into range
    pub current: usize,
    pub prev: Option<usize>,
    pub next: Option<usize>,
    /// Every page number, for numbered links
    pub pages: Vec<usize>,
}

impl Pagination {
    pub fn new(item_count: usize, per_page: usize, requested: usize) -> Self {
        let per_page = per_page.max(1);
        let total = item_count.div_ceil(per_page).max(1);
        let current = requested.clamp(1, total);

        Self {
            per_page,
            total,
            current,
            prev: (current > 1).then(|| current - 1),
            next: (current < total).then(|| current + 1),
            pages: (1..=total).collect(),
        }
    }

    /// Index range of the current page's items
    pub fn range(&self, item_count: usize) -> std::ops::Range<usize> {
        let start = ((self.current - 1) * self.per_page).min(item_count);
        let end = (start + self.per_page).min(item_count);
        start..end
    }

    /// Whether navigation controls are worth showing
    pub fn is_paged(&self) -> bool {
        self.total > 1
    }
}
