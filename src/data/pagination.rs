use std::ops::Range;

pub const DEFAULT_PAGE_SIZE: usize = 50;

/// The visible slice of the view: a 1-based page over `total_rows` rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    page: usize,
    page_size: usize,
    total_rows: usize,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PageWindow {
    /// A zero page size is treated as one row per page
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total_rows: 0,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Always at least 1, even for an empty view
    pub fn max_page(&self) -> usize {
        self.total_rows.div_ceil(self.page_size).max(1)
    }

    /// Point the window at a view of `total_rows` rows and go back to page 1
    pub fn reset(&mut self, total_rows: usize) {
        self.total_rows = total_rows;
        self.page = 1;
    }

    /// Jump to a page. Out-of-range requests are ignored and return false.
    pub fn set_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.max_page() {
            return false;
        }
        self.page = page;
        true
    }

    /// Move by `delta` pages. Moves that would leave the valid range are ignored.
    pub fn change_page(&mut self, delta: isize) -> bool {
        match self.page.checked_add_signed(delta) {
            Some(target) => self.set_page(target),
            None => false,
        }
    }

    /// Row positions within the view covered by the current page
    pub fn range(&self) -> Range<usize> {
        let start = ((self.page - 1) * self.page_size).min(self.total_rows);
        let end = (start + self.page_size).min(self.total_rows);
        start..end
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.max_page()
    }

    pub fn page_info(&self) -> String {
        format!(
            "Page {} of {} ({} total items)",
            self.page,
            self.max_page(),
            self.total_rows
        )
    }
}
