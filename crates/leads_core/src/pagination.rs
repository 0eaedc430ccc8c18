pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDelta {
    Previous,
    Next,
}

/// Page cursor over the current result set. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationCursor {
    current_page: usize,
    page_size: usize,
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PaginationCursor {
    /// A page size of 0 is treated as 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Never less than 1, even for an empty result set.
    pub fn total_pages(&self, len: usize) -> usize {
        len.div_ceil(self.page_size).max(1)
    }

    pub fn clamp(&mut self, len: usize) {
        self.current_page = self.current_page.clamp(1, self.total_pages(len));
    }

    /// Move by one page; out-of-range moves are ignored. Returns whether the page changed.
    pub fn step(&mut self, delta: PageDelta, len: usize) -> bool {
        match delta {
            PageDelta::Previous if self.current_page > 1 => {
                self.current_page -= 1;
                true
            }
            PageDelta::Next if self.current_page < self.total_pages(len) => {
                self.current_page += 1;
                true
            }
            _ => false,
        }
    }

    /// Jump to an arbitrary page, clamped into range.
    pub fn go_to(&mut self, page: usize, len: usize) {
        self.current_page = page;
        self.clamp(len);
    }

    /// Index range of the current page within a result set of `len` items.
    pub fn page_range(&self, len: usize) -> std::ops::Range<usize> {
        let start = ((self.current_page - 1) * self.page_size).min(len);
        let end = (start + self.page_size).min(len);
        start..end
    }
}
