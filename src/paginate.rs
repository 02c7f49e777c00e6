use crate::catalog::PageSource;
use crate::error::FilterError;
use crate::models::SearchResponse;

/// Counters threaded through the pagination loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Page to request next (or the page just handed to the callback).
    pub page: u32,
    pub fetched: u32,
    pub seen: u64,
    /// Grand total latched from the first page, if it reported a positive one.
    pub total: Option<u64>,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            page: 1,
            fetched: 0,
            seen: 0,
            total: None,
        }
    }
}

impl Progress {
    fn latch_total(&mut self, reported: i64) {
        if self.total.is_none() && self.page == 1 {
            self.total = u64::try_from(reported).ok().filter(|total| *total > 0);
        }
    }

    /// Stop after an empty page, or once the latched total has been reached.
    pub fn is_done(&self, page_len: usize) -> bool {
        page_len == 0 || self.total.is_some_and(|total| self.seen >= total)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    per_page: u32,
    /// 0 means unbounded.
    max_pages: u32,
}

impl Paginator {
    pub fn new(per_page: u32, max_pages: u32) -> Self {
        Self {
            per_page,
            max_pages,
        }
    }

    fn page_allowed(&self, page: u32) -> bool {
        self.max_pages == 0 || page <= self.max_pages
    }

    /// Fetches pages in order, handing each page to `on_page` before
    /// deciding whether to fetch the next one.
    pub fn run<S, F>(&self, source: &mut S, mut on_page: F) -> Result<Progress, FilterError>
    where
        S: PageSource + ?Sized,
        F: FnMut(&Progress, SearchResponse) -> Result<(), FilterError>,
    {
        let mut progress = Progress::default();

        while self.page_allowed(progress.page) {
            let response = source.fetch_page(progress.page, self.per_page)?;
            progress.fetched += 1;
            progress.latch_total(response.total);

            let count = response.records.len();
            progress.seen += count as u64;
            on_page(&progress, response)?;

            if progress.is_done(count) {
                break;
            }
            progress.page += 1;
        }

        Ok(progress)
    }
}
