//! Per-section load-state machines.
//!
//! Every screen section owns an independent `loading -> success | error`
//! lifecycle. Fetches are tagged with a monotonic generation number;
//! a response whose generation is stale (the driving parameter changed
//! while it was in flight) is discarded before it can touch state.

use crate::media::{PageResponse, Title};
use crate::tmdb::ApiError;

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Idle,
    Loading,
    Error(String),
}

/// A single-resource slot: the popular list, the trending list, or a
/// detail bundle.
#[derive(Debug)]
pub struct SectionLoad<T> {
    value: Option<T>,
    state: LoadState,
    generation: u64,
}

impl<T> Default for SectionLoad<T> {
    fn default() -> Self {
        Self {
            value: None,
            state: LoadState::Idle,
            generation: 0,
        }
    }
}

impl<T> SectionLoad<T> {
    /// Enters `Loading` for a new fetch and returns the generation the
    /// response must echo back.
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.state = LoadState::Loading;
        self.value = None;
        self.generation
    }

    /// Returns to an empty idle slot. Any in-flight response becomes
    /// stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = LoadState::Idle;
        self.value = None;
    }

    /// Commits a response. Returns false (state untouched) when the
    /// generation is stale.
    pub fn apply(&mut self, generation: u64, result: Result<T, ApiError>) -> bool {
        if generation != self.generation {
            return false;
        }
        match result {
            Ok(value) => {
                self.value = Some(value);
                self.state = LoadState::Idle;
            }
            Err(error) => {
                self.state = LoadState::Error(error.to_string());
            }
        }
        true
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Accumulating paginated listing for one genre. Pages append in order
/// and are not de-duplicated against already-held titles.
#[derive(Debug)]
pub struct GenreListing {
    pub genre_id: u64,
    items: Vec<Title>,
    page: u32,
    has_more: bool,
    in_flight: bool,
    state: LoadState,
    generation: u64,
}

impl GenreListing {
    pub fn new(genre_id: u64) -> Self {
        Self {
            genre_id,
            items: Vec::new(),
            page: 0,
            has_more: true,
            in_flight: false,
            state: LoadState::Idle,
            generation: 0,
        }
    }

    /// Starts over from page 1, discarding accumulated items. Returns
    /// the generation for the first-page fetch.
    pub fn begin_first_page(&mut self) -> u64 {
        self.generation += 1;
        self.items.clear();
        self.page = 0;
        self.has_more = true;
        self.in_flight = true;
        self.state = LoadState::Loading;
        self.generation
    }

    /// The next page to request, or `None` while a fetch is in flight or
    /// when the listing is exhausted.
    pub fn next_page(&self) -> Option<u32> {
        if self.in_flight || !self.has_more {
            return None;
        }
        Some(self.page + 1)
    }

    /// Claims the next page for fetching. `None` means load-more is a
    /// no-op right now (already loading, or nothing left).
    pub fn begin_load_more(&mut self) -> Option<(u64, u32)> {
        let page = self.next_page()?;
        self.in_flight = true;
        Some((self.generation, page))
    }

    /// Appends a page of results. Returns false when the generation is
    /// stale.
    pub fn apply_page(
        &mut self,
        generation: u64,
        result: Result<PageResponse<Title>, ApiError>,
    ) -> bool {
        if generation != self.generation {
            return false;
        }
        self.in_flight = false;
        match result {
            Ok(response) => {
                self.page = response.page;
                self.has_more = response.page < response.total_pages;
                self.items.extend(response.results);
                self.state = LoadState::Idle;
            }
            Err(error) => {
                self.state = LoadState::Error(error.to_string());
            }
        }
        true
    }

    pub fn items(&self) -> &[Title] {
        &self.items
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Error(message) => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::tests::sample_title;

    fn page(n: u32, total: u32, ids: &[u64]) -> PageResponse<Title> {
        PageResponse {
            page: n,
            results: ids
                .iter()
                .map(|&id| sample_title(id, "t", "t"))
                .collect(),
            total_pages: total,
            total_results: total * ids.len() as u32,
        }
    }

    #[test]
    fn section_commits_only_current_generation() {
        let mut section: SectionLoad<Vec<Title>> = SectionLoad::default();
        let stale = section.begin();
        let current = section.begin();
        assert_ne!(stale, current);

        // the superseded response must not land
        assert!(!section.apply(stale, Ok(vec![sample_title(1, "old", "old")])));
        assert!(section.is_loading());
        assert!(section.value().is_none());

        assert!(section.apply(current, Ok(vec![sample_title(2, "new", "new")])));
        assert_eq!(section.value().unwrap()[0].id, 2);
        assert!(!section.is_loading());
    }

    #[test]
    fn section_reset_discards_pending_fetch() {
        let mut section: SectionLoad<Vec<Title>> = SectionLoad::default();
        let generation = section.begin();
        section.reset();
        assert!(!section.apply(generation, Ok(vec![sample_title(1, "t", "t")])));
        assert!(!section.is_loading());
        assert!(section.value().is_none());
    }

    #[test]
    fn section_error_replaces_loading() {
        let mut section: SectionLoad<Vec<Title>> = SectionLoad::default();
        let generation = section.begin();
        assert!(section.apply(
            generation,
            Err(ApiError::Status {
                code: 404,
                text: String::from("Not Found"),
            })
        ));
        assert_eq!(section.error(), Some("request failed: 404 Not Found"));
    }

    #[test]
    fn listing_appends_pages_in_order_without_dedup() {
        let mut listing = GenreListing::new(28);
        let generation = listing.begin_first_page();
        assert!(listing.apply_page(generation, Ok(page(1, 3, &[1, 2]))));
        assert!(listing.has_more());

        let (generation, next) = listing.begin_load_more().unwrap();
        assert_eq!(next, 2);
        // page 2 repeats id 2; the duplicate is kept
        assert!(listing.apply_page(generation, Ok(page(2, 3, &[2, 3]))));

        let ids: Vec<u64> = listing.items().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 2, 3]);
    }

    #[test]
    fn load_more_is_noop_while_in_flight() {
        let mut listing = GenreListing::new(28);
        listing.begin_first_page();
        assert!(listing.in_flight());
        assert!(listing.begin_load_more().is_none());
    }

    #[test]
    fn load_more_is_noop_when_exhausted() {
        let mut listing = GenreListing::new(28);
        let generation = listing.begin_first_page();
        assert!(listing.apply_page(generation, Ok(page(1, 1, &[1]))));
        assert!(!listing.has_more());
        assert!(listing.begin_load_more().is_none());
        assert_eq!(listing.items().len(), 1);
    }

    #[test]
    fn restarting_makes_earlier_pages_stale() {
        let mut listing = GenreListing::new(28);
        let old_generation = listing.begin_first_page();
        let new_generation = listing.begin_first_page();

        assert!(!listing.apply_page(old_generation, Ok(page(1, 2, &[1]))));
        assert!(listing.items().is_empty());

        assert!(listing.apply_page(new_generation, Ok(page(1, 2, &[7]))));
        assert_eq!(listing.items()[0].id, 7);
    }

    #[test]
    fn listing_error_keeps_accumulated_items() {
        let mut listing = GenreListing::new(28);
        let generation = listing.begin_first_page();
        assert!(listing.apply_page(generation, Ok(page(1, 3, &[1]))));

        let (generation, _) = listing.begin_load_more().unwrap();
        assert!(listing.apply_page(
            generation,
            Err(ApiError::Network(String::from("connection reset")))
        ));
        assert_eq!(listing.items().len(), 1);
        assert!(listing.error().is_some());
        // the failed fetch is settled, so another attempt may start
        assert!(listing.begin_load_more().is_some());
    }
}
