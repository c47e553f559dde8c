use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::api::UsersQuery;
use crate::error::ApiError;
use crate::normalize::{Page, UserView};
use crate::types::{Outcome, Request};
use crate::util::debounce::Debouncer;

use super::{error_text, LoadState, Outbox};

pub const PAGE_SIZES: [u32; 4] = [25, 50, 100, 200];
pub const DEFAULT_PAGE_SIZE: u32 = 25;

const LOAD_FAILED: &str = "Unable to load users. Please try again.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsersPage {
    pub items: Vec<UserView>,
    pub total: u64,
}

/// User directory: paged, searchable.
#[derive(Debug)]
pub struct UsersController {
    pub list: LoadState<UsersPage>,
    pub search: Debouncer,
    page: u32,
    limit: u32,
    selected: usize,
}

impl UsersController {
    pub fn new(limit: u32, debounce: Duration) -> Self {
        Self {
            list: LoadState::default(),
            search: Debouncer::new(debounce),
            page: 1,
            limit: if PAGE_SIZES.contains(&limit) { limit } else { DEFAULT_PAGE_SIZE },
            selected: 0,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn total(&self) -> u64 {
        self.list.data().map_or(0, |p| p.total)
    }

    /// `max(1, ceil(total / limit))`.
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total(), self.limit)
    }

    pub fn can_prev(&self) -> bool {
        self.page > 1
    }

    pub fn can_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn query(&self) -> UsersQuery {
        let search = self.search.settled();
        UsersQuery {
            page: self.page,
            limit: self.limit,
            role: None,
            search: (!search.is_empty()).then(|| search.to_string()),
        }
    }

    pub fn load(&mut self, out: &mut Outbox) {
        let seq = out.send(Request::Users(self.query()));
        self.list.begin(seq);
    }

    pub fn next_page(&mut self, out: &mut Outbox) -> bool {
        if !self.can_next() {
            return false;
        }
        self.page += 1;
        self.load(out);
        true
    }

    pub fn prev_page(&mut self, out: &mut Outbox) -> bool {
        if !self.can_prev() {
            return false;
        }
        self.page -= 1;
        self.load(out);
        true
    }

    /// Changing the page size always goes back to page 1.
    pub fn set_limit(&mut self, limit: u32, out: &mut Outbox) {
        if !PAGE_SIZES.contains(&limit) || limit == self.limit {
            return;
        }
        self.limit = limit;
        self.page = 1;
        self.load(out);
    }

    pub fn cycle_limit(&mut self, out: &mut Outbox) {
        let idx = PAGE_SIZES.iter().position(|s| *s == self.limit).unwrap_or(0);
        self.set_limit(PAGE_SIZES[(idx + 1) % PAGE_SIZES.len()], out);
    }

    /// Loop tick: a newly settled search term resets to page 1 and refetches
    /// when the tab is visible.
    pub fn tick(&mut self, now: Instant, active: bool, out: &mut Outbox) {
        if let Some(term) = self.search.poll(now) {
            self.apply_search(&term, active, out);
        }
    }

    /// Enter in the search box settles without waiting.
    pub fn submit_search(&mut self, active: bool, out: &mut Outbox) {
        if let Some(term) = self.search.settle_now() {
            self.apply_search(&term, active, out);
        }
    }

    fn apply_search(&mut self, term: &str, active: bool, out: &mut Outbox) {
        log::debug!("[users] search settled: {term:?}");
        self.page = 1;
        if active {
            self.load(out);
        }
    }

    pub fn on_response(&mut self, seq: u64, result: Result<Outcome, ApiError>, now: DateTime<Utc>) {
        match result {
            Ok(outcome) => {
                let page = Page::from_raw(outcome.json());
                if !self.list.is_current(seq) {
                    return;
                }
                if let Some(p) = page.page {
                    self.page = p;
                }
                if let Some(l) = page.limit {
                    self.limit = l;
                }
                let items = page.items.iter().map(|raw| UserView::from_raw(raw, now)).collect();
                self.list.succeed(seq, UsersPage { items, total: page.total });
                self.selected = 0;
            }
            Err(e) => {
                self.list.fail(seq, error_text(&e, LOAD_FAILED));
            }
        }
    }

    pub fn items(&self) -> &[UserView] {
        self.list.data().map(|p| p.items.as_slice()).unwrap_or(&[])
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_user(&self) -> Option<&UserView> {
        self.items().get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.items().len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

pub fn total_pages(total: u64, limit: u32) -> u32 {
    if limit == 0 {
        return 1;
    }
    let pages = total.div_ceil(u64::from(limit));
    pages.clamp(1, u64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn respond(users: &mut UsersController, out: &mut Outbox, body: serde_json::Value) {
        let (seq, _) = out.drain().pop().unwrap();
        users.on_response(seq, Ok(Outcome::Json(body)), Utc::now());
    }

    #[test]
    fn page_math() {
        assert_eq!(total_pages(230, 25), 10);
        assert_eq!(total_pages(0, 25), 1);
        assert_eq!(total_pages(25, 25), 1);
        assert_eq!(total_pages(26, 25), 2);
    }

    #[test]
    fn next_disabled_on_last_page() {
        let mut out = Outbox::default();
        let mut users = UsersController::new(25, Duration::from_millis(350));
        users.load(&mut out);
        respond(&mut users, &mut out, json!({"items": [], "page": 10, "limit": 25, "total": 230}));
        assert_eq!(users.total_pages(), 10);
        assert!(!users.can_next());
        assert!(!users.next_page(&mut out));
        assert!(out.is_empty());
        assert!(users.prev_page(&mut out));
        assert_eq!(users.page(), 9);
    }

    #[test]
    fn page_size_change_resets_page() {
        let mut out = Outbox::default();
        let mut users = UsersController::new(25, Duration::from_millis(350));
        users.load(&mut out);
        respond(&mut users, &mut out, json!({"items": [], "page": 3, "total": 230}));
        users.set_limit(100, &mut out);
        assert_eq!(users.page(), 1);
        let (_, req) = out.drain().pop().unwrap();
        assert_eq!(req, Request::Users(UsersQuery { page: 1, limit: 100, role: None, search: None }));
    }

    #[test]
    fn settled_search_resets_page_and_fetches_once() {
        let t0 = Instant::now();
        let mut out = Outbox::default();
        let mut users = UsersController::new(25, Duration::from_millis(350));
        users.load(&mut out);
        respond(&mut users, &mut out, json!({"items": [], "page": 4, "total": 500}));

        for (i, c) in "meera".chars().enumerate() {
            let at = t0 + Duration::from_millis(50 * i as u64);
            users.search.push(c, at);
            users.tick(at, true, &mut out);
        }
        assert!(out.is_empty());
        users.tick(t0 + Duration::from_millis(1000), true, &mut out);
        let sent = out.drain();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].1,
            Request::Users(UsersQuery { page: 1, limit: 25, role: None, search: Some("meera".into()) })
        );
    }

    #[test]
    fn out_of_range_limit_falls_back() {
        assert_eq!(UsersController::new(7, Duration::from_millis(1)).limit(), DEFAULT_PAGE_SIZE);
    }
}
