use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::api::UsersQuery;
use crate::error::ApiError;
use crate::normalize::referral::extract_tree_and_user;
use crate::normalize::{LevelExpansion, Page, ReferralFocus, ReferralTree, UserView};
use crate::types::{Outcome, Request};
use crate::util::debounce::Debouncer;

use super::{error_text, LoadState, Outbox};

pub const DEFAULT_DEPTH: u32 = 10;
pub const SEARCH_LIMIT: u32 = 12;
pub const NON_PAID_PAGE_SIZE: u32 = 25;

const TREE_FAILED: &str = "Unable to load referral tree. Please try again.";
const SEARCH_FAILED: &str = "Unable to search users. Please try again.";
const NON_PAID_FAILED: &str = "Unable to load non-paid referrals. Please try again.";

/// A loaded tree plus the root user it hangs from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeView {
    pub root: Option<UserView>,
    pub tree: Option<ReferralTree>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NonPaidPage {
    pub items: Vec<UserView>,
    pub total: u64,
}

/// Referrals tab: search for a user, focus them, browse their tree.
#[derive(Debug)]
pub struct ReferralsController {
    pub search: Debouncer,
    pub results: LoadState<Vec<UserView>>,
    pub tree: LoadState<TreeView>,
    pub non_paid: LoadState<NonPaidPage>,
    pub expansion: LevelExpansion,
    focus: Option<ReferralFocus>,
    depth: u32,
    non_paid_page: u32,
    selected_result: usize,
    selected_level: usize,
}

impl ReferralsController {
    pub fn new(depth: u32, debounce: Duration) -> Self {
        Self {
            search: Debouncer::new(debounce),
            results: LoadState::default(),
            tree: LoadState::default(),
            non_paid: LoadState::default(),
            expansion: LevelExpansion::default(),
            focus: None,
            depth,
            non_paid_page: 1,
            selected_result: 0,
            selected_level: 0,
        }
    }

    pub fn focus(&self) -> Option<&ReferralFocus> {
        self.focus.as_ref()
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Tab entered: reload the focused user's tree, if any.
    pub fn activate(&mut self, out: &mut Outbox) {
        self.load_tree(out);
    }

    /// Focus a user. The tree reloads from scratch when the tab is visible.
    pub fn set_focus(&mut self, focus: ReferralFocus, active: bool, out: &mut Outbox) {
        log::info!("[referrals] focus -> {}", focus.name);
        self.focus = Some(focus);
        self.non_paid.clear();
        self.non_paid_page = 1;
        if active {
            self.load_tree(out);
        }
    }

    pub fn load_tree(&mut self, out: &mut Outbox) {
        let Some(user_id) = self.focus.as_ref().and_then(|f| f.id.clone()) else {
            return;
        };
        self.tree.clear();
        self.expansion.clear();
        self.selected_level = 0;
        let seq = out.send(Request::ReferralTree { user_id, depth: self.depth });
        self.tree.begin(seq);
    }

    pub fn load_non_paid(&mut self, out: &mut Outbox) {
        let Some(user_id) = self.focus.as_ref().and_then(|f| f.id.clone()) else {
            return;
        };
        let seq = out.send(Request::NonPaidReferrals {
            user_id,
            page: self.non_paid_page,
            page_size: NON_PAID_PAGE_SIZE,
        });
        self.non_paid.begin(seq);
    }

    pub fn non_paid_page(&self) -> u32 {
        self.non_paid_page
    }

    pub fn non_paid_total_pages(&self) -> u32 {
        let total = self.non_paid.data().map_or(0, |p| p.total);
        super::users::total_pages(total, NON_PAID_PAGE_SIZE)
    }

    pub fn non_paid_next(&mut self, out: &mut Outbox) {
        if self.non_paid_page < self.non_paid_total_pages() {
            self.non_paid_page += 1;
            self.load_non_paid(out);
        }
    }

    pub fn non_paid_prev(&mut self, out: &mut Outbox) {
        if self.non_paid_page > 1 {
            self.non_paid_page -= 1;
            self.load_non_paid(out);
        }
    }

    pub fn tick(&mut self, now: Instant, active: bool, out: &mut Outbox) {
        if let Some(term) = self.search.poll(now) {
            self.apply_search(term, active, out);
        }
    }

    pub fn submit_search(&mut self, active: bool, out: &mut Outbox) {
        if let Some(term) = self.search.settle_now() {
            self.apply_search(term, active, out);
        }
    }

    /// An empty term clears the results without a request.
    fn apply_search(&mut self, term: String, active: bool, out: &mut Outbox) {
        self.selected_result = 0;
        if term.is_empty() {
            self.results.clear();
            return;
        }
        if !active {
            return;
        }
        let seq = out.send(Request::ReferralSearch(UsersQuery {
            page: 1,
            limit: SEARCH_LIMIT,
            role: None,
            search: Some(term),
        }));
        self.results.begin(seq);
    }

    pub fn results(&self) -> &[UserView] {
        self.results.data().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn selected_result(&self) -> usize {
        self.selected_result
    }

    pub fn select_result(&mut self, delta: isize) {
        let len = self.results().len();
        if len == 0 {
            return;
        }
        self.selected_result = (self.selected_result as isize + delta).clamp(0, len as isize - 1) as usize;
    }

    /// Focus the highlighted search result.
    pub fn pick_result(&mut self, out: &mut Outbox) -> bool {
        let Some(user) = self.results().get(self.selected_result) else {
            return false;
        };
        let focus = ReferralFocus::from(user);
        self.set_focus(focus, true, out);
        true
    }

    pub fn selected_level(&self) -> usize {
        self.selected_level
    }

    pub fn select_level(&mut self, delta: isize) {
        let len = self.levels_len();
        if len == 0 {
            return;
        }
        self.selected_level = (self.selected_level as isize + delta).clamp(0, len as isize - 1) as usize;
    }

    fn levels_len(&self) -> usize {
        self.tree
            .data()
            .and_then(|t| t.tree.as_ref())
            .map_or(0, |t| t.levels.len())
    }

    /// Toggle "show all" on the highlighted level, if it has more than the cap.
    pub fn toggle_selected_level(&mut self) {
        let Some(level) = self
            .tree
            .data()
            .and_then(|t| t.tree.as_ref())
            .and_then(|t| t.levels.get(self.selected_level))
        else {
            return;
        };
        if LevelExpansion::has_toggle(level) {
            let number = level.level;
            self.expansion.toggle(number);
        }
    }

    pub fn on_tree_response(&mut self, seq: u64, result: Result<Outcome, ApiError>, now: DateTime<Utc>) {
        match result {
            Ok(outcome) => {
                let (tree, user) = extract_tree_and_user(outcome.json());
                let view = TreeView {
                    root: user.map(|u| UserView::from_raw(u, now)),
                    tree: tree.map(|t| ReferralTree::from_raw(t, now)),
                };
                self.tree.succeed(seq, view);
            }
            Err(e) => {
                self.tree.fail(seq, error_text(&e, TREE_FAILED));
            }
        }
    }

    pub fn on_search_response(&mut self, seq: u64, result: Result<Outcome, ApiError>, now: DateTime<Utc>) {
        match result {
            Ok(outcome) => {
                let page = Page::from_raw(outcome.json());
                let users = page.items.iter().map(|raw| UserView::from_raw(raw, now)).collect();
                self.results.succeed(seq, users);
            }
            Err(e) => {
                self.results.fail(seq, error_text(&e, SEARCH_FAILED));
            }
        }
    }

    pub fn on_non_paid_response(&mut self, seq: u64, result: Result<Outcome, ApiError>, now: DateTime<Utc>) {
        match result {
            Ok(outcome) => {
                let page = Page::from_raw(outcome.json());
                let items = page.items.iter().map(|raw| UserView::from_raw(raw, now)).collect();
                self.non_paid.succeed(seq, NonPaidPage { items, total: page.total });
            }
            Err(e) => {
                self.non_paid.fail(seq, error_text(&e, NON_PAID_FAILED));
            }
        }
    }

    /// Root user for the header: the loaded record, else what was picked.
    pub fn root_name(&self) -> Option<String> {
        self.tree
            .data()
            .and_then(|t| t.root.as_ref())
            .map(|u| u.display_name().to_string())
            .or_else(|| self.focus.as_ref().map(|f| f.name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn controller() -> ReferralsController {
        ReferralsController::new(DEFAULT_DEPTH, Duration::from_millis(350))
    }

    fn focus(id: &str) -> ReferralFocus {
        ReferralFocus { id: Some(id.into()), name: id.into(), email: None, phone: None }
    }

    #[test]
    fn focus_loads_tree_with_depth() {
        let mut out = Outbox::default();
        let mut r = controller();
        r.set_focus(focus("u1"), true, &mut out);
        let sent = out.drain();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, Request::ReferralTree { user_id: "u1".into(), depth: 10 });
    }

    #[test]
    fn focus_without_id_does_nothing() {
        let mut out = Outbox::default();
        let mut r = controller();
        r.set_focus(ReferralFocus::default(), true, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn rebuilding_resets_expansion() {
        let mut out = Outbox::default();
        let mut r = controller();
        r.set_focus(focus("u1"), true, &mut out);
        let (seq, _) = out.drain().remove(0);
        let level: Vec<_> = (0..12).map(|i| json!({"id": i})).collect();
        r.on_tree_response(
            seq,
            Ok(Outcome::Json(json!({"user": {"id": "u1"}, "referralTree": {"levels": [{"descendants": level}]}}))),
            Utc::now(),
        );
        r.toggle_selected_level();
        assert!(r.expansion.is_expanded(1));

        r.load_tree(&mut out);
        assert!(!r.expansion.is_expanded(1));
        assert!(r.tree.data().is_none());
    }

    #[test]
    fn stale_tree_is_dropped() {
        let mut out = Outbox::default();
        let mut r = controller();
        r.set_focus(focus("a"), true, &mut out);
        r.set_focus(focus("b"), true, &mut out);
        let sent = out.drain();
        r.on_tree_response(sent[0].0, Ok(Outcome::Json(json!({"user": {"name": "A"}}))), Utc::now());
        assert!(r.tree.is_loading());
        r.on_tree_response(sent[1].0, Ok(Outcome::Json(json!({"user": {"name": "B"}}))), Utc::now());
        assert_eq!(r.root_name().as_deref(), Some("B"));
    }

    #[test]
    fn empty_search_clears_without_fetching() {
        let t0 = Instant::now();
        let mut out = Outbox::default();
        let mut r = controller();
        r.search.set_input("ra", t0);
        r.tick(t0 + Duration::from_millis(400), true, &mut out);
        let (seq, req) = out.drain().remove(0);
        assert_eq!(
            req,
            Request::ReferralSearch(UsersQuery { page: 1, limit: 12, role: None, search: Some("ra".into()) })
        );
        r.on_search_response(seq, Ok(Outcome::Json(json!({"items": [{"id": "x"}]}))), Utc::now());
        assert_eq!(r.results().len(), 1);

        r.search.set_input("  ", t0);
        r.tick(t0 + Duration::from_millis(400), true, &mut out);
        assert!(out.is_empty());
        assert!(r.results().is_empty());
    }

    #[test]
    fn picking_a_result_focuses_it() {
        let mut out = Outbox::default();
        let mut r = controller();
        r.search.set_input("ra", Instant::now());
        r.submit_search(true, &mut out);
        let (seq, _) = out.drain().remove(0);
        r.on_search_response(
            seq,
            Ok(Outcome::Json(json!({"data": {"items": [{"_id": "r1", "name": "Ravi"}]}}))),
            Utc::now(),
        );
        assert!(r.pick_result(&mut out));
        assert_eq!(r.focus().and_then(|f| f.id.as_deref()), Some("r1"));
        assert_eq!(out.drain().len(), 1);
    }

    #[test]
    fn non_paid_pages() {
        let mut out = Outbox::default();
        let mut r = controller();
        r.set_focus(focus("u1"), false, &mut out);
        assert!(out.is_empty());
        r.load_non_paid(&mut out);
        let (seq, req) = out.drain().remove(0);
        assert_eq!(req, Request::NonPaidReferrals { user_id: "u1".into(), page: 1, page_size: 25 });
        r.on_non_paid_response(seq, Ok(Outcome::Json(json!({"items": [], "total": 60}))), Utc::now());
        assert_eq!(r.non_paid_total_pages(), 3);
        r.non_paid_next(&mut out);
        assert_eq!(r.non_paid_page(), 2);
    }
}
