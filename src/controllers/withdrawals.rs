use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::api::{WithdrawalUpdate, WithdrawalsQuery};
use crate::error::ApiError;
use crate::normalize::withdrawal::extract_withdrawal_items;
use crate::normalize::{WithdrawalFilter, WithdrawalStatus, WithdrawalView};
use crate::types::{Outcome, Request};
use crate::util::debounce::Debouncer;

use super::{error_text, LoadState, Outbox};

pub const MISSING_ID: &str = "Missing withdrawal request ID.";
const LOAD_FAILED: &str = "Unable to load withdrawal requests. Please try again.";
const UPDATE_FAILED: &str = "Unable to update withdrawal. Please try again.";

/// Per-request draft of the optional PATCH fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub payment_ref: String,
    pub admin_note: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteField {
    PaymentRef,
    AdminNote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InFlight {
    seq: u64,
    request_id: String,
    status: WithdrawalStatus,
}

/// Withdrawals tab: status filter, user filter, and the paid/cancel workflow.
#[derive(Debug)]
pub struct WithdrawalsController {
    pub list: LoadState<Vec<WithdrawalView>>,
    pub user_filter: Debouncer,
    filter: WithdrawalFilter,
    notes: HashMap<String, NoteDraft>,
    mutation: Option<InFlight>,
    action_error: Option<String>,
    action_success: Option<String>,
    selected: usize,
}

impl WithdrawalsController {
    pub fn new(debounce: Duration) -> Self {
        Self {
            list: LoadState::default(),
            user_filter: Debouncer::new(debounce),
            filter: WithdrawalFilter::default(),
            notes: HashMap::new(),
            mutation: None,
            action_error: None,
            action_success: None,
            selected: 0,
        }
    }

    pub fn filter(&self) -> WithdrawalFilter {
        self.filter
    }

    pub fn query(&self) -> WithdrawalsQuery {
        let user = self.user_filter.settled();
        WithdrawalsQuery {
            status: Some(self.filter.key().to_string()),
            user_id: (!user.is_empty()).then(|| user.to_string()),
        }
    }

    pub fn load(&mut self, out: &mut Outbox) {
        let seq = out.send(Request::Withdrawals(self.query()));
        self.list.begin(seq);
    }

    pub fn set_filter(&mut self, filter: WithdrawalFilter, out: &mut Outbox) {
        if filter == self.filter {
            return;
        }
        self.filter = filter;
        self.selected = 0;
        self.load(out);
    }

    pub fn cycle_filter(&mut self, out: &mut Outbox) {
        let all = WithdrawalFilter::ALL;
        let idx = all.iter().position(|f| *f == self.filter).unwrap_or(0);
        self.set_filter(all[(idx + 1) % all.len()], out);
    }

    /// Row actions are hidden on the paid filter.
    pub fn actions_visible(&self) -> bool {
        self.filter != WithdrawalFilter::Paid
    }

    /// Copy buttons only make sense while a payout is still owed.
    pub fn copy_visible(&self) -> bool {
        self.filter == WithdrawalFilter::Pending
    }

    pub fn tick(&mut self, now: Instant, active: bool, out: &mut Outbox) {
        if self.user_filter.poll(now).is_some() && active {
            self.load(out);
        }
    }

    pub fn submit_user_filter(&mut self, active: bool, out: &mut Outbox) {
        if self.user_filter.settle_now().is_some() && active {
            self.load(out);
        }
    }

    pub fn items(&self) -> &[WithdrawalView] {
        self.list.data().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&WithdrawalView> {
        self.items().get(self.selected)
    }

    pub fn select(&mut self, delta: isize) {
        let len = self.items().len();
        if len == 0 {
            return;
        }
        self.selected = (self.selected as isize + delta).clamp(0, len as isize - 1) as usize;
    }

    pub fn note(&self, request_id: &str) -> Option<&NoteDraft> {
        self.notes.get(request_id)
    }

    pub fn note_mut(&mut self, request_id: &str) -> &mut NoteDraft {
        self.notes.entry(request_id.to_string()).or_default()
    }

    pub fn edit_note(&mut self, request_id: &str, field: NoteField, value: &str) {
        let draft = self.note_mut(request_id);
        match field {
            NoteField::PaymentRef => draft.payment_ref = value.to_string(),
            NoteField::AdminNote => draft.admin_note = value.to_string(),
        }
    }

    /// The request currently being updated, if any.
    pub fn busy_id(&self) -> Option<&str> {
        self.mutation.as_ref().map(|m| m.request_id.as_str())
    }

    pub fn action_error(&self) -> Option<&str> {
        self.action_error.as_deref()
    }

    pub fn action_success(&self) -> Option<&str> {
        self.action_success.as_deref()
    }

    /// Mark a withdrawal paid or cancelled. Only one update runs at a time.
    pub fn update_status(&mut self, item: &WithdrawalView, status: WithdrawalStatus, out: &mut Outbox) {
        if self.mutation.is_some() {
            log::debug!("[withdrawals] update already in flight; ignoring");
            return;
        }
        let Some(request_id) = item.id.clone() else {
            self.action_error = Some(MISSING_ID.to_string());
            self.action_success = None;
            return;
        };

        let draft = self.notes.get(&request_id).cloned().unwrap_or_default();
        let update = WithdrawalUpdate::new(status.as_str(), &draft.payment_ref, &draft.admin_note);
        let seq = out.send(Request::UpdateWithdrawal { request_id: request_id.clone(), update });
        log::info!("[withdrawals] marking {request_id} as {}", status.as_str());

        self.action_error = None;
        self.action_success = None;
        self.mutation = Some(InFlight { seq, request_id, status });
    }

    pub fn update_selected(&mut self, status: WithdrawalStatus, out: &mut Outbox) {
        if let Some(item) = self.selected_item().cloned() {
            self.update_status(&item, status, out);
        }
    }

    pub fn on_list_response(&mut self, seq: u64, result: Result<Outcome, ApiError>) {
        match result {
            Ok(outcome) => {
                let items: Vec<WithdrawalView> = extract_withdrawal_items(outcome.json())
                    .iter()
                    .map(WithdrawalView::from_raw)
                    .collect();
                let len = items.len();
                if self.list.succeed(seq, items) {
                    self.selected = self.selected.min(len.saturating_sub(1));
                }
            }
            Err(e) => {
                self.list.fail(seq, error_text(&e, LOAD_FAILED));
            }
        }
    }

    /// Success clears that row's drafts and refetches the whole list once.
    pub fn on_update_response(&mut self, seq: u64, result: Result<Outcome, ApiError>, out: &mut Outbox) {
        if self.mutation.as_ref().map(|m| m.seq) != Some(seq) {
            return;
        }
        let Some(in_flight) = self.mutation.take() else {
            return;
        };
        match result {
            Ok(_) => {
                self.notes.remove(&in_flight.request_id);
                self.action_success = Some(format!("Withdrawal marked as {}.", in_flight.status.label()));
                self.load(out);
            }
            Err(e) => {
                self.action_error = Some(error_text(&e, UPDATE_FAILED));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    fn pending(id: Option<&str>) -> WithdrawalView {
        let mut raw = json!({"status": "pending", "amountPaise": 10000});
        if let Some(id) = id {
            raw["id"] = json!(id);
        }
        WithdrawalView::from_raw(&raw)
    }

    #[test]
    fn default_query_is_pending() {
        let w = WithdrawalsController::new(Duration::from_millis(350));
        assert_eq!(w.query().to_params(), vec![("status", "pending".to_string())]);
        assert!(w.actions_visible());
        assert!(w.copy_visible());
    }

    #[test]
    fn paid_filter_hides_actions() {
        let mut out = Outbox::default();
        let mut w = WithdrawalsController::new(Duration::from_millis(350));
        w.set_filter(WithdrawalFilter::Paid, &mut out);
        assert!(!w.actions_visible());
        assert!(!w.copy_visible());
        assert_eq!(out.drain().len(), 1);
    }

    #[test]
    fn mark_paid_clears_notes_and_refetches_once() {
        let mut out = Outbox::default();
        let mut w = WithdrawalsController::new(Duration::from_millis(350));
        let item = pending(Some("w1"));
        w.edit_note("w1", NoteField::PaymentRef, " UTR9 ");
        w.edit_note("w1", NoteField::AdminNote, "sent via IMPS");

        w.update_status(&item, WithdrawalStatus::Paid, &mut out);
        assert_eq!(w.busy_id(), Some("w1"));
        let (seq, req) = out.drain().remove(0);
        assert_eq!(
            req,
            Request::UpdateWithdrawal {
                request_id: "w1".into(),
                update: WithdrawalUpdate {
                    status: "paid".into(),
                    payment_ref: Some("UTR9".into()),
                    admin_note: Some("sent via IMPS".into()),
                },
            }
        );

        w.on_update_response(seq, Ok(Outcome::Json(json!({"ok": true}))), &mut out);
        assert!(w.note("w1").is_none());
        assert_eq!(w.action_success(), Some("Withdrawal marked as Paid."));
        assert_eq!(w.busy_id(), None);
        let refetch = out.drain();
        assert_eq!(refetch.len(), 1);
        assert!(matches!(refetch[0].1, Request::Withdrawals(_)));
    }

    #[test]
    fn missing_id_fails_locally() {
        let mut out = Outbox::default();
        let mut w = WithdrawalsController::new(Duration::from_millis(350));
        w.update_status(&pending(None), WithdrawalStatus::Cancelled, &mut out);
        assert_eq!(w.action_error(), Some(MISSING_ID));
        assert!(out.is_empty());
    }

    #[test]
    fn one_mutation_at_a_time() {
        let mut out = Outbox::default();
        let mut w = WithdrawalsController::new(Duration::from_millis(350));
        w.update_status(&pending(Some("a")), WithdrawalStatus::Paid, &mut out);
        w.update_status(&pending(Some("b")), WithdrawalStatus::Paid, &mut out);
        assert_eq!(out.drain().len(), 1);
        assert_eq!(w.busy_id(), Some("a"));
    }

    #[test]
    fn failed_mutation_keeps_notes() {
        let mut out = Outbox::default();
        let mut w = WithdrawalsController::new(Duration::from_millis(350));
        w.edit_note("w1", NoteField::AdminNote, "retry");
        w.update_status(&pending(Some("w1")), WithdrawalStatus::Cancelled, &mut out);
        let (seq, _) = out.drain().remove(0);
        let err = ApiError::Http { status: StatusCode::CONFLICT, message: "Already processed".into() };
        w.on_update_response(seq, Err(err), &mut out);
        assert_eq!(w.action_error(), Some("Already processed"));
        assert_eq!(w.note("w1").map(|n| n.admin_note.as_str()), Some("retry"));
        assert!(out.is_empty());
    }

    #[test]
    fn list_response_normalizes_rows() {
        let mut out = Outbox::default();
        let mut w = WithdrawalsController::new(Duration::from_millis(350));
        w.load(&mut out);
        let (seq, _) = out.drain().remove(0);
        w.on_list_response(seq, Ok(Outcome::Json(json!({"data": {"requests": [{"_id": "r1"}, {"_id": "r2"}]}}))));
        assert_eq!(w.items().len(), 2);
        assert_eq!(w.items()[1].id.as_deref(), Some("r2"));
    }

    #[test]
    fn user_filter_is_debounced() {
        let t0 = Instant::now();
        let mut out = Outbox::default();
        let mut w = WithdrawalsController::new(Duration::from_millis(350));
        w.user_filter.set_input(" u77 ", t0);
        w.tick(t0 + Duration::from_millis(100), true, &mut out);
        assert!(out.is_empty());
        w.tick(t0 + Duration::from_millis(350), true, &mut out);
        let (_, req) = out.drain().remove(0);
        assert_eq!(
            req,
            Request::Withdrawals(WithdrawalsQuery { status: Some("pending".into()), user_id: Some("u77".into()) })
        );
    }
}
