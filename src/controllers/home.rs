use crate::api::OverviewQuery;
use crate::error::ApiError;
use crate::normalize::OverviewView;
use crate::types::{Outcome, Request};

use super::{error_text, LoadState, Outbox};

const LOAD_FAILED: &str = "Unable to load dashboard overview. Please try again.";

/// Home tab: the overview cards.
#[derive(Debug, Default)]
pub struct HomeController {
    pub overview: LoadState<OverviewView>,
    pub query: OverviewQuery,
}

impl HomeController {
    /// Tab entered or refresh pressed.
    pub fn load(&mut self, out: &mut Outbox) {
        let seq = out.send(Request::Overview(self.query.clone()));
        self.overview.begin(seq);
    }

    pub fn on_response(&mut self, seq: u64, result: Result<Outcome, ApiError>) {
        match result {
            Ok(outcome) => {
                self.overview.succeed(seq, OverviewView::from_raw(outcome.json()));
            }
            Err(e) => {
                self.overview.fail(seq, error_text(&e, LOAD_FAILED));
            }
        }
    }

    /// Card values are only worth showing once something has loaded.
    pub fn show_loading_placeholder(&self) -> bool {
        self.overview.is_loading() && self.overview.data().is_none()
    }
}
