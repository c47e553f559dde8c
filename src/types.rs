use std::path::PathBuf;

use serde_json::Value;

use crate::api::{
    CsvExport, LoginRequest, OverviewQuery, SignupRequest, UsersQuery, WithdrawalUpdate, WithdrawalsQuery,
};
use crate::error::ApiError;

/// One backend call, described as data. Controllers build these; the
/// runtime executes them.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Login(LoginRequest),
    Signup(SignupRequest),
    Overview(OverviewQuery),
    Users(UsersQuery),
    ReferralSearch(UsersQuery),
    ReferralTree { user_id: String, depth: u32 },
    NonPaidReferrals { user_id: String, page: u32, page_size: u32 },
    Withdrawals(WithdrawalsQuery),
    UpdateWithdrawal { request_id: String, update: WithdrawalUpdate },
    SendTradeMessage { category: String, payload: Value },
    SendDailyTip { payload: Value },
    ExportCsv { export: CsvExport, params: Vec<(&'static str, String)> },
    UploadImage { path: PathBuf },
}

/// Which controller a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Login,
    Signup,
    Overview,
    Users,
    ReferralSearch,
    ReferralTree,
    NonPaidReferrals,
    Withdrawals,
    UpdateWithdrawal,
    SendMessage,
    ExportCsv,
    UploadImage,
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::Login(_) => RequestKind::Login,
            Request::Signup(_) => RequestKind::Signup,
            Request::Overview(_) => RequestKind::Overview,
            Request::Users(_) => RequestKind::Users,
            Request::ReferralSearch(_) => RequestKind::ReferralSearch,
            Request::ReferralTree { .. } => RequestKind::ReferralTree,
            Request::NonPaidReferrals { .. } => RequestKind::NonPaidReferrals,
            Request::Withdrawals(_) => RequestKind::Withdrawals,
            Request::UpdateWithdrawal { .. } => RequestKind::UpdateWithdrawal,
            Request::SendTradeMessage { .. } | Request::SendDailyTip { .. } => RequestKind::SendMessage,
            Request::ExportCsv { .. } => RequestKind::ExportCsv,
            Request::UploadImage { .. } => RequestKind::UploadImage,
        }
    }

    /// Login and signup are the only unauthenticated calls.
    pub fn needs_token(&self) -> bool {
        !matches!(self, Request::Login(_) | Request::Signup(_))
    }
}

/// A request stamped with its sequence number and the session token at the
/// time it was issued.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub seq: u64,
    pub token: Option<String>,
    pub request: Request,
}

static NULL: Value = Value::Null;

#[derive(Debug)]
pub enum Outcome {
    Json(Value),
    /// A CSV export written to disk.
    Saved { path: PathBuf, bytes: usize },
}

impl Outcome {
    pub fn json(&self) -> &Value {
        match self {
            Outcome::Json(v) => v,
            Outcome::Saved { .. } => &NULL,
        }
    }
}

#[derive(Debug)]
pub enum AppEvent {
    Response {
        seq: u64,
        kind: RequestKind,
        result: Result<Outcome, ApiError>,
    },
    Quit,
}
