//! In-process stand-in for the JustStock backend.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use juststock_admin::api::{
    AdminApi, CsvDownload, CsvExport, LoginRequest, OverviewQuery, SignupRequest, UsersQuery, WithdrawalUpdate,
    WithdrawalsQuery,
};
use juststock_admin::app::App;
use juststock_admin::error::ApiError;
use juststock_admin::runtime;

#[derive(Default)]
pub struct FakeApi {
    /// Every call, with the token it carried.
    pub calls: Mutex<Vec<(String, Option<String>)>>,
    /// Status each withdrawal has been patched to.
    pub updates: Mutex<Vec<(String, WithdrawalUpdate)>>,
}

impl FakeApi {
    fn record(&self, name: &str, token: Option<&str>) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((name.to_string(), token.map(str::to_string)));
        }
    }

    pub fn call_names(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.iter().map(|(n, _)| n.clone()).collect()).unwrap_or_default()
    }

    fn is_paid(&self, id: &str) -> bool {
        self.updates
            .lock()
            .map(|u| u.iter().any(|(r, up)| r == id && up.status == "paid"))
            .unwrap_or(false)
    }
}

#[async_trait]
impl AdminApi for FakeApi {
    async fn signup(&self, _req: &SignupRequest) -> Result<Value, ApiError> {
        self.record("signup", None);
        Ok(json!({"message": "created"}))
    }

    async fn login(&self, req: &LoginRequest) -> Result<Value, ApiError> {
        self.record("login", None);
        if req.password != "secret" {
            return Err(ApiError::Http {
                status: reqwest::StatusCode::UNAUTHORIZED,
                message: "Invalid credentials".into(),
            });
        }
        Ok(json!({"data": {"token": "tk-1", "admin": {"name": "Ops Desk", "email": req.email}}}))
    }

    async fn dashboard_overview(&self, token: &str, _q: &OverviewQuery) -> Result<Value, ApiError> {
        self.record("overview", Some(token));
        Ok(json!({"totals": {"users": 120, "activeUsers": 80}, "money": {"walletBalancePaise": 150000}}))
    }

    async fn users(&self, token: &str, q: &UsersQuery) -> Result<Value, ApiError> {
        self.record("users", Some(token));
        let items: Vec<Value> = match q.search.as_deref() {
            Some(s) => vec![json!({"_id": "u-search", "name": s})],
            None => vec![json!({"_id": "u1", "name": "Asha"}), json!({"_id": "u2", "name": "Ravi"})],
        };
        Ok(json!({"items": items, "total": 2, "page": q.page, "limit": q.limit}))
    }

    async fn user(&self, token: &str, user_id: &str, _depth: u32) -> Result<Value, ApiError> {
        self.record("user", Some(token));
        Ok(json!({
            "user": {"_id": user_id, "name": "Root"},
            "referralTree": {"levels": [{"level": 1, "descendants": [{"_id": "c1", "name": "Child"}]}]}
        }))
    }

    async fn non_paid_referrals(&self, token: &str, _u: &str, _p: u32, _s: u32) -> Result<Value, ApiError> {
        self.record("non_paid", Some(token));
        Ok(json!({"items": [], "total": 0}))
    }

    async fn referral_withdrawals(&self, token: &str, q: &WithdrawalsQuery) -> Result<Value, ApiError> {
        self.record("withdrawals", Some(token));
        let status = if self.is_paid("w1") { "paid" } else { "pending" };
        if q.status.as_deref() == Some("pending") && status == "paid" {
            return Ok(json!({"items": []}));
        }
        Ok(json!({"items": [{"id": "w1", "status": status, "amountPaise": 50000, "user": {"name": "Asha"}}]}))
    }

    async fn update_referral_withdrawal(
        &self,
        token: &str,
        request_id: &str,
        update: &WithdrawalUpdate,
    ) -> Result<Value, ApiError> {
        self.record("update_withdrawal", Some(token));
        if let Ok(mut updates) = self.updates.lock() {
            updates.push((request_id.to_string(), update.clone()));
        }
        Ok(json!({"ok": true}))
    }

    async fn send_trade_message(&self, token: &str, _c: &str, _p: &Value) -> Result<Value, ApiError> {
        self.record("trade_message", Some(token));
        Ok(json!({"ok": true}))
    }

    async fn send_daily_tip(&self, token: &str, _p: &Value) -> Result<Value, ApiError> {
        self.record("daily_tip", Some(token));
        Ok(json!({"ok": true}))
    }

    async fn upload_image(&self, token: &str, file_name: &str, bytes: Vec<u8>) -> Result<Value, ApiError> {
        self.record("upload_image", Some(token));
        Ok(json!({"name": file_name, "size": bytes.len()}))
    }

    async fn download_csv(
        &self,
        token: &str,
        export: CsvExport,
        _params: &[(&'static str, String)],
    ) -> Result<CsvDownload, ApiError> {
        self.record("download_csv", Some(token));
        Ok(CsvDownload { filename: export.fallback_name().to_string(), bytes: b"phone\n+91000\n".to_vec() })
    }
}

/// Run queued commands until the app stops asking for more.
pub async fn pump(app: &mut App, api: &FakeApi) {
    let out_dir = std::env::temp_dir();
    for _ in 0..8 {
        let cmds = app.take_commands();
        if cmds.is_empty() {
            return;
        }
        for cmd in cmds {
            let ev = runtime::execute(api, cmd, &out_dir).await;
            app.on_event(ev);
        }
    }
}

pub fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        app.input_char(c);
    }
}
