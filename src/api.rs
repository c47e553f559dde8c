//! HTTP client for the JustStock admin backend.
//!
//! Every call goes through [`AdminApi`] so controllers and the runtime can be
//! exercised against a fake. [`HttpAdminApi`] is the reqwest implementation.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, GENERIC_FAILURE};

pub const DEFAULT_API_BASE_URL: &str = "https://backend-server-11f5.onrender.com";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverviewQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub user_id: Option<String>,
}

impl OverviewQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        push_opt(&mut params, "from", &self.from);
        push_opt(&mut params, "to", &self.to);
        push_opt(&mut params, "userId", &self.user_id);
        params
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsersQuery {
    pub page: u32,
    pub limit: u32,
    pub role: Option<String>,
    pub search: Option<String>,
}

impl Default for UsersQuery {
    fn default() -> Self {
        Self { page: 1, limit: 25, role: None, search: None }
    }
}

impl UsersQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        push_opt(&mut params, "role", &self.role);
        push_opt(&mut params, "search", &self.search);
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WithdrawalsQuery {
    pub status: Option<String>,
    pub user_id: Option<String>,
}

impl WithdrawalsQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        push_opt(&mut params, "status", &self.status);
        push_opt(&mut params, "userId", &self.user_id);
        params
    }
}

/// PATCH body for a withdrawal. Optional fields are trimmed and dropped when empty.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalUpdate {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_note: Option<String>,
}

impl WithdrawalUpdate {
    pub fn new(status: &str, payment_ref: &str, admin_note: &str) -> Self {
        Self {
            status: status.to_string(),
            payment_ref: non_empty(payment_ref),
            admin_note: non_empty(admin_note),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn push_opt(params: &mut Vec<(&'static str, String)>, key: &'static str, value: &Option<String>) {
    if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        params.push((key, v.to_string()));
    }
}

/// The three CSV exports the backend offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvExport {
    Phones,
    WalletWithdrawals,
    ReferralWithdrawals,
}

impl CsvExport {
    pub fn path(&self) -> &'static str {
        match self {
            CsvExport::Phones => "/api/auth/admin/users/phones/download",
            CsvExport::WalletWithdrawals => "/api/wallet/withdrawals/export.csv",
            CsvExport::ReferralWithdrawals => "/api/admin/referrals/withdrawals/export.csv",
        }
    }

    pub fn fallback_name(&self) -> &'static str {
        match self {
            CsvExport::Phones => "phone-numbers.csv",
            CsvExport::WalletWithdrawals => "wallet-withdrawals.csv",
            CsvExport::ReferralWithdrawals => "referral-withdrawals.csv",
        }
    }
}

impl FromStr for CsvExport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "phones" => Ok(CsvExport::Phones),
            "wallet-withdrawals" => Ok(CsvExport::WalletWithdrawals),
            "referral-withdrawals" => Ok(CsvExport::ReferralWithdrawals),
            other => Err(format!(
                "unknown export '{other}' (expected phones, wallet-withdrawals or referral-withdrawals)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDownload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn signup(&self, req: &SignupRequest) -> Result<Value, ApiError>;
    async fn login(&self, req: &LoginRequest) -> Result<Value, ApiError>;
    async fn dashboard_overview(&self, token: &str, query: &OverviewQuery) -> Result<Value, ApiError>;
    async fn users(&self, token: &str, query: &UsersQuery) -> Result<Value, ApiError>;
    async fn user(&self, token: &str, user_id: &str, depth: u32) -> Result<Value, ApiError>;
    async fn non_paid_referrals(
        &self,
        token: &str,
        user_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Value, ApiError>;
    async fn referral_withdrawals(&self, token: &str, query: &WithdrawalsQuery) -> Result<Value, ApiError>;
    async fn update_referral_withdrawal(
        &self,
        token: &str,
        request_id: &str,
        update: &WithdrawalUpdate,
    ) -> Result<Value, ApiError>;
    async fn send_trade_message(&self, token: &str, category: &str, payload: &Value) -> Result<Value, ApiError>;
    async fn send_daily_tip(&self, token: &str, payload: &Value) -> Result<Value, ApiError>;
    async fn upload_image(&self, token: &str, file_name: &str, bytes: Vec<u8>) -> Result<Value, ApiError>;
    async fn download_csv(
        &self,
        token: &str,
        export: CsvExport,
        params: &[(&'static str, String)],
    ) -> Result<CsvDownload, ApiError>;
}

pub struct HttpAdminApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAdminApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, path: &str, params: &[(&str, String)], token: Option<&str>) -> RequestBuilder {
        let url = with_query(&format!("{}{}", self.base_url, path), params);
        log::debug!("[api] {method} {url}");
        let rb = self.client.request(method, url);
        match token {
            Some(tk) => rb.bearer_auth(tk),
            None => rb,
        }
    }

    async fn send(&self, rb: RequestBuilder) -> Result<Value, ApiError> {
        let response = rb.send().await?;
        let status = response.status();
        let body = parse_body(response).await?;
        if !status.is_success() {
            let message = extract_error_message(&body);
            log::warn!("[api] request failed ({status}): {message}");
            return Err(ApiError::Http { status, message });
        }
        Ok(body)
    }

    async fn get(&self, token: &str, path: &str, params: &[(&str, String)]) -> Result<Value, ApiError> {
        self.send(self.request(Method::GET, path, params, Some(token))).await
    }

    async fn send_json<T: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        payload: &T,
    ) -> Result<Value, ApiError> {
        self.send(self.request(method, path, &[], token).json(payload)).await
    }
}

#[async_trait]
impl AdminApi for HttpAdminApi {
    async fn signup(&self, req: &SignupRequest) -> Result<Value, ApiError> {
        self.send_json(Method::POST, "/api/auth/admin/signup", None, req).await
    }

    async fn login(&self, req: &LoginRequest) -> Result<Value, ApiError> {
        self.send_json(Method::POST, "/api/auth/admin/login", None, req).await
    }

    async fn dashboard_overview(&self, token: &str, query: &OverviewQuery) -> Result<Value, ApiError> {
        self.get(token, "/api/admin/dashboard/overview", &query.to_params()).await
    }

    async fn users(&self, token: &str, query: &UsersQuery) -> Result<Value, ApiError> {
        self.get(token, "/api/admin/users", &query.to_params()).await
    }

    async fn user(&self, token: &str, user_id: &str, depth: u32) -> Result<Value, ApiError> {
        let path = format!("/api/admin/users/{}", urlencoding::encode(user_id));
        let params: Vec<(&str, String)> = if depth > 0 {
            vec![("depth", depth.to_string())]
        } else {
            Vec::new()
        };
        self.get(token, &path, &params).await
    }

    async fn non_paid_referrals(
        &self,
        token: &str,
        user_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Value, ApiError> {
        let path = format!("/api/admin/users/{}/referrals/non-paid", urlencoding::encode(user_id));
        let params = [("page", page.to_string()), ("pageSize", page_size.to_string())];
        self.get(token, &path, &params).await
    }

    async fn referral_withdrawals(&self, token: &str, query: &WithdrawalsQuery) -> Result<Value, ApiError> {
        self.get(token, "/api/admin/referrals/withdrawals", &query.to_params()).await
    }

    async fn update_referral_withdrawal(
        &self,
        token: &str,
        request_id: &str,
        update: &WithdrawalUpdate,
    ) -> Result<Value, ApiError> {
        let path = format!("/api/admin/referrals/withdrawals/{}", urlencoding::encode(request_id));
        self.send_json(Method::PATCH, &path, Some(token), update).await
    }

    async fn send_trade_message(&self, token: &str, category: &str, payload: &Value) -> Result<Value, ApiError> {
        let path = format!("/api/advice-v2/{}", urlencoding::encode(category));
        self.send_json(Method::POST, &path, Some(token), payload).await
    }

    async fn send_daily_tip(&self, token: &str, payload: &Value) -> Result<Value, ApiError> {
        self.send_json(Method::POST, "/api/admin/daily-tip", Some(token), payload).await
    }

    async fn upload_image(&self, token: &str, file_name: &str, bytes: Vec<u8>) -> Result<Value, ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("image", part);
        self.send(self.request(Method::POST, "/api/images/upload", &[], Some(token)).multipart(form))
            .await
    }

    async fn download_csv(
        &self,
        token: &str,
        export: CsvExport,
        params: &[(&'static str, String)],
    ) -> Result<CsvDownload, ApiError> {
        let response = self.request(Method::GET, export.path(), params, Some(token)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = csv_error_message(&text);
            log::warn!("[api] export {:?} failed ({status}): {message}", export);
            return Err(ApiError::Http { status, message });
        }

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(resolve_csv_filename)
            .unwrap_or_else(|| export.fallback_name().to_string());
        let bytes = response.bytes().await?.to_vec();
        log::info!("[api] export {:?}: {} bytes as {}", export, bytes.len(), filename);
        Ok(CsvDownload { filename, bytes })
    }
}

/// JSON when the content type says so, otherwise the raw text as a string.
async fn parse_body(response: Response) -> Result<Value, ApiError> {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    let text = response.text().await?;
    if !is_json {
        return Ok(Value::String(text));
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}

/// `message`, then `error`, then the first of `errors` (its `message`, or
/// itself when a string), else the generic failure text.
pub fn extract_error_message(body: &Value) -> String {
    let text = |v: Option<&Value>| match v {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    };
    let first_error = match body.get("errors") {
        Some(Value::Array(errors)) => errors
            .first()
            .and_then(|e| text(e.get("message")).or_else(|| text(Some(e)))),
        _ => None,
    };
    text(body.get("message"))
        .or_else(|| text(body.get("error")))
        .or(first_error)
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}

/// Export failures: a JSON body's `message`/`error`, else the raw text.
pub fn csv_error_message(text: &str) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(parsed) => ["message", "error"]
            .iter()
            .find_map(|k| parsed.get(*k).and_then(Value::as_str).filter(|s| !s.is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
        Err(_) if !text.trim().is_empty() => text.to_string(),
        Err(_) => GENERIC_FAILURE.to_string(),
    }
}

/// `filename*=UTF-8''…` (percent-decoded) wins over `filename="…"`.
pub fn resolve_csv_filename(header: &str) -> Option<String> {
    let lower = header.to_ascii_lowercase();

    if let Some(pos) = lower.find("filename*=utf-8''") {
        let start = pos + "filename*=utf-8''".len();
        let raw = header[start..].split(';').next().unwrap_or("").trim();
        if !raw.is_empty() {
            return Some(
                urlencoding::decode(raw)
                    .map(|s| s.into_owned())
                    .unwrap_or_else(|_| raw.to_string()),
            );
        }
    }

    let mut search_from = 0;
    while let Some(rel) = lower[search_from..].find("filename=") {
        let start = search_from + rel + "filename=".len();
        let rest = header[start..].trim_start_matches('"');
        let name: String = rest.chars().take_while(|c| *c != '"' && *c != ';').collect();
        if !name.is_empty() {
            return Some(name);
        }
        search_from = start;
    }
    None
}

/// Append a query string, skipping empty values.
pub fn with_query(url: &str, params: &[(&str, String)]) -> String {
    let query: Vec<String> = params
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect();
    if query.is_empty() {
        url.to_string()
    } else {
        format!("{url}?{}", query.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_message_priority() {
        assert_eq!(extract_error_message(&json!({"message": "Bad", "error": "x"})), "Bad");
        assert_eq!(extract_error_message(&json!({"error": "Nope"})), "Nope");
        assert_eq!(
            extract_error_message(&json!({"errors": [{"message": "Email taken"}]})),
            "Email taken"
        );
        assert_eq!(extract_error_message(&json!({"errors": ["Too short"]})), "Too short");
        assert_eq!(extract_error_message(&json!({"errors": []})), GENERIC_FAILURE);
        assert_eq!(extract_error_message(&json!("<html>502</html>")), GENERIC_FAILURE);
    }

    #[test]
    fn csv_errors_fall_back_to_text() {
        assert_eq!(csv_error_message(r#"{"message":"Forbidden"}"#), "Forbidden");
        assert_eq!(csv_error_message("Service unavailable"), "Service unavailable");
        assert_eq!(csv_error_message(""), GENERIC_FAILURE);
    }

    #[test]
    fn filename_from_content_disposition() {
        assert_eq!(
            resolve_csv_filename("attachment; filename*=UTF-8''users%20list.csv").as_deref(),
            Some("users list.csv")
        );
        assert_eq!(
            resolve_csv_filename(r#"attachment; filename="phones.csv""#).as_deref(),
            Some("phones.csv")
        );
        assert_eq!(
            resolve_csv_filename(r#"attachment; filename="a.csv"; filename*=UTF-8''b.csv"#).as_deref(),
            Some("b.csv")
        );
        assert_eq!(resolve_csv_filename("attachment; filename=plain.csv").as_deref(), Some("plain.csv"));
        assert_eq!(resolve_csv_filename("inline"), None);
    }

    #[test]
    fn query_skips_empty_values() {
        let q = WithdrawalsQuery { status: Some("pending".into()), user_id: Some("  ".into()) };
        assert_eq!(with_query("/w", &q.to_params()), "/w?status=pending");
        assert_eq!(with_query("/w", &[]), "/w");
        let users = UsersQuery { search: Some("a b".into()), ..Default::default() };
        assert_eq!(with_query("/u", &users.to_params()), "/u?page=1&limit=25&search=a%20b");
    }

    #[test]
    fn withdrawal_update_trims_and_omits() {
        let body = serde_json::to_value(WithdrawalUpdate::new("paid", " UTR123 ", "   ")).unwrap();
        assert_eq!(body, json!({"status": "paid", "paymentRef": "UTR123"}));
    }

    #[test]
    fn signup_body_is_camel_case() {
        let body = serde_json::to_value(SignupRequest {
            name: "A".into(),
            email: "a@x.in".into(),
            password: "p".into(),
            confirm_password: "p".into(),
        })
        .unwrap();
        assert!(body.get("confirmPassword").is_some());
    }

    #[test]
    fn export_names() {
        assert_eq!("phones".parse::<CsvExport>(), Ok(CsvExport::Phones));
        assert_eq!(CsvExport::ReferralWithdrawals.fallback_name(), "referral-withdrawals.csv");
        assert!("bogus".parse::<CsvExport>().is_err());
    }
}
