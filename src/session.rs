//! Admin session: bearer token, profile and the capped local session log.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::fields::{first_text, first_truthy_path};
use crate::normalize::unwrap_envelope;
use crate::storage::KeyValueStore;

pub const TOKEN_KEY: &str = "adminToken";
pub const PROFILE_KEY: &str = "adminProfile";
pub const SESSION_LOG_KEY: &str = "adminSessionLog";
pub const SESSION_LOG_CAP: usize = 100;

const TOKEN_PATHS: &[&str] = &["token", "data.token", "accessToken", "data.accessToken"];
const PROFILE_PATHS: &[&str] = &["admin", "user", "data.admin", "data.user"];

pub const MISSING_TOKEN_MESSAGE: &str = "Login succeeded but no token was returned.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminProfile {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl AdminProfile {
    fn from_raw(raw: &Value) -> Self {
        Self {
            id: first_text(raw, &["id", "_id"]),
            name: first_text(raw, &["name"]),
            email: first_text(raw, &["email"]),
        }
    }

    pub fn display(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("Admin")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLogEntry {
    #[serde(flatten)]
    pub profile: AdminProfile,
    pub login_at: DateTime<Utc>,
    pub logout_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub token: String,
    pub profile: AdminProfile,
    pub login_at: DateTime<Utc>,
}

impl AdminSession {
    /// Resolve the token from a login response; `Err` carries the
    /// user-visible message when none was returned.
    pub fn from_login_response(
        body: &Value,
        fallback_email: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<Self, String> {
        let token = TOKEN_PATHS
            .iter()
            .find_map(|p| first_truthy_path(body, &[*p]).and_then(Value::as_str))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| MISSING_TOKEN_MESSAGE.to_string())?;

        let resolved = unwrap_envelope(body);
        let mut profile = first_truthy_path(resolved, PROFILE_PATHS)
            .or_else(|| first_truthy_path(body, PROFILE_PATHS))
            .map(AdminProfile::from_raw)
            .unwrap_or_default();
        if profile.email.is_none() && !fallback_email.is_empty() {
            profile.email = Some(fallback_email.to_string());
        }

        Ok(Self { token: token.to_string(), profile, login_at: now })
    }

    /// Persist token and profile, and append a log entry.
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        store.set(TOKEN_KEY, &self.token)?;
        store.set(PROFILE_KEY, &serde_json::to_string(&self.profile)?)?;

        let mut log = read_log(store)?;
        log.push(SessionLogEntry {
            profile: self.profile.clone(),
            login_at: self.login_at,
            logout_at: None,
        });
        write_log(store, log)?;
        log::info!("[session] signed in as {}", self.profile.display());
        Ok(())
    }

    /// Startup: a stored token means a live session.
    pub fn load(store: &dyn KeyValueStore) -> Result<Option<Self>> {
        let Some(token) = store.get(TOKEN_KEY)?.filter(|t| !t.is_empty()) else {
            return Ok(None);
        };
        let profile = match store.get(PROFILE_KEY)? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            None => AdminProfile::default(),
        };
        let login_at = read_log(store)?
            .iter()
            .rev()
            .find(|e| e.logout_at.is_none())
            .map_or_else(Utc::now, |e| e.login_at);
        Ok(Some(Self { token, profile, login_at }))
    }

    /// Stamp the most recent open log entry, then drop the token and profile.
    pub fn end(self, store: &mut dyn KeyValueStore, now: DateTime<Utc>) -> Result<()> {
        let mut log = read_log(store)?;
        if let Some(open) = log.iter_mut().rev().find(|e| e.logout_at.is_none()) {
            open.logout_at = Some(now);
        }
        write_log(store, log)?;
        store.remove(TOKEN_KEY)?;
        store.remove(PROFILE_KEY)?;
        log::info!("[session] signed out");
        Ok(())
    }
}

pub fn read_log(store: &dyn KeyValueStore) -> Result<Vec<SessionLogEntry>> {
    match store.get(SESSION_LOG_KEY)? {
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                log::warn!("[session] discarding unreadable session log: {e}");
                Ok(Vec::new())
            }
        },
        None => Ok(Vec::new()),
    }
}

/// Newest last; the oldest entries fall off past the cap.
fn write_log(store: &mut dyn KeyValueStore, mut log: Vec<SessionLogEntry>) -> Result<()> {
    if log.len() > SESSION_LOG_CAP {
        log.drain(..log.len() - SESSION_LOG_CAP);
    }
    let raw = serde_json::to_string(&log).context("serializing session log")?;
    store.set(SESSION_LOG_KEY, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn token_from_any_known_field() {
        let now = Utc::now();
        for body in [
            json!({"token": "t"}),
            json!({"data": {"token": "t"}}),
            json!({"accessToken": "t"}),
            json!({"data": {"accessToken": "t"}}),
        ] {
            let session = AdminSession::from_login_response(&body, "", now).unwrap();
            assert_eq!(session.token, "t");
        }
    }

    #[test]
    fn missing_token_is_reported() {
        let err = AdminSession::from_login_response(&json!({"ok": true}), "a@x.in", Utc::now());
        assert_eq!(err.unwrap_err(), MISSING_TOKEN_MESSAGE);
    }

    #[test]
    fn profile_from_admin_or_email() {
        let s = AdminSession::from_login_response(
            &json!({"data": {"token": "t", "admin": {"_id": "a1", "name": "Ops"}}}),
            "ops@x.in",
            Utc::now(),
        )
        .unwrap();
        assert_eq!(s.profile.id.as_deref(), Some("a1"));
        assert_eq!(s.profile.display(), "Ops");
        assert_eq!(s.profile.email.as_deref(), Some("ops@x.in"));
    }

    #[test]
    fn save_load_end() {
        let mut store = MemoryStore::new();
        let now = Utc::now();
        let session = AdminSession::from_login_response(&json!({"token": "abc"}), "a@x.in", now).unwrap();
        session.save(&mut store).unwrap();

        let loaded = AdminSession::load(&store).unwrap().unwrap();
        assert_eq!(loaded.token, "abc");
        assert_eq!(loaded.profile.email.as_deref(), Some("a@x.in"));

        loaded.end(&mut store, now + Duration::minutes(5)).unwrap();
        assert!(AdminSession::load(&store).unwrap().is_none());
        let log = read_log(&store).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].logout_at, Some(now + Duration::minutes(5)));
    }

    #[test]
    fn log_is_capped() {
        let mut store = MemoryStore::new();
        let start = Utc::now();
        for i in 0..(SESSION_LOG_CAP + 5) {
            let s = AdminSession::from_login_response(
                &json!({"token": format!("t{i}")}),
                "",
                start + Duration::seconds(i as i64),
            )
            .unwrap();
            s.save(&mut store).unwrap();
        }
        let log = read_log(&store).unwrap();
        assert_eq!(log.len(), SESSION_LOG_CAP);
        assert_eq!(log[0].login_at, start + Duration::seconds(5));
    }
}
