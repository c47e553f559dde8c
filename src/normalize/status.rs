//! Withdrawal status normalization and the user active/inactive cascade.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::dates::parse_timestamp;
use super::fields::{first_present, FieldTable};

// ---------------------------------------------------------------------------
// Withdrawal status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WithdrawalStatus {
    Pending,
    Paid,
    Cancelled,
    /// Anything else the backend sends, case-folded.
    Other(String),
}

/// Colour family a status renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Pending,
    Paid,
    Cancelled,
    Unknown,
}

impl WithdrawalStatus {
    /// Case-fold; empty means pending; `canceled` is `cancelled`.
    pub fn normalize(raw: &str) -> Self {
        let folded = raw.trim().to_lowercase();
        match folded.as_str() {
            "" | "pending" => WithdrawalStatus::Pending,
            "paid" => WithdrawalStatus::Paid,
            "cancelled" | "canceled" => WithdrawalStatus::Cancelled,
            _ => WithdrawalStatus::Other(folded),
        }
    }

    pub fn from_value(v: Option<&Value>) -> Self {
        match v {
            Some(Value::String(s)) => Self::normalize(s),
            Some(Value::Number(n)) => Self::normalize(&n.to_string()),
            _ => WithdrawalStatus::Pending,
        }
    }

    /// Wire value used in PATCH bodies and filters.
    pub fn as_str(&self) -> &str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Paid => "paid",
            WithdrawalStatus::Cancelled => "cancelled",
            WithdrawalStatus::Other(s) => s,
        }
    }

    pub fn label(&self) -> String {
        match self {
            WithdrawalStatus::Pending => "Unpaid".into(),
            WithdrawalStatus::Paid => "Paid".into(),
            WithdrawalStatus::Cancelled => "Cancelled".into(),
            WithdrawalStatus::Other(s) => capitalize(s),
        }
    }

    pub fn tone(&self) -> StatusTone {
        match self {
            WithdrawalStatus::Pending => StatusTone::Pending,
            WithdrawalStatus::Paid => StatusTone::Paid,
            WithdrawalStatus::Cancelled => StatusTone::Cancelled,
            WithdrawalStatus::Other(_) => StatusTone::Unknown,
        }
    }

    /// Paid and cancelled requests can no longer be changed.
    pub fn is_final(&self) -> bool {
        matches!(self, WithdrawalStatus::Paid | WithdrawalStatus::Cancelled)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Unknown".into(),
    }
}

/// Status filter chips on the withdrawals tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WithdrawalFilter {
    #[default]
    Pending,
    Paid,
    Cancelled,
    All,
}

impl WithdrawalFilter {
    pub const ALL: [WithdrawalFilter; 4] = [
        WithdrawalFilter::Pending,
        WithdrawalFilter::Paid,
        WithdrawalFilter::Cancelled,
        WithdrawalFilter::All,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            WithdrawalFilter::Pending => "pending",
            WithdrawalFilter::Paid => "paid",
            WithdrawalFilter::Cancelled => "cancelled",
            WithdrawalFilter::All => "all",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WithdrawalFilter::Pending => "Unpaid",
            WithdrawalFilter::Paid => "Paid",
            WithdrawalFilter::Cancelled => "Cancelled",
            WithdrawalFilter::All => "All",
        }
    }
}

// ---------------------------------------------------------------------------
// User activity cascade
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserActivity {
    Active,
    Inactive,
    /// Nothing on the record decides it; not displayed.
    #[default]
    Unknown,
}

impl UserActivity {
    pub fn label(&self) -> Option<&'static str> {
        match self {
            UserActivity::Active => Some("Active"),
            UserActivity::Inactive => Some("Inactive"),
            UserActivity::Unknown => None,
        }
    }

    fn known(self) -> Option<Self> {
        (self != UserActivity::Unknown).then_some(self)
    }
}

/// Inverted flags: `true` means inactive.
const EXPIRED_FLAGS: FieldTable = &[
    "isExpired",
    "is_expired",
    "expired",
    "isSubscriptionExpired",
    "subscriptionExpired",
];

/// Direct status-like fields, scanned in order.
const STATUS_FIELDS: FieldTable = &[
    "status",
    "subscriptionStatus",
    "subscription_status",
    "accountStatus",
    "account_status",
    "planStatus",
    "membershipStatus",
    "userStatus",
    "isActive",
    "is_active",
    "active",
    "isSubscribed",
    "subscribed",
    "isPaid",
    "paid",
    "hasActiveSubscription",
    "hasActivePlan",
];

const NESTED_CONTAINERS: FieldTable = &["subscription", "plan", "membership", "account"];

const EXPIRY_FIELDS: FieldTable = &[
    "expiresAt",
    "expires_at",
    "expiryDate",
    "expiry_date",
    "expireAt",
    "expiry",
    "validUntil",
    "valid_until",
    "validTill",
    "subscriptionExpiresAt",
    "subscriptionEndDate",
    "planExpiresAt",
    "endDate",
    "end_date",
];

const ACTIVE_WORDS: &[&str] = &[
    "active",
    "paid",
    "subscribed",
    "enabled",
    "live",
    "current",
    "trialing",
    "yes",
    "y",
    "true",
    "1",
];

const INACTIVE_WORDS: &[&str] = &[
    "inactive",
    "unpaid",
    "expired",
    "trial_expired",
    "cancelled",
    "canceled",
    "disabled",
    "paused",
    "suspended",
    "blocked",
    "banned",
    "past_due",
    "lapsed",
    "ended",
    "terminated",
    "deactivated",
    "unsubscribed",
    "incomplete_expired",
    "no",
    "n",
    "false",
    "0",
];

/// Nested containers are followed at most this deep.
const MAX_NESTING: usize = 3;

/// Resolve active/inactive through the ordered cascade: inverted expiry
/// flags, direct status fields, nested subscription-like objects, then an
/// expiry timestamp compared against `now`.
pub fn resolve_activity(record: &Value, now: DateTime<Utc>) -> UserActivity {
    cascade(record, now, 0).unwrap_or(UserActivity::Unknown)
}

fn cascade(record: &Value, now: DateTime<Utc>, depth: usize) -> Option<UserActivity> {
    if !record.is_object() {
        return None;
    }

    if let Some(expired) = EXPIRED_FLAGS
        .iter()
        .filter_map(|k| record.get(*k))
        .find_map(flag_value)
    {
        return Some(if expired { UserActivity::Inactive } else { UserActivity::Active });
    }

    if let Some(direct) = STATUS_FIELDS
        .iter()
        .filter_map(|k| record.get(*k))
        .find_map(|v| classify(v).known())
    {
        return Some(direct);
    }

    if depth < MAX_NESTING {
        if let Some(nested) = NESTED_CONTAINERS
            .iter()
            .filter_map(|k| record.get(*k))
            .find_map(|v| cascade(v, now, depth + 1))
        {
            return Some(nested);
        }
    }

    let expiry = first_present(record, EXPIRY_FIELDS).and_then(parse_timestamp)?;
    Some(if expiry > now { UserActivity::Active } else { UserActivity::Inactive })
}

/// Map one status-like value through the synonym table.
fn classify(v: &Value) -> UserActivity {
    match v {
        Value::Bool(true) => UserActivity::Active,
        Value::Bool(false) => UserActivity::Inactive,
        Value::Number(n) => match n.as_f64() {
            Some(f) if f == 1.0 => UserActivity::Active,
            Some(f) if f == 0.0 => UserActivity::Inactive,
            _ => UserActivity::Unknown,
        },
        Value::String(s) => {
            let word = fold_word(s);
            if ACTIVE_WORDS.contains(&word.as_str()) {
                UserActivity::Active
            } else if INACTIVE_WORDS.contains(&word.as_str()) {
                UserActivity::Inactive
            } else {
                UserActivity::Unknown
            }
        }
        _ => UserActivity::Unknown,
    }
}

/// Read an expiry flag as a boolean; non-flag values are skipped.
fn flag_value(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f == 1.0 => Some(true),
            Some(f) if f == 0.0 => Some(false),
            _ => None,
        },
        Value::String(s) => match fold_word(s).as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn fold_word(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn withdrawal_status_folding() {
        assert_eq!(WithdrawalStatus::normalize("Canceled"), WithdrawalStatus::Cancelled);
        assert_eq!(WithdrawalStatus::normalize(""), WithdrawalStatus::Pending);
        assert_eq!(WithdrawalStatus::normalize("PAID"), WithdrawalStatus::Paid);
        assert_eq!(WithdrawalStatus::from_value(None), WithdrawalStatus::Pending);
        assert_eq!(WithdrawalStatus::Pending.label(), "Unpaid");
    }

    #[test]
    fn unknown_status_passes_through() {
        let s = WithdrawalStatus::normalize("Processing");
        assert_eq!(s, WithdrawalStatus::Other("processing".into()));
        assert_eq!(s.tone(), StatusTone::Unknown);
        assert_eq!(s.label(), "Processing");
        assert!(!s.is_final());
    }

    #[test]
    fn expired_flag_decides_first() {
        let u = json!({"isExpired": true, "status": "active", "subscription": {"isActive": true}});
        assert_eq!(resolve_activity(&u, now()), UserActivity::Inactive);
        let u = json!({"expired": false, "status": "blocked"});
        assert_eq!(resolve_activity(&u, now()), UserActivity::Active);
    }

    #[test]
    fn direct_status_synonyms() {
        assert_eq!(resolve_activity(&json!({"status": "trial_expired"}), now()), UserActivity::Inactive);
        assert_eq!(resolve_activity(&json!({"status": "Past Due"}), now()), UserActivity::Inactive);
        assert_eq!(resolve_activity(&json!({"subscriptionStatus": "LIVE"}), now()), UserActivity::Active);
        assert_eq!(resolve_activity(&json!({"isActive": 1}), now()), UserActivity::Active);
        assert_eq!(resolve_activity(&json!({"isPaid": "no"}), now()), UserActivity::Inactive);
    }

    #[test]
    fn unrecognized_strings_fall_through() {
        let u = json!({"status": "mystery", "isActive": false});
        assert_eq!(resolve_activity(&u, now()), UserActivity::Inactive);
    }

    #[test]
    fn nested_subscription() {
        assert_eq!(
            resolve_activity(&json!({"subscription": {"isActive": true}}), now()),
            UserActivity::Active
        );
        assert_eq!(
            resolve_activity(&json!({"plan": "gold", "membership": {"status": "paused"}}), now()),
            UserActivity::Inactive
        );
    }

    #[test]
    fn expiry_timestamp_compared_to_now() {
        assert_eq!(
            resolve_activity(&json!({"expiresAt": "2026-01-01T00:00:00Z"}), now()),
            UserActivity::Active
        );
        assert_eq!(
            resolve_activity(&json!({"subscription": {"endDate": "2024-01-01"}}), now()),
            UserActivity::Inactive
        );
    }

    #[test]
    fn nothing_matches_is_unknown() {
        let u = json!({"name": "Asha", "email": "a@x.in", "plan": "gold"});
        assert_eq!(resolve_activity(&u, now()), UserActivity::Unknown);
        assert_eq!(UserActivity::Unknown.label(), None);
        assert_eq!(resolve_activity(&json!("user"), now()), UserActivity::Unknown);
    }
}
