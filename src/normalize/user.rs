//! User records: directory rows, referral roots and tree descendants all go
//! through [`UserView::from_raw`].

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::dates::resolve_created_at;
use super::fields::{first_present, first_text, path, value_text, FieldTable};
use super::money::{format_number, format_rupees, parse_opt, resolve_rupees};
use super::status::{resolve_activity, UserActivity};

const USER_ID: FieldTable = &["id", "_id"];
const WALLET_RUPEES: FieldTable = &["walletBalanceRupees", "wallet_balance_rupees"];
const WALLET_PAISE: FieldTable = &["walletBalancePaise", "wallet_balance_paise"];
const PENDING_RUPEES: FieldTable = &[
    "pendingReferralRupees",
    "pendingReferralApproxRupees",
    "pending_referral_rupees",
];
const PENDING_PAISE: FieldTable = &["pendingReferralPaise", "pending_referral_paise"];
const PENDING_COUNT: FieldTable = &["pendingReferralCount", "pending_referral_count"];
const REFERRAL_COUNT: FieldTable = &["referralCount", "referralsCount", "referral_count", "totalReferrals"];

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserView {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub referral_code: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub wallet: Option<f64>,
    pub pending: Option<f64>,
    pub pending_count: Option<f64>,
    pub referral_count: Option<f64>,
    pub activity: UserActivity,
}

/// A labelled value shown next to a user (`Wallet: Rs 120`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip {
    pub label: &'static str,
    pub value: String,
}

impl UserView {
    pub fn from_raw(raw: &Value, now: DateTime<Utc>) -> Self {
        Self {
            id: resolve_user_id(raw),
            name: first_text(raw, &["name"]),
            email: first_text(raw, &["email"]),
            phone: first_text(raw, &["phone"]),
            referral_code: first_text(raw, &["referralCode"]),
            created_at: resolve_created_at(raw),
            wallet: resolve_rupees(
                first_present(raw, WALLET_RUPEES),
                first_present(raw, WALLET_PAISE),
            ),
            pending: resolve_rupees(
                first_present(raw, PENDING_RUPEES),
                first_present(raw, PENDING_PAISE),
            ),
            pending_count: parse_opt(first_present(raw, PENDING_COUNT)),
            referral_count: parse_opt(first_present(raw, REFERRAL_COUNT)),
            activity: resolve_activity(raw, now),
        }
    }

    /// Name, else email, else phone, else `"User"`.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .or(self.phone.as_deref())
            .unwrap_or("User")
    }

    /// Email, else phone, else referral code, else the placeholder.
    pub fn contact_line(&self) -> &str {
        self.email
            .as_deref()
            .or(self.phone.as_deref())
            .or(self.referral_code.as_deref())
            .unwrap_or("--")
    }

    /// Phone line, else referral code line (tree nodes).
    pub fn secondary_line(&self) -> Option<String> {
        self.phone
            .as_ref()
            .map(|p| format!("Phone: {p}"))
            .or_else(|| self.referral_code.as_ref().map(|c| format!("Code: {c}")))
    }

    pub fn wallet_text(&self) -> String {
        format_rupees(self.wallet)
    }

    pub fn pending_text(&self) -> String {
        format_rupees(self.pending)
    }

    /// `"3 pending"` or `"Pending"` when the count is unknown.
    pub fn pending_note(&self) -> String {
        match self.pending_count {
            Some(_) => format!("{} pending", format_number(self.pending_count)),
            None => "Pending".to_string(),
        }
    }

    /// Only values that are actually present become chips.
    pub fn chips(&self) -> Vec<Chip> {
        let mut chips = Vec::with_capacity(3);
        if self.wallet.is_some() {
            chips.push(Chip { label: "Wallet", value: format_rupees(self.wallet) });
        }
        if self.pending.is_some() {
            chips.push(Chip { label: "Pending", value: format_rupees(self.pending) });
        }
        if self.referral_count.is_some() {
            chips.push(Chip { label: "Referrals", value: format_number(self.referral_count) });
        }
        chips
    }
}

/// `id`, `_id`, then the same under a nested `user`.
pub fn resolve_user_id(raw: &Value) -> Option<String> {
    first_text(raw, USER_ID).or_else(|| {
        ["user.id", "user._id"]
            .iter()
            .filter_map(|p| path(raw, p))
            .find_map(value_text)
    })
}

/// The user the referral tab is focused on, as picked from a list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReferralFocus {
    pub id: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<&UserView> for ReferralFocus {
    fn from(u: &UserView) -> Self {
        Self {
            id: u.id.clone(),
            name: u.display_name().to_string(),
            email: u.email.clone(),
            phone: u.phone.clone(),
        }
    }
}
