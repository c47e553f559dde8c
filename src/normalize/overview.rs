//! Dashboard overview totals and the four summary cards.

use serde_json::Value;

use super::fields::first_truthy_path;
use super::money::{format_number, format_rupees, parse_opt, resolve_rupees, PLACEHOLDER};
use super::unwrap_envelope;

const TOTALS: &[&str] = &["totals", "data.totals", "result.totals"];
const MONEY: &[&str] = &["money", "data.money", "result.money"];

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverviewView {
    pub total_users: Option<f64>,
    pub active_users: Option<f64>,
    pub wallet_balance: Option<f64>,
    pub pending_referral: Option<f64>,
    pub pending_referral_count: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewCard {
    pub label: &'static str,
    pub value: String,
    pub note: String,
}

impl OverviewView {
    pub fn from_raw(body: &Value) -> Self {
        let resolved = unwrap_envelope(body);
        let totals = first_truthy_path(resolved, TOTALS).unwrap_or(&Value::Null);
        let money = first_truthy_path(resolved, MONEY).unwrap_or(&Value::Null);

        Self {
            total_users: parse_opt(totals.get("users")),
            active_users: parse_opt(totals.get("activeUsers")),
            wallet_balance: resolve_rupees(
                money.get("walletBalanceRupees"),
                money.get("walletBalancePaise"),
            ),
            pending_referral: resolve_rupees(
                money.get("pendingReferralRupees"),
                money.get("pendingReferralPaise"),
            ),
            pending_referral_count: parse_opt(money.get("pendingReferralCount")),
        }
    }

    pub fn cards(&self) -> [OverviewCard; 4] {
        let pending_count = format_number(self.pending_referral_count);
        let pending_note = if pending_count == PLACEHOLDER {
            "Pending referrals".to_string()
        } else {
            format!("{pending_count} pending referrals")
        };

        [
            OverviewCard {
                label: "Total signups",
                value: format_number(self.total_users),
                note: "All registered users".into(),
            },
            OverviewCard {
                label: "Active users",
                value: format_number(self.active_users),
                note: "Logged in during the selected range".into(),
            },
            OverviewCard {
                label: "Wallet balance",
                value: format_rupees(self.wallet_balance),
                note: "Total wallet balance in rupees".into(),
            },
            OverviewCard {
                label: "Referral income",
                value: format_rupees(self.pending_referral),
                note: pending_note,
            },
        ]
    }
}
