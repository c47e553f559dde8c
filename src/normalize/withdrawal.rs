//! Withdrawal request extraction: requester, amount, bank and UPI details.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::dates::parse_timestamp;
use super::fields::{first_present, first_text, first_truthy, truthy_object, FieldTable};
use super::money::{format_rupees, parse_opt, resolve_rupees};
use super::status::WithdrawalStatus;
use super::unwrap_envelope;

const REQUEST_ID: FieldTable = &["id", "_id", "requestId", "withdrawalId", "referenceId"];

const USER_CONTAINER: FieldTable = &["user", "requestedBy", "requester", "userDetails", "customer"];
const FLAT_USER_ID: FieldTable = &["userId", "userID"];
const NESTED_USER_ID: FieldTable = &["id", "_id"];
const FLAT_USER_NAME: FieldTable = &["userName", "name", "requestedByName"];
const FLAT_USER_EMAIL: FieldTable = &["userEmail", "email"];
const FLAT_USER_PHONE: FieldTable = &["userPhone", "phone"];

const AMOUNT_RUPEES: FieldTable = &["amountRupees", "amountInRupees", "withdrawalRupees", "rupees"];
const AMOUNT_PAISE: FieldTable = &["amountPaise", "amountInPaise", "withdrawalPaise", "paise"];
const AMOUNT_GENERIC: FieldTable = &["amount", "requestedAmount", "withdrawalAmount", "value"];

const BANK_CONTAINER: FieldTable = &[
    "bankDetails",
    "bank",
    "bankAccount",
    "bankInfo",
    "accountDetails",
    "account",
];
const UPI_CONTAINER: FieldTable = &["upiDetails", "upi", "upiId", "upiID", "vpa"];

const METHOD: FieldTable = &["method", "paymentMethod", "channel"];
const LIST_CONTAINER: FieldTable = &["items", "requests", "withdrawals", "data"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Requester {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Requester {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown user")
    }

    pub fn contact(&self) -> &str {
        self.email
            .as_deref()
            .or(self.phone.as_deref())
            .unwrap_or("No contact")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BankDetails {
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub account_name: Option<String>,
    pub ifsc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpiDetails {
    pub upi_id: Option<String>,
    pub upi_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawalView {
    pub id: Option<String>,
    pub requester: Requester,
    pub amount: Option<f64>,
    pub bank: BankDetails,
    pub upi: UpiDetails,
    pub status: WithdrawalStatus,
    pub method: Option<String>,
    pub payment_ref: Option<String>,
    pub admin_note: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl WithdrawalView {
    pub fn from_raw(raw: &Value) -> Self {
        Self {
            id: first_text(raw, REQUEST_ID),
            requester: resolve_requester(raw),
            amount: resolve_amount(raw),
            bank: resolve_bank(raw),
            upi: resolve_upi(raw),
            status: WithdrawalStatus::from_value(raw.get("status")),
            method: resolve_method(raw),
            payment_ref: first_text(raw, &["paymentRef"]),
            admin_note: first_text(raw, &["adminNote"]),
            created_at: raw.get("createdAt").and_then(parse_timestamp),
        }
    }

    /// Actions are offered only for identifiable, non-final requests.
    pub fn can_update(&self) -> bool {
        self.id.is_some() && !self.status.is_final()
    }

    pub fn amount_text(&self) -> String {
        format_rupees(self.amount)
    }

    pub fn method_text(&self) -> &str {
        self.method.as_deref().unwrap_or("Requested amount")
    }
}

/// Pull the request list out of whatever envelope the backend used.
pub fn extract_withdrawal_items(body: &Value) -> Vec<Value> {
    let resolved = unwrap_envelope(body);
    if let Value::Array(items) = resolved {
        return items.clone();
    }
    match first_truthy(resolved, LIST_CONTAINER) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

pub fn resolve_requester(w: &Value) -> Requester {
    let user = truthy_object(w, USER_CONTAINER)
        .map(|m| Value::Object(m.clone()))
        .unwrap_or(Value::Null);
    let user = &user;

    let id = first_text(w, FLAT_USER_ID)
        .or_else(|| first_text(user, NESTED_USER_ID))
        .or_else(|| match w.get("user") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        });

    Requester {
        id,
        name: first_text(user, &["name"]).or_else(|| first_text(w, FLAT_USER_NAME)),
        email: first_text(user, &["email"]).or_else(|| first_text(w, FLAT_USER_EMAIL)),
        phone: first_text(user, &["phone"]).or_else(|| first_text(w, FLAT_USER_PHONE)),
    }
}

/// Withdrawal-specific rupee/paise pair first, then the generic amount family.
pub fn resolve_amount(w: &Value) -> Option<f64> {
    resolve_rupees(first_present(w, AMOUNT_RUPEES), first_present(w, AMOUNT_PAISE))
        .or_else(|| parse_opt(first_present(w, AMOUNT_GENERIC)))
}

pub fn resolve_bank(w: &Value) -> BankDetails {
    let bank = truthy_object(w, BANK_CONTAINER)
        .map(|m| Value::Object(m.clone()))
        .unwrap_or(Value::Null);

    BankDetails {
        bank_name: first_text(&bank, &["bankName", "name"]).or_else(|| first_text(w, &["bankName"])),
        account_number: first_text(&bank, &["accountNumber", "accountNo", "accNumber"])
            .or_else(|| first_text(w, &["accountNumber", "accountNo"])),
        account_name: first_text(&bank, &["accountName", "holderName", "nameOnAccount"])
            .or_else(|| first_text(w, &["accountName"])),
        ifsc: first_text(&bank, &["ifsc", "ifscCode"]).or_else(|| first_text(w, &["ifsc"])),
    }
}

pub fn resolve_upi(w: &Value) -> UpiDetails {
    let candidate = first_truthy(w, UPI_CONTAINER);
    if let Some(Value::String(s)) = candidate {
        return UpiDetails { upi_id: Some(s.clone()), upi_name: None };
    }
    let upi = candidate.filter(|v| v.is_object()).cloned().unwrap_or(Value::Null);

    UpiDetails {
        upi_id: first_text(&upi, &["upiId", "id", "vpa"])
            .or_else(|| first_text(w, &["upiId", "upiID", "vpa"])),
        upi_name: first_text(&upi, &["name", "accountName"]).or_else(|| first_text(w, &["upiName"])),
    }
}

/// First of the method keys that holds a string.
fn resolve_method(w: &Value) -> Option<String> {
    METHOD
        .iter()
        .find_map(|k| match w.get(*k) {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
}
