//! Pure normalization of loosely-shaped backend payloads into display values.
//!
//! Nothing here fabricates data: when no candidate field resolves, the value
//! is `None` (or an explicit `Unknown`), and placeholders are only applied by
//! the `*_text` formatting helpers.

pub mod dates;
pub mod fields;
pub mod money;
pub mod overview;
pub mod referral;
pub mod status;
pub mod user;
pub mod withdrawal;

use serde_json::Value;

pub use overview::{OverviewCard, OverviewView};
pub use referral::{LevelExpansion, ReferralLevel, ReferralTree, MAX_PER_LEVEL};
pub use status::{StatusTone, UserActivity, WithdrawalFilter, WithdrawalStatus};
pub use user::{Chip, ReferralFocus, UserView};
pub use withdrawal::{BankDetails, Requester, UpiDetails, WithdrawalView};

/// `data ?? result ?? body`.
pub fn unwrap_envelope(body: &Value) -> &Value {
    fields::first_present(body, &["data", "result"]).unwrap_or(body)
}

/// A paged list response: `{items, page, limit, total}` under any envelope.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub items: Vec<Value>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub total: u64,
}

impl Page {
    pub fn from_raw(body: &Value) -> Self {
        let resolved = unwrap_envelope(body);
        let items = match resolved.get("items") {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        };
        let as_u32 = |key: &str| {
            money::parse_opt(resolved.get(key))
                .filter(|n| *n >= 1.0)
                .map(|n| n as u32)
        };
        Self {
            items,
            page: as_u32("page"),
            limit: as_u32("limit").or_else(|| as_u32("pageSize")),
            total: money::parse_opt(resolved.get("total"))
                .filter(|n| *n >= 0.0)
                .map_or(0, |n| n as u64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_prefers_data_then_result() {
        let body = json!({"data": {"a": 1}, "result": {"b": 2}});
        assert_eq!(unwrap_envelope(&body), &json!({"a": 1}));
        let body = json!({"data": null, "result": {"b": 2}});
        assert_eq!(unwrap_envelope(&body), &json!({"b": 2}));
        let body = json!({"items": []});
        assert_eq!(unwrap_envelope(&body), &body);
    }

    #[test]
    fn page_defaults() {
        let page = Page::from_raw(&json!({"data": {"items": [{}, {}], "page": 2, "total": "230"}}));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.page, Some(2));
        assert_eq!(page.limit, None);
        assert_eq!(page.total, 230);

        let empty = Page::from_raw(&json!("oops"));
        assert!(empty.items.is_empty());
        assert_eq!(empty.total, 0);
    }
}
