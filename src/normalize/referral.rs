//! Referral tree shaping and per-level expansion.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::fields::{first_truthy, first_truthy_path, FieldTable};
use super::money::parse_numeric;
use super::unwrap_envelope;
use super::user::UserView;

/// Descendants shown per level before "Show all".
pub const MAX_PER_LEVEL: usize = 8;

const DESCENDANT_LISTS: FieldTable = &["descendants", "users", "items"];
const NODE_WRAPPERS: FieldTable = &["user", "referral"];
const TREE_PATHS: &[&str] = &["referralTree", "user.referralTree", "item.referralTree"];
const ROOT_USER: FieldTable = &["user", "item"];

#[derive(Debug, Clone, PartialEq)]
pub struct ReferralLevel {
    pub level: u64,
    pub descendants: Vec<UserView>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReferralTree {
    pub levels: Vec<ReferralLevel>,
}

impl ReferralTree {
    /// `levels` may be an array (positional numbering) or a map keyed by
    /// level; map entries are ordered by level number.
    pub fn from_raw(raw: &Value, now: DateTime<Utc>) -> Self {
        // Map keys stand in for a missing `level`; serde_json orders them as strings.
        let raw_levels: Vec<(Option<u64>, &Value)> = match raw.get("levels") {
            Some(Value::Array(items)) => items.iter().map(|v| (None, v)).collect(),
            Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.trim().parse::<u64>().ok(), v)).collect(),
            _ => Vec::new(),
        };

        let mut levels: Vec<ReferralLevel> = raw_levels
            .into_iter()
            .enumerate()
            .map(|(index, (key, level))| ReferralLevel {
                level: level_number(level).or(key).unwrap_or(index as u64 + 1),
                descendants: descendants(level)
                    .iter()
                    .map(|d| UserView::from_raw(unwrap_node(d), now))
                    .collect(),
            })
            .collect();

        if matches!(raw.get("levels"), Some(Value::Object(_))) {
            levels.sort_by_key(|l| l.level);
        }
        Self { levels }
    }

    pub fn total_referrals(&self) -> usize {
        self.levels.iter().map(|l| l.descendants.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

fn level_number(level: &Value) -> Option<u64> {
    let n = level.get("level").and_then(parse_numeric)?;
    (n >= 0.0 && n.fract() == 0.0).then_some(n as u64)
}

fn descendants(level: &Value) -> &[Value] {
    match first_truthy(level, DESCENDANT_LISTS) {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}

/// `desc.user || desc.referral || desc`.
fn unwrap_node(desc: &Value) -> &Value {
    first_truthy(desc, NODE_WRAPPERS).unwrap_or(desc)
}

/// Which levels are showing every descendant. Reset whenever the tree is rebuilt.
#[derive(Debug, Clone, Default)]
pub struct LevelExpansion {
    expanded: HashSet<u64>,
}

impl LevelExpansion {
    pub fn toggle(&mut self, level: u64) {
        if !self.expanded.remove(&level) {
            self.expanded.insert(level);
        }
    }

    pub fn is_expanded(&self, level: u64) -> bool {
        self.expanded.contains(&level)
    }

    pub fn clear(&mut self) {
        self.expanded.clear();
    }

    /// The slice of a level currently on screen.
    pub fn visible<'a>(&self, level: &'a ReferralLevel) -> &'a [UserView] {
        if self.is_expanded(level.level) {
            &level.descendants
        } else {
            &level.descendants[..level.descendants.len().min(MAX_PER_LEVEL)]
        }
    }

    pub fn has_toggle(level: &ReferralLevel) -> bool {
        level.descendants.len() > MAX_PER_LEVEL
    }

    pub fn toggle_label(&self, level: &ReferralLevel) -> String {
        if self.is_expanded(level.level) {
            "Show less".to_string()
        } else {
            format!("Show all ({})", level.descendants.len())
        }
    }
}

/// Pull the tree and its root user out of a user-detail response, looking
/// under the unwrapped envelope first and the raw body second.
pub fn extract_tree_and_user<'a>(body: &'a Value) -> (Option<&'a Value>, Option<&'a Value>) {
    let resolved = unwrap_envelope(body);
    let tree = first_truthy_path(resolved, TREE_PATHS).or_else(|| first_truthy_path(body, TREE_PATHS));
    let user = first_truthy(resolved, ROOT_USER)
        .or_else(|| first_truthy(body, ROOT_USER));
    (tree, user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn level_of(n: usize) -> Value {
        let users: Vec<Value> = (0..n).map(|i| json!({"id": format!("u{i}")})).collect();
        json!(users)
    }

    #[test]
    fn array_levels_number_by_position() {
        let tree = ReferralTree::from_raw(
            &json!({"levels": [{"descendants": level_of(2)}, {"users": level_of(3)}]}),
            Utc::now(),
        );
        assert_eq!(tree.levels[0].level, 1);
        assert_eq!(tree.levels[1].level, 2);
        assert_eq!(tree.total_referrals(), 5);
    }

    #[test]
    fn map_levels_sorted_by_number() {
        let tree = ReferralTree::from_raw(
            &json!({"levels": {
                "10": {"level": 10, "items": level_of(1)},
                "2": {"level": 2, "items": level_of(4)}
            }}),
            Utc::now(),
        );
        let numbers: Vec<u64> = tree.levels.iter().map(|l| l.level).collect();
        assert_eq!(numbers, vec![2, 10]);
    }

    #[test]
    fn map_keys_number_unlabelled_levels_numerically() {
        let mut levels = serde_json::Map::new();
        for n in 1..=12 {
            levels.insert(n.to_string(), json!({"users": [{"id": format!("L{n}")}]}));
        }
        let tree = ReferralTree::from_raw(&json!({ "levels": levels }), Utc::now());

        let seen: Vec<(u64, String)> = tree
            .levels
            .iter()
            .map(|l| (l.level, l.descendants[0].id.clone().unwrap_or_default()))
            .collect();
        let expected: Vec<(u64, String)> = (1..=12).map(|n| (n, format!("L{n}"))).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn nodes_unwrap_user_or_referral() {
        let tree = ReferralTree::from_raw(
            &json!({"levels": [{"descendants": [
                {"user": {"id": "a", "name": "Asha"}},
                {"referral": {"id": "b"}},
                {"id": "c"}
            ]}]}),
            Utc::now(),
        );
        let ids: Vec<_> = tree.levels[0]
            .descendants
            .iter()
            .map(|u| u.id.clone().unwrap_or_default())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn missing_levels_is_empty() {
        assert!(ReferralTree::from_raw(&json!({}), Utc::now()).is_empty());
        assert!(ReferralTree::from_raw(&json!({"levels": "x"}), Utc::now()).is_empty());
    }

    #[test]
    fn capped_levels_toggle_independently() {
        let tree = ReferralTree::from_raw(
            &json!({"levels": [{"descendants": level_of(20)}, {"descendants": level_of(12)}]}),
            Utc::now(),
        );
        let (first, second) = (&tree.levels[0], &tree.levels[1]);
        let mut expansion = LevelExpansion::default();

        assert_eq!(expansion.visible(first).len(), 8);
        assert_eq!(expansion.toggle_label(first), "Show all (20)");
        expansion.toggle(first.level);
        assert_eq!(expansion.visible(first).len(), 20);
        assert_eq!(expansion.toggle_label(first), "Show less");
        assert_eq!(expansion.visible(second).len(), 8);

        expansion.toggle(first.level);
        assert_eq!(expansion.visible(first).len(), 8);
    }

    #[test]
    fn small_levels_have_no_toggle() {
        let tree = ReferralTree::from_raw(&json!({"levels": [{"descendants": level_of(8)}]}), Utc::now());
        assert!(!LevelExpansion::has_toggle(&tree.levels[0]));
    }

    #[test]
    fn tree_and_user_from_envelope_or_body() {
        let body = json!({"data": {"user": {"id": "root", "referralTree": {"levels": []}}}});
        let (tree, user) = extract_tree_and_user(&body);
        assert_eq!(tree, Some(&json!({"levels": []})));
        assert_eq!(user.and_then(|u| u.get("id")), Some(&json!("root")));

        let body = json!({"data": {"stats": 1}, "item": {"id": "x"}, "referralTree": {"levels": [1]}});
        let (tree, user) = extract_tree_and_user(&body);
        assert!(tree.is_some());
        assert_eq!(user.and_then(|u| u.get("id")), Some(&json!("x")));

        assert_eq!(extract_tree_and_user(&json!({})), (None, None));
    }
}
