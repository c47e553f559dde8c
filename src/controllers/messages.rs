use serde_json::{json, Value};

use crate::error::ApiError;
use crate::types::{Outcome, Request};

use super::Outbox;

pub const DAILY_TIP_REQUIRED: &str = "Please enter a daily tip message.";
pub const TRADE_FIELDS_REQUIRED: &str = "Add message text or fill in buy, target, and stoploss.";
pub const SENT: &str = "Message sent successfully.";
const SEND_FAILED: &str = "Unable to send message. Try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageCategory {
    #[default]
    Stocks,
    Options,
    Future,
    Commodity,
}

impl MessageCategory {
    pub const ALL: [MessageCategory; 4] = [
        MessageCategory::Stocks,
        MessageCategory::Options,
        MessageCategory::Future,
        MessageCategory::Commodity,
    ];

    /// Path segment for `/api/advice-v2/:category`.
    pub fn api_value(&self) -> &'static str {
        match self {
            MessageCategory::Stocks => "stocks",
            MessageCategory::Options => "options",
            MessageCategory::Future => "future",
            MessageCategory::Commodity => "commodity",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MessageCategory::Stocks => "Stocks",
            MessageCategory::Options => "Options",
            MessageCategory::Future => "Future",
            MessageCategory::Commodity => "Commodity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageType {
    #[default]
    Trade,
    Daily,
}

impl MessageType {
    pub fn label(&self) -> &'static str {
        match self {
            MessageType::Trade => "Trade",
            MessageType::Daily => "Daily tip",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageField {
    Buy,
    Target,
    Stoploss,
    Text,
}

impl MessageField {
    pub fn label(&self) -> &'static str {
        match self {
            MessageField::Buy => "Buy",
            MessageField::Target => "Target",
            MessageField::Stoploss => "Stoploss",
            MessageField::Text => "Message",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageForm {
    pub buy: String,
    pub target: String,
    pub stoploss: String,
    pub text: String,
}

impl MessageForm {
    pub fn field_mut(&mut self, field: MessageField) -> &mut String {
        match field {
            MessageField::Buy => &mut self.buy,
            MessageField::Target => &mut self.target,
            MessageField::Stoploss => &mut self.stoploss,
            MessageField::Text => &mut self.text,
        }
    }

    pub fn field(&self, field: MessageField) -> &str {
        match field {
            MessageField::Buy => &self.buy,
            MessageField::Target => &self.target,
            MessageField::Stoploss => &self.stoploss,
            MessageField::Text => &self.text,
        }
    }
}

/// Build the request body for the selected message type.
///
/// Daily tips need text. Trade calls prefer free text, else all three of
/// buy/target/stoploss.
pub fn build_payload(kind: MessageType, form: &MessageForm) -> Result<Value, &'static str> {
    let text = form.text.trim();
    match kind {
        MessageType::Daily if text.is_empty() => Err(DAILY_TIP_REQUIRED),
        MessageType::Daily => Ok(json!({"message": text})),
        MessageType::Trade if !text.is_empty() => Ok(json!({"text": text})),
        MessageType::Trade => {
            let (buy, target, stoploss) = (form.buy.trim(), form.target.trim(), form.stoploss.trim());
            if buy.is_empty() || target.is_empty() || stoploss.is_empty() {
                Err(TRADE_FIELDS_REQUIRED)
            } else {
                Ok(json!({"buy": buy, "target": target, "stoploss": stoploss}))
            }
        }
    }
}

/// Messages tab: compose and broadcast trade calls and daily tips.
#[derive(Debug, Default)]
pub struct MessagesController {
    pub form: MessageForm,
    category: MessageCategory,
    kind: MessageType,
    sending: Option<u64>,
    error: Option<String>,
    success: Option<String>,
}

impl MessagesController {
    pub fn category(&self) -> MessageCategory {
        self.category
    }

    pub fn kind(&self) -> MessageType {
        self.kind
    }

    pub fn is_sending(&self) -> bool {
        self.sending.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    /// Switching category clears the status line.
    pub fn set_category(&mut self, category: MessageCategory) {
        self.category = category;
        self.clear_status();
    }

    pub fn cycle_category(&mut self) {
        let all = MessageCategory::ALL;
        let idx = all.iter().position(|c| *c == self.category).unwrap_or(0);
        self.set_category(all[(idx + 1) % all.len()]);
    }

    pub fn set_kind(&mut self, kind: MessageType) {
        self.kind = kind;
        self.clear_status();
    }

    pub fn toggle_kind(&mut self) {
        self.set_kind(match self.kind {
            MessageType::Trade => MessageType::Daily,
            MessageType::Daily => MessageType::Trade,
        });
    }

    /// Fields the form shows for the current type.
    pub fn fields(&self) -> &'static [MessageField] {
        match self.kind {
            MessageType::Trade => &[MessageField::Buy, MessageField::Target, MessageField::Stoploss, MessageField::Text],
            MessageType::Daily => &[MessageField::Text],
        }
    }

    pub fn clear_status(&mut self) {
        self.error = None;
        self.success = None;
    }

    pub fn submit(&mut self, out: &mut Outbox) {
        if self.sending.is_some() {
            return;
        }
        self.clear_status();
        let payload = match build_payload(self.kind, &self.form) {
            Ok(p) => p,
            Err(msg) => {
                self.error = Some(msg.to_string());
                return;
            }
        };
        let request = match self.kind {
            MessageType::Daily => Request::SendDailyTip { payload },
            MessageType::Trade => Request::SendTradeMessage {
                category: self.category.api_value().to_string(),
                payload,
            },
        };
        self.sending = Some(out.send(request));
    }

    pub fn on_response(&mut self, seq: u64, result: Result<Outcome, ApiError>) {
        if self.sending != Some(seq) {
            return;
        }
        self.sending = None;
        match result {
            Ok(_) => {
                self.success = Some(SENT.to_string());
                self.form = MessageForm::default();
            }
            Err(e) => self.error = Some(super::error_text(&e, SEND_FAILED)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(buy: &str, target: &str, stoploss: &str, text: &str) -> MessageForm {
        MessageForm { buy: buy.into(), target: target.into(), stoploss: stoploss.into(), text: text.into() }
    }

    #[test]
    fn daily_tip_needs_text() {
        assert_eq!(build_payload(MessageType::Daily, &form("1", "2", "3", "  ")), Err(DAILY_TIP_REQUIRED));
        assert_eq!(
            build_payload(MessageType::Daily, &form("", "", "", " Buy the dip ")),
            Ok(json!({"message": "Buy the dip"}))
        );
    }

    #[test]
    fn trade_prefers_text_then_levels() {
        assert_eq!(
            build_payload(MessageType::Trade, &form("100", "120", "90", "NIFTY call")),
            Ok(json!({"text": "NIFTY call"}))
        );
        assert_eq!(
            build_payload(MessageType::Trade, &form(" 100 ", "120", "90", "")),
            Ok(json!({"buy": "100", "target": "120", "stoploss": "90"}))
        );
        assert_eq!(build_payload(MessageType::Trade, &form("100", "", "90", "")), Err(TRADE_FIELDS_REQUIRED));
    }

    #[test]
    fn success_resets_form() {
        let mut out = Outbox::default();
        let mut m = MessagesController::default();
        m.set_category(MessageCategory::Commodity);
        m.form.text = "Gold long".into();
        m.submit(&mut out);
        assert!(m.is_sending());
        let (seq, req) = out.drain().remove(0);
        assert_eq!(
            req,
            Request::SendTradeMessage { category: "commodity".into(), payload: json!({"text": "Gold long"}) }
        );
        m.on_response(seq, Ok(Outcome::Json(Value::Null)));
        assert_eq!(m.success(), Some(SENT));
        assert_eq!(m.form, MessageForm::default());
    }

    #[test]
    fn switching_type_clears_status() {
        let mut out = Outbox::default();
        let mut m = MessagesController::default();
        m.set_kind(MessageType::Daily);
        m.submit(&mut out);
        assert_eq!(m.error(), Some(DAILY_TIP_REQUIRED));
        m.toggle_kind();
        assert_eq!(m.error(), None);
        assert_eq!(m.fields().len(), 4);
    }
}
