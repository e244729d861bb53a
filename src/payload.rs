use std::fmt;

use serde_json::Value;
use teloxide::types::ParseMode;
use teloxide::utils::markdown;

/// Action the Mini App sends whenever its counter changes.
pub const COUNTER_UPDATE_ACTION: &str = "counter_update";

const UNKNOWN_TIME: &str = "未知时间";

/// Characters of JSON kept in a code block; Telegram rejects texts over 4096.
const MAX_BLOCK_CHARS: usize = 3800;

/// JSON document submitted by the Mini App through `Telegram.WebApp.sendData`.
#[derive(Debug, Clone, PartialEq)]
pub struct WebAppPayload(Value);

/// Reply chosen for a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadReply {
    CounterUpdate { value: String, timestamp: String },
    Echo { pretty: String },
}

impl WebAppPayload {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw).map(Self)
    }

    pub fn action(&self) -> Option<&str> {
        self.0.get("action").and_then(Value::as_str)
    }

    /// Pretty-printed with two-space indent, non-ASCII left as is.
    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }

    pub fn reply(&self) -> PayloadReply {
        if self.action() == Some(COUNTER_UPDATE_ACTION) {
            let value = self
                .field("value")
                .map(display_value)
                .unwrap_or_else(|| "0".to_string());
            let timestamp = self
                .field("timestamp")
                .map(display_value)
                .unwrap_or_else(|| UNKNOWN_TIME.to_string());
            PayloadReply::CounterUpdate { value, timestamp }
        } else {
            PayloadReply::Echo {
                pretty: self.pretty(),
            }
        }
    }

    /// Explicit `null` counts as absent, so the display defaults apply.
    fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }
}

impl fmt::Display for WebAppPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl PayloadReply {
    pub fn text(&self) -> String {
        match self {
            PayloadReply::CounterUpdate { value, timestamp } => {
                format!("📊 收到计数器更新！\n\n当前值: {value}\n时间: {timestamp}")
            }
            PayloadReply::Echo { pretty } => json_block("📨 收到数据：", pretty),
        }
    }

    pub fn parse_mode(&self) -> Option<ParseMode> {
        match self {
            PayloadReply::CounterUpdate { .. } => None,
            PayloadReply::Echo { .. } => Some(ParseMode::MarkdownV2),
        }
    }
}

/// MarkdownV2 message: escaped header line followed by a `json` code block.
/// Oversized JSON is cut and marked with `…`.
pub fn json_block(header: &str, pretty: &str) -> String {
    let body = truncate_chars(pretty, MAX_BLOCK_CHARS);
    format!(
        "{}\n{}",
        markdown::escape(header),
        markdown::code_block_with_lang(&body, "json")
    )
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => format!("{}\n…", &text[..end]),
        None => text.to_string(),
    }
}
