//! Fixed reply texts and the Mini App keyboard.

use reqwest::Url;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, WebAppInfo};

use crate::payload::json_block;
use crate::state::Received;

/// Callback data that re-renders the open-app prompt.
pub const OPEN_APP_CALLBACK: &str = "open_app";

pub const OPEN_APP_BUTTON: &str = "🚀 打开 Mini App";

pub const HELP_TEXT: &str = "可用命令：\n\
                             /start - 开始使用\n\
                             /help - 显示帮助\n\
                             /app - 打开 Mini App\n\
                             /data - 查看最近接收的数据";

pub const OPEN_APP_TEXT: &str = "点击按钮打开 Mini App：";

pub const APOLOGY_TEXT: &str = "抱歉，发生了错误。请稍后重试。";

pub const NO_DATA_TEXT: &str = "还没有收到任何数据。";

pub fn start_text(first_name: Option<&str>) -> String {
    let greeting = match first_name {
        Some(name) if !name.trim().is_empty() => format!("你好 {name}! 👋"),
        _ => "你好! 👋".to_string(),
    };
    format!(
        "{greeting}\n\n\
         这是一个 Telegram Mini App 示例 Bot。\n\
         点击下方按钮打开 Mini App："
    )
}

/// One row, one button that opens the Mini App inside the chat client.
pub fn open_app_keyboard(url: &Url) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::web_app(
        OPEN_APP_BUTTON,
        WebAppInfo { url: url.clone() },
    )]])
}

/// MarkdownV2 body for `/data`.
pub fn recent_data_text(received: &Received) -> String {
    let header = format!(
        "🗂 最近接收的数据（{}）：",
        received.received_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    json_block(&header, &received.payload.pretty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::WebAppPayload;
    use chrono::{TimeZone, Utc};
    use teloxide::types::InlineKeyboardButtonKind;

    #[test]
    fn test_start_text_names_user() {
        let text = start_text(Some("Alice"));
        assert!(text.starts_with("你好 Alice! 👋\n\n"));
        assert!(text.ends_with("点击下方按钮打开 Mini App："));
    }

    #[test]
    fn test_start_text_without_sender() {
        assert!(start_text(None).starts_with("你好! 👋"));
        assert!(start_text(Some("  ")).starts_with("你好! 👋"));
    }

    #[test]
    fn test_help_lists_commands() {
        for cmd in ["/start", "/help", "/app", "/data"] {
            assert!(HELP_TEXT.contains(cmd), "missing {cmd}");
        }
        assert_eq!(HELP_TEXT.lines().count(), 5);
    }

    #[test]
    fn test_keyboard_single_web_app_button() {
        let url = Url::parse("https://miniapp.example.com/").unwrap();
        let markup = open_app_keyboard(&url);
        assert_eq!(markup.inline_keyboard.len(), 1);
        assert_eq!(markup.inline_keyboard[0].len(), 1);

        let button = &markup.inline_keyboard[0][0];
        assert_eq!(button.text, OPEN_APP_BUTTON);
        match &button.kind {
            InlineKeyboardButtonKind::WebApp(info) => assert_eq!(info.url, url),
            other => panic!("unexpected button kind: {other:?}"),
        }
    }

    #[test]
    fn test_recent_data_text() {
        let received = Received {
            payload: WebAppPayload::parse(r#"{"action":"ping"}"#).unwrap(),
            received_at: Utc.with_ymd_and_hms(2026, 10, 15, 8, 30, 0).unwrap(),
        };
        let text = recent_data_text(&received);
        assert!(text.starts_with("🗂 最近接收的数据（2026\\-10\\-15 08:30:00 UTC）："));
        assert!(text.contains("```json\n{\n  \"action\": \"ping\"\n}\n```"));
    }
}
