use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::payloads::{GetUpdatesSetters, SendPhotoSetters};
use teloxide::prelude::*;
use teloxide::types::{InputFile, UpdateKind};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::platform::{InboundUpdate, IncomingMessage, OutboundReply, ReplySink};

/// Telegram rejects text messages longer than 4096 characters.
const MAX_MESSAGE_LEN: usize = 4000;
const POLL_ERROR_PAUSE: Duration = Duration::from_secs(5);

/// Split long messages for Telegram's 4096 char limit
fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + max_len).min(text.len());
        // Walk back to a valid UTF-8 char boundary so slicing doesn't panic
        while end > start && !text.is_char_boundary(end) {
            end -= 1;
        }
        let actual_end = if end < text.len() {
            text[start..end]
                .rfind('\n')
                .or_else(|| text[start..end].rfind(' '))
                .map(|pos| start + pos + 1)
                .unwrap_or(end)
        } else {
            end
        };

        chunks.push(text[start..actual_end].to_string());
        start = actual_end;
    }

    chunks
}

/// Create the bot and check the token against the API.
pub async fn connect(token: &str) -> Result<Bot> {
    let bot = Bot::new(token);
    let me = bot
        .get_me()
        .await
        .context("Telegram rejected the bot token")?;
    info!("Authorized on Telegram as @{}", me.username());
    Ok(bot)
}

fn to_inbound(update: Update) -> InboundUpdate {
    let message = match update.kind {
        UpdateKind::Message(msg) => msg.text().map(|text| IncomingMessage {
            text: text.to_string(),
            chat_id: msg.chat.id.0,
            sender_first_name: msg
                .from
                .as_ref()
                .map(|user| user.first_name.clone())
                .unwrap_or_default(),
        }),
        _ => None,
    };

    InboundUpdate {
        id: update.id.0,
        message,
    }
}

/// Long-poll Telegram and forward every update into a channel.
///
/// The feed ends when the receiver is dropped or the returned task is aborted;
/// aborting drops the sender, which closes the channel for the consumer.
pub fn spawn_feed(
    bot: Bot,
    poll_timeout_secs: u32,
    capacity: usize,
) -> (JoinHandle<()>, mpsc::Receiver<InboundUpdate>) {
    let (tx, rx) = mpsc::channel(capacity);

    let handle = tokio::spawn(async move {
        let mut offset: i32 = 0;
        loop {
            let updates = match bot
                .get_updates()
                .offset(offset)
                .timeout(poll_timeout_secs)
                .await
            {
                Ok(updates) => updates,
                Err(e) => {
                    error!("Failed to fetch updates: {}", e);
                    tokio::time::sleep(POLL_ERROR_PAUSE).await;
                    continue;
                }
            };

            for update in updates {
                offset = update.id.as_offset();
                if tx.send(to_inbound(update)).await.is_err() {
                    debug!("Update consumer is gone, stopping feed");
                    return;
                }
            }
        }
    });

    (handle, rx)
}

/// Sends replies through the Bot API.
pub struct TelegramSink {
    bot: Bot,
}

impl TelegramSink {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ReplySink for TelegramSink {
    async fn send(&self, reply: OutboundReply) -> Result<()> {
        match reply {
            OutboundReply::Text { chat_id, text } => {
                for chunk in split_message(&text, MAX_MESSAGE_LEN) {
                    self.bot
                        .send_message(ChatId(chat_id), chunk)
                        .await
                        .with_context(|| format!("Failed to send message to chat {}", chat_id))?;
                }
            }
            OutboundReply::Photo {
                chat_id,
                url,
                caption,
            } => {
                let url: reqwest::Url = url
                    .parse()
                    .with_context(|| format!("Invalid image URL: {}", url))?;
                self.bot
                    .send_photo(ChatId(chat_id), InputFile::url(url))
                    .caption(caption)
                    .await
                    .with_context(|| format!("Failed to send photo to chat {}", chat_id))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_short_message() {
        assert_eq!(split_message("hello", 10), vec!["hello".to_string()]);
    }

    #[test]
    fn test_split_prefers_newlines() {
        let chunks = split_message("first line\nsecond line", 15);
        assert_eq!(chunks, vec!["first line\n", "second line"]);
    }

    #[test]
    fn test_split_respects_char_boundaries() {
        let text = "пара ".repeat(50);
        let chunks = split_message(&text, 33);
        assert!(chunks.len() > 1);
        assert_eq!(chunks.concat(), text);
        assert!(chunks.iter().all(|c| c.len() <= 33));
    }

    fn parse_update(json: serde_json::Value) -> Update {
        // teloxide's update deserializer expects a textual source, not a `Value`.
        serde_json::from_str(&json.to_string()).unwrap()
    }

    #[test]
    fn test_text_message_becomes_inbound() {
        let update = parse_update(serde_json::json!({
            "update_id": 42,
            "message": {
                "message_id": 5,
                "date": 1768453200,
                "chat": {"id": -100123, "type": "group", "title": "Группа"},
                "from": {"id": 7, "is_bot": false, "first_name": "Вера"},
                "text": "/today@student_verochka_bot"
            }
        }));

        let inbound = to_inbound(update);
        assert_eq!(inbound.id, 42);
        assert_eq!(
            inbound.message,
            Some(IncomingMessage {
                text: "/today@student_verochka_bot".to_string(),
                chat_id: -100123,
                sender_first_name: "Вера".to_string(),
            })
        );
    }

    #[test]
    fn test_message_without_text_has_no_message() {
        let update = parse_update(serde_json::json!({
            "update_id": 44,
            "message": {
                "message_id": 6,
                "date": 1768453200,
                "chat": {"id": -100123, "type": "group", "title": "Группа"},
                "from": {"id": 7, "is_bot": false, "first_name": "Вера"},
                "photo": [{
                    "file_id": "AgACAgIAAxkBAAIB",
                    "file_unique_id": "AQADAgAT",
                    "width": 90,
                    "height": 67,
                    "file_size": 1204
                }]
            }
        }));

        let inbound = to_inbound(update);
        assert_eq!(inbound.id, 44);
        assert!(inbound.message.is_none());
    }

    #[test]
    fn test_edited_message_has_no_message() {
        let update = parse_update(serde_json::json!({
            "update_id": 45,
            "edited_message": {
                "message_id": 5,
                "date": 1768453200,
                "edit_date": 1768453260,
                "chat": {"id": -100123, "type": "group", "title": "Группа"},
                "from": {"id": 7, "is_bot": false, "first_name": "Вера"},
                "text": "/today"
            }
        }));

        let inbound = to_inbound(update);
        assert_eq!(inbound.id, 45);
        assert!(inbound.message.is_none());
    }

    #[test]
    fn test_unknown_update_has_no_message() {
        let update = parse_update(serde_json::json!({
            "update_id": 43,
            "some_future_kind": {"foo": "bar"}
        }));

        let inbound = to_inbound(update);
        assert_eq!(inbound.id, 43);
        assert!(inbound.message.is_none());
    }
}
