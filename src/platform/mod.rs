pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

/// One unit of inbound activity from the transport.
#[derive(Debug, Clone)]
pub struct InboundUpdate {
    pub id: u32,
    /// `None` for anything that is not a text message (edits, joins, stickers...)
    pub message: Option<IncomingMessage>,
}

/// A text message received from a chat
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    pub text: String,
    pub chat_id: i64,
    /// Display name of the sender
    pub sender_first_name: String,
}

/// A reply produced by the bot, addressed by chat.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundReply {
    Text {
        chat_id: i64,
        text: String,
    },
    Photo {
        chat_id: i64,
        url: String,
        caption: String,
    },
}

impl OutboundReply {
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self::Text {
            chat_id,
            text: text.into(),
        }
    }

    pub fn photo(chat_id: i64, url: impl Into<String>, caption: impl Into<String>) -> Self {
        Self::Photo {
            chat_id,
            url: url.into(),
            caption: caption.into(),
        }
    }
}

/// Delivers replies. Failures are reported but never retried by the caller.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send(&self, reply: OutboundReply) -> Result<()>;
}
