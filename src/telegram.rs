//! Telegram client using teloxide.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{ChatAction, InputFile, MessageId, ReplyParameters};
use tracing::{info, warn};

use crate::respond::Responder;

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Show "typing…" in the chat while the completion request runs.
    pub async fn send_typing(&self, chat_id: i64) {
        if let Err(e) = self
            .bot
            .send_chat_action(ChatId(chat_id), ChatAction::Typing)
            .await
        {
            warn!("Failed to send typing action: {e}");
        }
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to_message_id: Option<i64>,
    ) -> Result<i64, String> {
        let mut request = self.bot.send_message(ChatId(chat_id), text);

        if let Some(msg_id) = reply_to_message_id {
            let reply_params = ReplyParameters::new(MessageId(msg_id as i32));
            request = request.reply_parameters(reply_params);
        }

        request.await.map(|msg| msg.id.0 as i64).map_err(|e| {
            let msg = format!("Failed to send: {e}");
            warn!("{}", msg);
            msg
        })
    }

    /// Send an on-disk file as a document.
    pub async fn send_document(
        &self,
        chat_id: i64,
        path: &Path,
        reply_to_message_id: Option<i64>,
    ) -> Result<i64, String> {
        info!("📎 Sending document '{}' to chat {}", path.display(), chat_id);

        let mut request = self
            .bot
            .send_document(ChatId(chat_id), InputFile::file(path));

        if let Some(msg_id) = reply_to_message_id {
            let reply_params = ReplyParameters::new(MessageId(msg_id as i32));
            request = request.reply_parameters(reply_params);
        }

        request.await.map(|msg| msg.id.0 as i64).map_err(|e| {
            let msg = format!("Failed to send document: {e}");
            warn!("{}", msg);
            msg
        })
    }
}

/// Reply surface bound to the message that triggered the request.
pub struct TelegramReply {
    pub client: Arc<TelegramClient>,
    pub chat_id: i64,
    pub reply_to_message_id: Option<i64>,
}

impl Responder for TelegramReply {
    async fn send(&self, text: &str, files: &[PathBuf]) -> Result<(), String> {
        if !text.is_empty() {
            self.client
                .send_message(self.chat_id, text, self.reply_to_message_id)
                .await?;
        }
        for path in files {
            self.client
                .send_document(self.chat_id, path, self.reply_to_message_id)
                .await?;
        }
        Ok(())
    }
}
