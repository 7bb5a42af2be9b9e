//! Messenger that prints chat traffic to stdout.
//!
//! Used by `nightwatch run` when no chat platform is attached. Each message
//! is one JSON line so the output can be piped into other tools.

use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use serde::Serialize;

use crate::error::DeliveryError;
use crate::game::{ChatId, MessageId};

use super::{Keyboard, Messenger, Result};

#[derive(Serialize)]
struct ConsoleLine<'a> {
    chat: ChatId,
    message_id: MessageId,
    edited: bool,
    text: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    buttons: Vec<Vec<&'a str>>,
}

/// Prints every send and edit as a JSON line on stdout.
#[derive(Debug, Default)]
pub struct ConsoleMessenger {
    next_id: AtomicI64,
    stdout: Mutex<()>,
}

impl ConsoleMessenger {
    /// Creates a console messenger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn print(&self, line: &ConsoleLine<'_>) -> Result<()> {
        let json =
            serde_json::to_string(line).map_err(|e| DeliveryError::Other(e.to_string()))?;
        let _guard = self
            .stdout
            .lock()
            .map_err(|_| DeliveryError::Other("stdout lock poisoned".into()))?;
        let mut out = std::io::stdout().lock();
        writeln!(out, "{json}").map_err(|e| DeliveryError::Other(e.to_string()))?;
        out.flush().map_err(|e| DeliveryError::Other(e.to_string()))
    }
}

fn labels(keyboard: Option<&Keyboard>) -> Vec<Vec<&str>> {
    keyboard.map_or_else(Vec::new, |k| {
        k.rows
            .iter()
            .map(|row| row.iter().map(|b| b.text.as_str()).collect())
            .collect()
    })
}

#[async_trait::async_trait]
impl Messenger for ConsoleMessenger {
    async fn send(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId> {
        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.print(&ConsoleLine {
            chat,
            message_id,
            edited: false,
            text,
            buttons: labels(keyboard),
        })?;
        Ok(message_id)
    }

    async fn edit(
        &self,
        chat: ChatId,
        message_id: MessageId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<()> {
        self.print(&ConsoleLine {
            chat,
            message_id,
            edited: true,
            text,
            buttons: labels(keyboard),
        })
    }
}
