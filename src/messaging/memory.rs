//! In-memory messenger that records every message.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::error::DeliveryError;
use crate::game::{ChatId, MessageId};

use super::{Keyboard, Messenger, Result};

/// A recorded send or edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Target chat
    pub chat: ChatId,
    /// Id of the new or edited message
    pub message_id: MessageId,
    /// Whether this was an edit of an existing message
    pub edited: bool,
    /// Message text
    pub text: String,
    /// Attached keyboard
    pub keyboard: Option<Keyboard>,
}

/// Records messages instead of delivering them.
///
/// Failures can be queued with [`fail_next`](Self::fail_next); each queued
/// error is returned by the next send or edit, in order.
#[derive(Debug, Default)]
pub struct MemoryMessenger {
    log: Mutex<Vec<SentMessage>>,
    failures: Mutex<VecDeque<DeliveryError>>,
    next_id: AtomicI64,
}

impl MemoryMessenger {
    /// Creates an empty messenger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an error for the next delivery attempt.
    pub fn fail_next(&self, error: DeliveryError) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push_back(error);
        }
    }

    /// Returns everything delivered so far.
    #[must_use]
    pub fn sent(&self) -> Vec<SentMessage> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Returns the most recent delivery.
    #[must_use]
    pub fn last(&self) -> Option<SentMessage> {
        self.sent().pop()
    }

    fn take_failure(&self) -> Option<DeliveryError> {
        self.failures.lock().ok()?.pop_front()
    }

    fn record(&self, message: SentMessage) {
        if let Ok(mut log) = self.log.lock() {
            log.push(message);
        }
    }
}

#[async_trait::async_trait]
impl Messenger for MemoryMessenger {
    async fn send(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId> {
        if let Some(error) = self.take_failure() {
            return Err(error);
        }
        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.record(SentMessage {
            chat,
            message_id,
            edited: false,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(message_id)
    }

    async fn edit(
        &self,
        chat: ChatId,
        message_id: MessageId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<()> {
        if let Some(error) = self.take_failure() {
            return Err(error);
        }
        self.record(SentMessage {
            chat,
            message_id,
            edited: true,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_assigns_increasing_ids() {
        let messenger = MemoryMessenger::new();
        let a = messenger.send(1, "a", None).await.unwrap();
        let b = messenger.send(1, "b", None).await.unwrap();
        assert!(b > a);
        assert_eq!(messenger.sent().len(), 2);
    }

    #[tokio::test]
    async fn queued_failure_is_returned_once() {
        let messenger = MemoryMessenger::new();
        messenger.fail_next(DeliveryError::Unreachable("kicked".into()));

        let err = messenger.edit(1, 5, "x", None).await.unwrap_err();
        assert!(err.is_unreachable());
        assert!(messenger.sent().is_empty());

        messenger.edit(1, 5, "x", None).await.unwrap();
        let last = messenger.last().unwrap();
        assert!(last.edited);
        assert_eq!(last.message_id, 5);
    }
}
