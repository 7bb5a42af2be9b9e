//! Chat messaging abstraction.
//!
//! The engine only ever sends a message or edits a message it sent earlier,
//! optionally with an inline keyboard. Real chat platforms plug in behind the
//! [`Messenger`] trait; [`MemoryMessenger`] records traffic for tests and dry
//! runs and [`ConsoleMessenger`] prints it.

pub mod console;
pub mod memory;

pub use console::ConsoleMessenger;
pub use memory::{MemoryMessenger, SentMessage};

use crate::error::DeliveryError;
use crate::game::{ChatId, MessageId};

/// Result type alias for messaging operations.
pub type Result<T> = std::result::Result<T, DeliveryError>;

/// A button of an inline keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    /// Visible label
    pub text: String,
    /// Payload delivered back when pressed
    pub callback: String,
}

impl Button {
    /// Creates a button.
    #[must_use]
    pub fn new(text: impl Into<String>, callback: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback: callback.into(),
        }
    }
}

/// Rows of buttons attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    /// Button rows, top to bottom
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    /// Maximum buttons per row when laying out a grid.
    pub const ROW_WIDTH: usize = 8;

    /// Lays buttons out in rows of [`Self::ROW_WIDTH`].
    #[must_use]
    pub fn grid(buttons: Vec<Button>) -> Self {
        let rows = buttons
            .chunks(Self::ROW_WIDTH)
            .map(<[Button]>::to_vec)
            .collect();
        Self { rows }
    }

    /// Appends a full-width row with a single button.
    #[must_use]
    pub fn with_row(mut self, button: Button) -> Self {
        self.rows.push(vec![button]);
        self
    }

    /// Iterates all buttons row by row.
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }
}

/// Async chat client used by stage actions.
#[async_trait::async_trait]
pub trait Messenger: Send + Sync {
    /// Sends a new message and returns its identifier.
    async fn send(&self, chat: ChatId, text: &str, keyboard: Option<&Keyboard>)
    -> Result<MessageId>;

    /// Replaces the text (and keyboard) of an earlier message.
    async fn edit(
        &self,
        chat: ChatId,
        message_id: MessageId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<()>;
}
