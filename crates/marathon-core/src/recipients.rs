use serde::{Deserialize, Serialize};

/// A person who receives the weekly race notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    /// E.164 phone number, e.g. `"+821012345678"`. Also used as the chat id
    /// for chat-based channels.
    pub phone_number: String,
}
