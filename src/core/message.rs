use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    pub fn as_str(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        }
    }

    pub fn is_user(self) -> bool {
        self == Sender::User
    }

    pub fn is_assistant(self) -> bool {
        self == Sender::Assistant
    }
}

impl AsRef<str> for Sender {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for Sender {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Sender::User),
            "assistant" => Ok(Sender::Assistant),
            _ => Err(format!("invalid sender: {value}")),
        }
    }
}

impl TryFrom<String> for Sender {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Sender> for String {
    fn from(value: Sender) -> Self {
        value.as_str().to_string()
    }
}

/// Position of a turn in its conversation. Ids are handed out in insertion
/// order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TurnId(pub(crate) u64);

impl TurnId {
    pub fn position(self) -> u64 {
        self.0
    }
}

/// One message in the transcript.
///
/// User turns are complete from the moment they are created. Assistant turns
/// start empty and grow while their reveal runs; `reveal_progress` counts the
/// grapheme clusters currently exposed in `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub id: TurnId,
    pub sender: Sender,
    pub text: String,
    pub reveal_progress: usize,
    pub complete: bool,
    /// Set when the reveal feeding this turn was cancelled. The turn keeps its
    /// partial text and never becomes complete.
    #[serde(default)]
    pub interrupted: bool,
}

impl Turn {
    pub(crate) fn user(id: TurnId, text: impl Into<String>) -> Self {
        let text = text.into();
        let reveal_progress = crate::core::reveal::grapheme_len(&text);
        Self {
            id,
            sender: Sender::User,
            text,
            reveal_progress,
            complete: true,
            interrupted: false,
        }
    }

    pub(crate) fn pending_assistant(id: TurnId) -> Self {
        Self {
            id,
            sender: Sender::Assistant,
            text: String::new(),
            reveal_progress: 0,
            complete: false,
            interrupted: false,
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender.is_user()
    }

    pub fn is_assistant(&self) -> bool {
        self.sender.is_assistant()
    }

    /// True while a reveal is still writing into this turn.
    pub fn is_revealing(&self) -> bool {
        self.is_assistant() && !self.complete && !self.interrupted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_turns_are_created_complete() {
        let turn = Turn::user(TurnId(0), "héllo");
        assert!(turn.complete);
        assert!(!turn.is_revealing());
        assert_eq!(turn.reveal_progress, 5);
    }

    #[test]
    fn pending_assistant_turn_is_revealing() {
        let turn = Turn::pending_assistant(TurnId(3));
        assert!(turn.is_revealing());
        assert_eq!(turn.text, "");
        assert_eq!(turn.id.position(), 3);
    }

    #[test]
    fn invalid_sender_strings_are_rejected() {
        assert!(Sender::try_from("bot").is_err());
        assert_eq!(Sender::try_from("assistant"), Ok(Sender::Assistant));
    }
}
