// Chat transcript
// Ordered, append-only log of chat bubbles with a full clear

/// Who a bubble belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Speaker {
    /// Typed by the user
    User,
    /// Spoken by the hub, or a local notice
    Bot,
}

/// A single transcript entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    /// Bubble owner
    pub speaker: Speaker,
    /// Bubble text
    pub text: String,
}

impl ChatEntry {
    /// User bubble
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    /// Bot bubble
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Bot,
            text: text.into(),
        }
    }
}

/// Chat transcript shown in the chat view
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<ChatEntry>,
}

impl Transcript {
    /// Empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// Transcript seeded with one bot bubble
    pub fn seeded(greeting: &str) -> Self {
        let mut transcript = Self::new();
        transcript.push(ChatEntry::bot(greeting));
        transcript
    }

    /// Append an entry
    pub fn push(&mut self, entry: ChatEntry) {
        self.entries.push(entry);
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in display order
    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
