use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// One rendered exchange; either side may be missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Turn<'a> {
    pub user: Option<&'a str>,
    pub bot: Option<&'a str>,
}

/// Session conversation held as two parallel lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationHistory {
    session_id: Uuid,
    /// User utterances, oldest first
    past: Vec<String>,
    /// Bot replies, oldest first
    generated: Vec<String>,
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            past: Vec::new(),
            generated: Vec::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Append a completed exchange
    pub fn push(&mut self, user: impl Into<String>, bot: impl Into<String>) {
        self.past.push(user.into());
        self.generated.push(bot.into());
    }

    pub fn past(&self) -> &[String] {
        &self.past
    }

    pub fn generated(&self) -> &[String] {
        &self.generated
    }

    /// Number of rendered turns (the longer of the two lists)
    pub fn len(&self) -> usize {
        self.past.len().max(self.generated.len())
    }

    pub fn is_empty(&self) -> bool {
        self.past.is_empty() && self.generated.is_empty()
    }

    pub fn last(&self) -> Option<Turn<'_>> {
        self.turns().last()
    }

    /// Zip both lists, longest wins
    pub fn turns(&self) -> impl DoubleEndedIterator<Item = Turn<'_>> + '_ {
        (0..self.len()).map(move |i| Turn {
            user: self.past.get(i).map(String::as_str),
            bot: self.generated.get(i).map(String::as_str),
        })
    }

    /// Empty both lists and start a fresh session
    pub fn clear(&mut self) {
        info!(
            "Clearing {} turns from session {}",
            self.len(),
            self.session_id
        );
        self.past.clear();
        self.generated.clear();
        self.session_id = Uuid::new_v4();
    }
}
