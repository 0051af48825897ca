use serde::{Deserialize, Serialize};

/// The sender of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// A single turn in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Per-session conversation state.
///
/// Created empty at session start, mutated only by `push`, emptied by
/// `clear`. The turn order is significant: it is replayed verbatim to the
/// model and to the transcript renderer.
#[derive(Debug, Default)]
pub struct Session {
    turns: Vec<Turn>,
}

impl Session {
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Append a turn. Always succeeds; the renderer sees it on the next draw.
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push(Turn {
            role,
            content: content.into(),
        });
    }

    /// Reset the conversation to empty.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of completed user/assistant exchanges.
    pub fn exchanges(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| t.role == Role::Assistant)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(session: &mut Session, question: &str, answer: &str) {
        session.push(Role::User, question);
        session.push(Role::Assistant, answer);
    }

    #[test]
    fn successful_exchanges_alternate_strictly() {
        let mut session = Session::new();
        exchange(&mut session, "What is bioinformatics?", "Bioinformatics is...");
        exchange(&mut session, "Explain DNA sequencing", "DNA sequencing is...");
        exchange(&mut session, "How does CRISPR work?", "CRISPR works by...");

        assert_eq!(session.len(), 2 * session.exchanges());
        for (i, turn) in session.turns().iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(turn.role, expected);
        }
    }

    #[test]
    fn stores_content_verbatim() {
        let mut session = Session::new();
        exchange(&mut session, "What is bioinformatics?", "Bioinformatics is...");

        assert_eq!(session.turns()[0].content, "What is bioinformatics?");
        assert_eq!(session.turns()[1].content, "Bioinformatics is...");
    }

    #[test]
    fn clear_empties_any_length() {
        let mut session = Session::new();
        for _ in 0..3 {
            exchange(&mut session, "q", "a");
        }
        assert_eq!(session.len(), 6);

        session.clear();
        assert!(session.is_empty());
        assert_eq!(session.exchanges(), 0);
    }

    #[test]
    fn empty_session_counts() {
        let session = Session::new();
        assert!(session.is_empty());
        assert_eq!(session.len(), 0);
        assert_eq!(session.exchanges(), 0);
    }
}
