use std::path::PathBuf;

use anyhow::Result;
use tokio::task::JoinHandle;

use crate::groq::GroqClient;
use crate::qalog;
use crate::session::{Role, Session, Turn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Question input state
    pub input: String,
    pub input_cursor: usize, // cursor position in input, in chars

    // Conversation (per-session, explicit lifecycle)
    pub session: Session,

    // In-flight request state; at most one task is live at a time. The
    // question is parked here and only enters the session once the
    // exchange succeeds.
    pub loading: bool,
    pub pending_question: Option<String>,
    pub query_task: Option<JoinHandle<Result<String>>>,

    // Display slot for the last failed turn; never stored in the session
    pub last_error: Option<String>,

    // Transcript scroll state
    pub transcript_scroll: u16,
    pub transcript_height: u16, // Height of chat area for scroll calculations
    pub transcript_width: u16,  // Width of chat area for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Help/about side panel
    pub show_help: bool,

    // Where the resolved key came from, for the help panel
    pub key_source: &'static str,

    pub client: GroqClient,
    pub log_dir: PathBuf,
}

impl App {
    pub fn new(client: GroqClient, key_source: &'static str) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,

            input: String::new(),
            input_cursor: 0,

            session: Session::new(),

            loading: false,
            pending_question: None,
            query_task: None,

            last_error: None,

            transcript_scroll: 0,
            transcript_height: 0,
            transcript_width: 0,

            animation_frame: 0,

            show_help: true,

            key_source,
            client,
            log_dir: PathBuf::from(qalog::LOG_DIR),
        }
    }

    /// Submit the typed question and spawn the gateway call with the full
    /// conversation plus the new user turn. The question is held in a
    /// pending slot until the exchange succeeds, so a failed turn never
    /// reaches the session. Refused while a request is outstanding or when
    /// the input is empty.
    pub fn submit_question(&mut self) {
        if self.input.trim().is_empty() || self.query_task.is_some() {
            return;
        }

        let question = std::mem::take(&mut self.input);
        self.input_cursor = 0;

        let client = self.client.clone();
        let mut turns = self.session.turns().to_vec();
        turns.push(Turn {
            role: Role::User,
            content: question.clone(),
        });

        self.pending_question = Some(question);
        self.loading = true;
        self.last_error = None;

        self.query_task = Some(tokio::spawn(async move { client.complete(&turns).await }));

        self.scroll_to_bottom();
    }

    /// Handle the outcome of the gateway call. On success the user and
    /// assistant turns are appended together and the exchange is logged
    /// best-effort; on failure the session is left exactly as it was before
    /// the turn and the error is displayed in its place.
    pub fn finish_request(&mut self, result: Result<String>) {
        self.loading = false;

        match result {
            Ok(answer) => {
                if let Some(question) = self.pending_question.take() {
                    self.session.push(Role::User, question.clone());
                    self.session.push(Role::Assistant, answer.clone());
                    // Logging is a side-channel; a failed write is dropped here.
                    let _ = qalog::append(&self.log_dir, &question, &answer);
                }
                self.last_error = None;
            }
            Err(e) => {
                // The pending question stays visible next to the error until
                // the next submission or clear.
                self.last_error = Some(format!(
                    "Error: {}\n\nPlease check your API key and internet connection.",
                    e
                ));
            }
        }

        self.scroll_to_bottom();
    }

    /// Clear the transcript. Refused while a request is outstanding so the
    /// response cannot land in a reset conversation.
    pub fn clear_conversation(&mut self) {
        if self.query_task.is_some() {
            return;
        }
        self.session.clear();
        self.pending_question = None;
        self.last_error = None;
        self.transcript_scroll = 0;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self) {
        self.transcript_scroll = self.transcript_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.transcript_scroll = self.transcript_scroll.saturating_add(1);
    }

    pub fn scroll_to_top(&mut self) {
        self.transcript_scroll = 0;
    }

    /// Scroll the transcript so the latest turn (or the thinking indicator)
    /// is visible.
    pub fn scroll_to_bottom(&mut self) {
        let wrap_width = if self.transcript_width > 0 {
            self.transcript_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;
        for turn in self.session.turns() {
            total_lines += 1; // Role line ("You:" or "AI:")
            total_lines += wrapped_line_count(&turn.content, wrap_width);
            total_lines += 1; // Blank line after turn
        }

        if let Some(question) = &self.pending_question {
            total_lines += 1; // "You:" label
            total_lines += wrapped_line_count(question, wrap_width);
            total_lines += 1;
        }

        if let Some(error) = &self.last_error {
            total_lines += wrapped_line_count(error, wrap_width);
            total_lines += 1;
        }

        if self.loading {
            total_lines += 2; // "AI:" + "Thinking..."
        }

        let visible_height = if self.transcript_height > 0 {
            self.transcript_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.transcript_scroll = total_lines.saturating_sub(visible_height);
        } else {
            self.transcript_scroll = 0;
        }
    }
}

fn wrapped_line_count(text: &str, wrap_width: usize) -> u16 {
    let mut lines: u16 = 0;
    for line in text.lines() {
        // Use character count, not byte length, for proper UTF-8 handling
        let char_count = line.chars().count();
        if char_count == 0 {
            lines += 1;
        } else {
            lines += ((char_count / wrap_width) + 1) as u16;
        }
    }
    lines.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn test_app() -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let client = GroqClient::new("gsk_test_key").unwrap();
        let mut app = App::new(client, "env");
        app.log_dir = dir.path().to_path_buf();
        (app, dir)
    }

    #[test]
    fn failed_request_leaves_session_unchanged() {
        let (mut app, _dir) = test_app();
        app.session.push(Role::User, "earlier question");
        app.session.push(Role::Assistant, "earlier answer");
        app.pending_question = Some("What is bioinformatics?".to_string());
        let len_before = app.session.len();

        app.finish_request(Err(anyhow!("connection refused")));

        assert_eq!(app.session.len(), len_before);
        assert!(app.last_error.as_deref().unwrap().contains("Error"));
        // The failed question stays displayed next to the error
        assert_eq!(app.pending_question.as_deref(), Some("What is bioinformatics?"));
    }

    #[test]
    fn successful_request_appends_both_turns_and_logs() {
        let (mut app, _dir) = test_app();
        app.pending_question = Some("What is bioinformatics?".to_string());

        app.finish_request(Ok("Bioinformatics is...".to_string()));

        assert_eq!(app.session.len(), 2);
        assert_eq!(app.session.turns()[0].role, Role::User);
        assert_eq!(app.session.turns()[0].content, "What is bioinformatics?");
        assert_eq!(app.session.turns()[1].role, Role::Assistant);
        assert_eq!(app.session.turns()[1].content, "Bioinformatics is...");
        assert!(app.last_error.is_none());
        assert!(app.pending_question.is_none());

        let log = std::fs::read_to_string(app.log_dir.join(qalog::LOG_FILE)).unwrap();
        assert!(log.contains("Question: What is bioinformatics?"));
        assert!(log.contains("Answer: Bioinformatics is..."));
    }

    #[test]
    fn failed_exchange_never_breaks_alternation() {
        let (mut app, _dir) = test_app();

        app.pending_question = Some("first question".to_string());
        app.finish_request(Err(anyhow!("timeout")));
        assert!(app.session.is_empty());

        app.pending_question = Some("second question".to_string());
        app.finish_request(Ok("second answer".to_string()));

        assert_eq!(app.session.len(), 2 * app.session.exchanges());
        assert_eq!(app.session.turns()[0].content, "second question");
        assert!(app.last_error.is_none());
    }

    #[tokio::test]
    async fn submit_is_refused_while_request_outstanding() {
        let (mut app, _dir) = test_app();
        app.input = "first".to_string();
        app.submit_question();
        assert!(app.query_task.is_some());
        assert_eq!(app.pending_question.as_deref(), Some("first"));

        app.input = "second".to_string();
        app.submit_question();

        // The second submission was refused.
        assert_eq!(app.pending_question.as_deref(), Some("first"));
        assert_eq!(app.input, "second");

        app.query_task.take().unwrap().abort();
    }

    #[tokio::test]
    async fn submit_ignores_blank_input() {
        let (mut app, _dir) = test_app();
        app.input = "   ".to_string();
        app.submit_question();

        assert!(app.query_task.is_none());
        assert!(app.session.is_empty());
    }

    #[test]
    fn clear_empties_transcript_and_error() {
        let (mut app, _dir) = test_app();
        for _ in 0..3 {
            app.session.push(Role::User, "q");
            app.session.push(Role::Assistant, "a");
        }
        app.last_error = Some("Error: boom".to_string());

        app.clear_conversation();

        assert!(app.session.is_empty());
        assert!(app.last_error.is_none());
    }

    #[tokio::test]
    async fn clear_is_refused_while_request_outstanding() {
        let (mut app, _dir) = test_app();
        app.session.push(Role::User, "q");
        app.session.push(Role::Assistant, "a");
        app.input = "question".to_string();
        app.submit_question();

        app.clear_conversation();
        assert_eq!(app.session.len(), 2);
        assert_eq!(app.pending_question.as_deref(), Some("question"));

        app.query_task.take().unwrap().abort();
    }
}
