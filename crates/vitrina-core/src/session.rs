//! Chat session state shared by every front end
//!
//! A session owns the visible transcript and a queue of bot messages waiting
//! for their "typing" delay to elapse. Time is passed in by the caller, so
//! the session never sleeps or spawns anything itself.
//!
//! Ordering: pending messages are kept sorted by due time, and a new
//! submission is never scheduled ahead of replies that are already waiting.
//! Replies therefore reach the transcript in submission order, each primary
//! before its suggestion, even when the user types faster than the bot answers.

use std::collections::VecDeque;
use std::time::{Duration, Instant};
use crate::router::Router;
use crate::state::{ChatMessage, Reply, ReplyStage};

/// Anything that can answer a user message.
pub trait Responder {
    fn respond(&self, text: &str) -> Reply;
}

impl Responder for Router {
    fn respond(&self, text: &str) -> Reply {
        self.route(text)
    }
}

/// Delays used to simulate the bot typing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyTiming {
    /// From submission to the primary reply
    pub reply_delay: Duration,
    /// From the primary reply to the suggestion that follows it
    pub suggestion_delay: Duration,
}

impl Default for ReplyTiming {
    fn default() -> Self {
        Self {
            reply_delay: Duration::from_millis(500),
            suggestion_delay: Duration::from_millis(600),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Blank input; nothing was recorded and the responder was not called
    Ignored,
    /// The user message was recorded and `queued` bot messages were scheduled
    Accepted { queued: usize },
}

#[derive(Debug, Clone)]
struct PendingMessage {
    due: Instant,
    stage: ReplyStage,
    message: ChatMessage,
}

pub struct ChatSession<R = Router> {
    responder: R,
    timing: ReplyTiming,
    transcript: Vec<ChatMessage>,
    pending: VecDeque<PendingMessage>,
}

impl<R: Responder> ChatSession<R> {
    pub fn new(responder: R, timing: ReplyTiming) -> Self {
        Self {
            responder,
            timing,
            transcript: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    /// Record a user message and schedule the bot's answer.
    pub fn submit(&mut self, raw: &str, now: Instant) -> Submission {
        let text = raw.trim();
        if text.is_empty() {
            tracing::debug!("ignored blank submission");
            return Submission::Ignored;
        }

        self.transcript.push(ChatMessage::user(text));
        let reply = self.responder.respond(text);

        let floor = self.pending.back().map(|p| p.due);
        let mut due = now + self.timing.reply_delay;
        let mut queued = 0;

        for (stage, message) in reply.into_messages() {
            if stage == ReplyStage::Suggestion {
                due += self.timing.suggestion_delay;
            }
            if let Some(floor) = floor {
                due = due.max(floor);
            }
            self.pending.push_back(PendingMessage { due, stage, message });
            queued += 1;
        }

        tracing::debug!(queued, pending = self.pending.len(), "accepted submission");
        Submission::Accepted { queued }
    }

    /// Move every message whose delay has elapsed into the transcript.
    /// Returns how many were delivered.
    pub fn poll(&mut self, now: Instant) -> usize {
        let mut delivered = 0;
        while self.pending.front().is_some_and(|p| p.due <= now) {
            if let Some(pending) = self.pending.pop_front() {
                tracing::trace!(stage = ?pending.stage, "delivered bot message");
                self.transcript.push(pending.message);
                delivered += 1;
            }
        }
        delivered
    }

    /// Deliver everything still waiting, ignoring delays.
    pub fn flush(&mut self) -> usize {
        let delivered = self.pending.len();
        self.transcript
            .extend(self.pending.drain(..).map(|pending| pending.message));
        delivered
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn is_typing(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.pending.front().map(|p| p.due)
    }

    pub fn timing(&self) -> ReplyTiming {
        self.timing
    }

    pub fn responder(&self) -> &R {
        &self.responder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ChatRole;
    use std::cell::Cell;

    struct CountingResponder {
        calls: Cell<usize>,
        inner: Router,
    }

    impl CountingResponder {
        fn new() -> Self {
            Self {
                calls: Cell::new(0),
                inner: Router::builtin(),
            }
        }
    }

    impl Responder for CountingResponder {
        fn respond(&self, text: &str) -> Reply {
            self.calls.set(self.calls.get() + 1);
            self.inner.route(text)
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_blank_input_never_reaches_responder() {
        let mut session = ChatSession::new(CountingResponder::new(), ReplyTiming::default());
        let now = Instant::now();

        for blank in ["", "   ", "\t\n"] {
            assert_eq!(session.submit(blank, now), Submission::Ignored);
        }

        assert_eq!(session.responder().calls.get(), 0);
        assert!(session.transcript().is_empty());
        assert!(!session.is_typing());
    }

    #[test]
    fn test_user_message_is_immediate_and_trimmed() {
        let mut session = ChatSession::new(Router::builtin(), ReplyTiming::default());
        let now = Instant::now();

        assert_eq!(session.submit("  hola  ", now), Submission::Accepted { queued: 1 });
        assert_eq!(session.transcript(), &[ChatMessage::user("hola")]);
        assert!(session.is_typing());
        assert_eq!(session.next_due(), Some(now + ms(500)));
    }

    #[test]
    fn test_product_reply_is_staggered() {
        let mut session = ChatSession::new(Router::builtin(), ReplyTiming::default());
        let now = Instant::now();

        assert_eq!(session.submit("002", now), Submission::Accepted { queued: 2 });

        assert_eq!(session.poll(now + ms(499)), 0);
        assert_eq!(session.poll(now + ms(500)), 1);
        assert!(session.transcript()[1].content.starts_with("**Zapatillas deportivas**"));

        assert_eq!(session.poll(now + ms(1099)), 0);
        assert_eq!(session.poll(now + ms(1100)), 1);
        assert!(session.transcript()[2].content.starts_with("¿Deseas ver otro producto?"));
        assert!(!session.is_typing());
    }

    #[test]
    fn test_rapid_submissions_keep_order() {
        let mut session = ChatSession::new(Router::builtin(), ReplyTiming::default());
        let start = Instant::now();

        // Second message arrives while the product suggestion is still pending
        session.submit("001", start);
        session.submit("gracias", start + ms(550));
        session.submit("/listar", start + ms(560));

        // One late poll delivers everything in order
        assert_eq!(session.poll(start + ms(10_000)), 4);

        let bot: Vec<&str> = session
            .transcript()
            .iter()
            .filter(|m| m.role == ChatRole::Bot)
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(bot.len(), 4);
        assert!(bot[0].starts_with("**Auriculares Bluetooth**"));
        assert!(bot[1].starts_with("¿Deseas ver otro producto?"));
        assert!(bot[2].starts_with("¡Con gusto!"));
        assert!(bot[3].starts_with("**Productos disponibles:**"));
    }

    #[test]
    fn test_later_reply_waits_for_pending_suggestion() {
        let mut session = ChatSession::new(Router::builtin(), ReplyTiming::default());
        let start = Instant::now();

        session.submit("003", start); // primary at 500, suggestion at 1100
        session.submit("hola", start + ms(100)); // would be due at 600

        // At 600ms only the product primary is out; the greeting must not jump the suggestion
        assert_eq!(session.poll(start + ms(600)), 1);
        assert_eq!(session.pending_len(), 2);

        assert_eq!(session.poll(start + ms(1100)), 2);
        let last = session.transcript().last().map(|m| m.content.as_str());
        assert_eq!(last, Some(crate::router::GREETING_REPLY));
    }

    #[test]
    fn test_polling_incrementally_matches_single_poll() {
        let inputs = ["001", "hola", "002", "xyz"];
        let start = Instant::now();

        let mut stepped = ChatSession::new(Router::builtin(), ReplyTiming::default());
        let mut batched = ChatSession::new(Router::builtin(), ReplyTiming::default());
        for (i, text) in inputs.iter().enumerate() {
            let at = start + ms(i as u64 * 100);
            stepped.submit(text, at);
            batched.submit(text, at);
            stepped.poll(at);
        }

        let mut t = start;
        while stepped.is_typing() {
            t += ms(50);
            stepped.poll(t);
        }
        batched.poll(t);

        assert_eq!(stepped.transcript(), batched.transcript());
        assert_eq!(stepped.transcript().len(), inputs.len() + 6);
    }

    #[test]
    fn test_flush_delivers_everything() {
        let mut session = ChatSession::new(Router::builtin(), ReplyTiming::default());
        session.submit("001", Instant::now());
        assert_eq!(session.flush(), 2);
        assert_eq!(session.transcript().len(), 3);
        assert!(!session.is_typing());
    }

    #[test]
    fn test_zero_delay_delivers_on_first_poll() {
        let timing = ReplyTiming {
            reply_delay: Duration::ZERO,
            suggestion_delay: Duration::ZERO,
        };
        let mut session = ChatSession::new(Router::builtin(), timing);
        let now = Instant::now();
        session.submit("mochila ejecutiva", now);
        assert_eq!(session.poll(now), 2);
    }
}
