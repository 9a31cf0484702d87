use std::time::Instant;
use ratatui::layout::Rect;
use vitrina_core::{ChatMessage, ChatSession, ReplyTiming, Router, Submission};

pub struct App {
    // Core state
    pub should_quit: bool,
    pub session: ChatSession<Router>,

    // Input state
    pub input: String,
    pub input_cursor: usize, // cursor position in input, in chars

    // Chat panel state
    pub chat_scroll: u16,
    pub chat_height: u16, // Inner height of the chat panel, set during render
    pub chat_width: u16,  // Inner width, for wrap calculations
    pub follow_tail: bool,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
}

impl App {
    pub fn new(router: Router, timing: ReplyTiming) -> Self {
        Self {
            should_quit: false,
            session: ChatSession::new(router, timing),

            input: String::new(),
            input_cursor: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            follow_tail: true,

            animation_frame: 0,

            chat_area: None,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.session.transcript()
    }

    pub fn is_typing(&self) -> bool {
        self.session.is_typing()
    }

    /// Whether the send action is enabled
    pub fn can_submit(&self) -> bool {
        !self.input.trim().is_empty()
    }

    /// Send the current input. Blank input is left untouched and never routed.
    pub fn submit_input(&mut self, now: Instant) -> Submission {
        let submission = self.session.submit(&self.input, now);
        if let Submission::Accepted { .. } = submission {
            self.input.clear();
            self.input_cursor = 0;
            self.follow_tail = true;
            self.scroll_chat_to_bottom();
        }
        submission
    }

    /// Called on every Tick event: deliver due replies and animate the typing indicator
    pub fn on_tick(&mut self, now: Instant) {
        let delivered = self.session.poll(now);
        if delivered > 0 {
            tracing::trace!(delivered, "bot messages shown");
        }

        if self.is_typing() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        } else {
            self.animation_frame = 0;
        }

        if self.follow_tail {
            self.scroll_chat_to_bottom();
        }
    }

    /// Number of rendered lines the chat panel needs at the current width
    pub fn total_chat_lines(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 { self.chat_width } else { 50 };
        crate::ui::chat_line_count(self.messages(), self.is_typing(), wrap_width)
    }

    fn max_chat_scroll(&self) -> u16 {
        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        self.total_chat_lines().saturating_sub(visible_height)
    }

    pub fn scroll_chat_to_bottom(&mut self) {
        self.chat_scroll = self.max_chat_scroll();
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
        self.follow_tail = self.chat_scroll >= self.max_chat_scroll();
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        let max_scroll = self.max_chat_scroll();
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max_scroll);
        self.follow_tail = self.chat_scroll >= max_scroll;
    }
}
