use std::time::Instant;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::App;
use crate::tui::AppEvent;

const WHEEL_LINES: u16 = 3;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.on_tick(Instant::now()),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Esc => app.should_quit = true,

        KeyCode::Enter => {
            if app.can_submit() {
                app.submit_input(Instant::now());
            }
        }

        // Chat scrolling
        KeyCode::PageUp => {
            let page = app.chat_height.max(1);
            app.scroll_chat_up(page);
        }
        KeyCode::PageDown => {
            let page = app.chat_height.max(1);
            app.scroll_chat_down(page);
        }
        KeyCode::Up if key.modifiers.contains(KeyModifiers::CONTROL) => app.scroll_chat_up(1),
        KeyCode::Down if key.modifiers.contains(KeyModifiers::CONTROL) => app.scroll_chat_down(1),

        // Line editing
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.input_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
            app.input.insert(byte_pos, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_chat_down(WHEEL_LINES),
        MouseEventKind::ScrollUp => app.scroll_chat_up(WHEEL_LINES),
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrina_core::{ReplyTiming, Router};

    fn app() -> App {
        App::new(Router::builtin(), ReplyTiming::default())
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_event(app, AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))).unwrap();
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_typing_and_enter_submits() {
        let mut app = app();
        type_str(&mut app, "hola");
        assert_eq!(app.input, "hola");

        press(&mut app, KeyCode::Enter);
        assert!(app.input.is_empty());
        assert_eq!(app.messages().len(), 1);
        assert!(app.is_typing());
    }

    #[test]
    fn test_enter_on_blank_input_does_nothing() {
        let mut app = app();
        type_str(&mut app, "  ");
        press(&mut app, KeyCode::Enter);
        assert!(app.messages().is_empty());
        assert!(!app.is_typing());
    }

    #[test]
    fn test_utf8_editing() {
        let mut app = app();
        type_str(&mut app, "categoría");
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Backspace); // removes 'í'
        assert_eq!(app.input, "categora");

        press(&mut app, KeyCode::Home);
        press(&mut app, KeyCode::Delete);
        assert_eq!(app.input, "ategora");

        press(&mut app, KeyCode::End);
        type_str(&mut app, "ñ");
        assert_eq!(app.input, "ategorañ");
        assert_eq!(app.input_cursor, 8);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);

        let mut app = self::app();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        handle_event(&mut app, AppEvent::Key(ctrl_c)).unwrap();
        assert!(app.should_quit);
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_point_in_rect() {
        let rect = Rect::new(2, 2, 4, 3);
        assert!(point_in_rect(2, 2, rect));
        assert!(point_in_rect(5, 4, rect));
        assert!(!point_in_rect(6, 4, rect));
        assert!(!point_in_rect(1, 2, rect));
    }
}
