use std::iter::Peekable;
use std::str::Chars;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};
use vitrina_core::{ChatMessage, ChatRole, LIST_COMMAND};
use crate::app::App;

/// Collect chars up to the closing delimiter. Returns the inner text and
/// whether the delimiter was found.
fn take_until(chars: &mut Peekable<Chars<'_>>, delim: char, doubled: bool) -> (String, bool) {
    let mut inner = String::new();
    while let Some(c) = chars.next() {
        if c == delim {
            if !doubled {
                return (inner, true);
            }
            if chars.peek() == Some(&delim) {
                chars.next();
                return (inner, true);
            }
        }
        inner.push(c);
    }
    (inner, false)
}

/// Parse a line of bot text into styled spans.
///
/// Supports `**bold**`, `*italic*` and `` `code` ``. Unclosed markers are kept literally.
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        let (marker, style, doubled) = match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                ("**", Style::default().add_modifier(Modifier::BOLD), true)
            }
            '*' => ("*", Style::default().add_modifier(Modifier::ITALIC), false),
            '`' => ("`", Style::default().fg(Color::Magenta), false),
            _ => {
                current_text.push(c);
                continue;
            }
        };

        let (inner, closed) = take_until(&mut chars, c, doubled);
        if closed && !inner.is_empty() {
            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }
            spans.push(Span::styled(inner, style));
        } else {
            // No closing marker, treat as literal
            current_text.push_str(marker);
            current_text.push_str(&inner);
            if closed {
                current_text.push_str(marker);
            }
        }
    }

    // Push any remaining text
    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

/// Styled lines for the chat panel, as drawn: role label, content, blank separator.
pub fn chat_lines(messages: &[ChatMessage], typing: bool, animation_frame: u8) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for msg in messages {
        match msg.role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled(
                    "Tú:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                for line in msg.content.lines() {
                    lines.push(Line::from(line.to_string()));
                }
            }
            ChatRole::Bot => {
                lines.push(Line::from(Span::styled(
                    "Bot:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                for line in msg.content.lines() {
                    lines.push(parse_markdown_line(line));
                }
            }
        }
        lines.push(Line::default());
    }

    if typing {
        lines.push(Line::from(Span::styled(
            "Bot:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("escribiendo{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

/// Rows the chat needs at `width` once markup is stripped and words are wrapped
pub fn chat_line_count(messages: &[ChatMessage], typing: bool, width: u16) -> u16 {
    let paragraph = Paragraph::new(chat_lines(messages, typing, 0)).wrap(Wrap { trim: false });
    u16::try_from(paragraph.line_count(width)).unwrap_or(u16::MAX)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Vitrina ", Style::default().fg(Color::Cyan).bold()),
        Span::styled("asistente de tienda", Style::default().fg(Color::White)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store area for mouse hit-testing and inner size for scroll calculations
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);
    if app.follow_tail {
        app.scroll_chat_to_bottom();
    }

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Chat ");

    let chat_text = if app.messages().is_empty() && !app.is_typing() {
        Text::from(Span::styled(
            format!("Escribe \"{}\" o el nombre de un producto...", LIST_COMMAND),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let lines = chat_lines(app.messages(), app.is_typing(), app.animation_frame);
        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);

    let total_lines = app.total_chat_lines();
    if total_lines > app.chat_height {
        let mut scrollbar_state = ScrollbarState::new(total_lines.saturating_sub(app.chat_height) as usize)
            .position(app.chat_scroll as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut scrollbar_state,
        );
    }
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let enabled = app.can_submit();
    let border_color = if enabled { Color::Yellow } else { Color::DarkGray };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(if enabled { " Enviar (Enter) " } else { " Mensaje " });

    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;

    // Scroll horizontally to keep the cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let input = if app.input.is_empty() {
        Paragraph::new(Span::styled(
            "escribe un mensaje…",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))
    } else {
        let visible_text: String = app.input
            .chars()
            .skip(scroll_offset)
            .take(inner_width)
            .collect();
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    };

    frame.render_widget(input.block(input_block), area);

    let cursor_x = (cursor_pos - scroll_offset) as u16;
    frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let status = if app.is_typing() {
        Span::styled(" ESCRIBIENDO ", Style::default().bg(Color::Yellow).fg(Color::Black))
    } else {
        Span::styled(" LISTO ", Style::default().bg(Color::Blue).fg(Color::White))
    };

    let hints = Span::styled(
        " Enter enviar · PgUp/PgDn desplazar · Esc salir",
        Style::default().fg(Color::DarkGray),
    );

    frame.render_widget(Paragraph::new(Line::from(vec![status, hints])), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(line: &Line) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_bold_label() {
        let line = parse_markdown_line("**Precio:** $89.90");
        assert_eq!(contents(&line), vec!["Precio:", " $89.90"]);
        assert!(line.spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_italic_and_code() {
        let line = parse_markdown_line("*nota* y `002` (Zapatillas)");
        assert_eq!(contents(&line), vec!["nota", " y ", "002", " (Zapatillas)"]);
        assert!(line.spans[0].style.add_modifier.contains(Modifier::ITALIC));
        assert_eq!(line.spans[2].style.fg, Some(Color::Magenta));
    }

    #[test]
    fn test_unclosed_markers_stay_literal() {
        let line = parse_markdown_line("10% *descuento");
        assert_eq!(contents(&line), vec!["10% *descuento"]);

        let line = parse_markdown_line("**abierto");
        assert_eq!(contents(&line), vec!["**abierto"]);
    }

    #[test]
    fn test_empty_line() {
        assert!(parse_markdown_line("").spans.is_empty());
    }

    #[test]
    fn test_line_count_ignores_markup() {
        // 22 chars raw, 18 once the bold markers are stripped
        let messages = vec![ChatMessage::bot("**Stock:** 10 unidades")];
        assert_eq!(chat_line_count(&messages, false, 20), 3);
    }

    #[test]
    fn test_line_count_wraps_on_words() {
        // 17 chars fit in two rows of 9 by character count, but words need three
        let messages = vec![ChatMessage::user("aaaaa bbbbb ccccc")];
        assert_eq!(chat_line_count(&messages, false, 9), 5);
    }

    #[test]
    fn test_line_count_includes_typing_indicator() {
        let messages = vec![ChatMessage::user("hola")];
        assert_eq!(chat_line_count(&messages, true, 40), 5);
    }
}
