//! Main launcher view: input box, results, help line.

use std::time::Instant;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use unicode_width::UnicodeWidthChar;

use crate::app::App;
use crate::colors::Palette;

/// Render the whole launcher. Keeps `app.scroll_top` in step with the
/// active row.
pub fn render_launcher(f: &mut Frame, app: &mut App, now: Instant) {
    let palette = app.palette;
    let bg_block = Block::default().style(Style::default().bg(palette.bg));
    f.render_widget(bg_block, f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_input(f, app, chunks[0]);

    if let Some(value) = app.literal() {
        render_literal(f, &palette, value, chunks[1]);
    } else {
        render_rows(f, app, chunks[1], now);
    }

    let help = Paragraph::new(Line::from(build_help_spans(app))).block(
        Block::default()
            .borders(Borders::ALL)
            .style(Style::default().bg(palette.surface))
            .border_style(Style::default().fg(palette.outline)),
    );
    f.render_widget(help, chunks[2]);
}

fn render_input(f: &mut Frame, app: &App, area: Rect) {
    let palette = &app.palette;
    let input_block = Block::default()
        .borders(Borders::ALL)
        .title(" Aether ")
        .style(Style::default().bg(palette.surface))
        .border_style(Style::default().fg(palette.primary));

    let (visible, cursor) = input_view(
        &app.input,
        app.cursor_position,
        area.width.saturating_sub(2),
    );
    let input_text = if app.input.is_empty() {
        Span::styled(&app.placeholder, Style::default().fg(palette.outline))
    } else {
        Span::styled(visible, Style::default().fg(palette.on_surface))
    };
    f.render_widget(Paragraph::new(input_text).block(input_block), area);

    f.set_cursor_position((area.x + 1 + cursor, area.y + 1));
}

/// Tail of `input` that fits a field `width` cells wide with the cursor in
/// view, and the cursor's column inside it. Columns are display cells, so
/// wide characters count twice.
fn input_view(input: &str, cursor: usize, width: u16) -> (&str, u16) {
    let width = usize::from(width);
    if width == 0 {
        return ("", 0);
    }
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let cursor = cursor.min(chars.len());
    let cells = |c: char| c.width().unwrap_or(0);

    let mut start = 0;
    let mut column: usize = chars[..cursor].iter().map(|&(_, c)| cells(c)).sum();
    // The cursor itself needs a free cell at the end of the field.
    while column >= width && start < cursor {
        column -= cells(chars[start].1);
        start += 1;
    }

    let byte_start = chars.get(start).map_or(input.len(), |&(i, _)| i);
    (
        &input[byte_start..],
        u16::try_from(column).unwrap_or(u16::MAX),
    )
}

fn render_literal(f: &mut Frame, palette: &Palette, value: &str, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Result ")
        .style(Style::default().bg(palette.surface))
        .border_style(Style::default().fg(palette.outline));
    let text = Span::styled(
        value,
        Style::default()
            .fg(palette.primary)
            .add_modifier(Modifier::BOLD),
    );
    f.render_widget(Paragraph::new(text).block(block), area);
}

fn render_rows(f: &mut Frame, app: &mut App, area: Rect, now: Instant) {
    let palette = app.palette;
    let rows = app.rows();
    let candidates = app.selection.candidates().map_or(0, <[String]>::len);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Results ({candidates}) "))
        .style(Style::default().bg(palette.surface))
        .border_style(Style::default().fg(palette.outline));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if rows.is_empty() {
        if !app.input.is_empty() && app.selection.candidates().is_some() {
            let hint = Span::styled("No results", Style::default().fg(palette.outline));
            f.render_widget(Paragraph::new(hint), inner);
        }
        return;
    }

    let visible = usize::from(inner.height);
    let active = app
        .highlight
        .active()
        .unwrap_or_else(|| app.selection.selected());
    app.scroll_top = scroll_to_show(app.scroll_top, active, visible);

    if let Some(bar) = app
        .highlight
        .geometry(now)
        .and_then(|g| bar_area(inner, app.scroll_top, g.offset, g.height))
    {
        let bar_block = Block::default().style(Style::default().bg(palette.highlight));
        f.render_widget(bar_block, bar);
    }

    let lines: Vec<Line> = rows
        .iter()
        .enumerate()
        .skip(app.scroll_top)
        .take(visible)
        .map(|(i, label)| {
            let style = if i == active {
                Style::default()
                    .fg(palette.on_surface)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.subtext)
            };
            let style = if i == candidates {
                style.add_modifier(Modifier::ITALIC)
            } else {
                style
            };
            Line::from(vec![Span::raw(" "), Span::styled(label.as_str(), style)])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

/// Smallest scroll change that keeps `active` inside a window of
/// `visible` rows.
fn scroll_to_show(top: usize, active: usize, visible: usize) -> usize {
    if visible == 0 {
        return active;
    }
    if active < top {
        active
    } else if active >= top + visible {
        active + 1 - visible
    } else {
        top
    }
}

/// Screen rectangle of the highlight bar, clipped to `inner`. `None` when
/// the bar is scrolled out of view.
fn bar_area(inner: Rect, scroll_top: usize, offset: usize, height: u16) -> Option<Rect> {
    let bottom = scroll_top + usize::from(inner.height);
    let start = offset.max(scroll_top);
    let end = (offset + usize::from(height)).min(bottom);
    if start >= end {
        return None;
    }
    Some(Rect {
        x: inner.x,
        y: inner.y + u16::try_from(start - scroll_top).ok()?,
        width: inner.width,
        height: u16::try_from(end - start).ok()?,
    })
}

fn build_help_spans(app: &App) -> Vec<Span<'_>> {
    let palette = &app.palette;
    let mut help_spans = vec![
        Span::styled("Esc", Style::default().fg(palette.primary)),
        Span::styled(": close  ", Style::default().fg(palette.subtext)),
    ];

    if app.literal().is_none() {
        help_spans.extend(vec![
            Span::styled("Enter", Style::default().fg(palette.primary)),
            Span::styled(": launch  ", Style::default().fg(palette.subtext)),
            Span::styled("Up/Down", Style::default().fg(palette.primary)),
            Span::styled(": select  ", Style::default().fg(palette.subtext)),
        ]);
    }

    if app.launching {
        help_spans.push(Span::styled(
            " [Launching...] ",
            Style::default().fg(palette.success),
        ));
    }

    help_spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use aether_types::QueryReply;
    use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut text = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                text.push_str(buf[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn draw(app: &mut App, height: u16, now: Instant) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(60, height)).unwrap();
        terminal
            .draw(|f| render_launcher(f, app, now))
            .unwrap();
        app.settle();
        terminal
            .draw(|f| render_launcher(f, app, now))
            .unwrap();
        terminal.backend().buffer().clone()
    }

    fn fire_app(now: Instant) -> App {
        let mut app = App::default();
        app.input = "fire".into();
        app.cursor_position = 4;
        app.query_sent(1);
        app.handle_reply(QueryReply::candidates(1, ["Firefox", "Firewall Config"]), now);
        app
    }

    #[test]
    fn test_scroll_to_show() {
        assert_eq!(scroll_to_show(0, 2, 5), 0);
        assert_eq!(scroll_to_show(0, 7, 5), 3);
        assert_eq!(scroll_to_show(4, 1, 5), 1);
        assert_eq!(scroll_to_show(3, 7, 5), 3);
    }

    #[test]
    fn test_bar_area_clips_to_viewport() {
        let inner = Rect::new(2, 5, 20, 4);
        assert_eq!(bar_area(inner, 0, 1, 1), Some(Rect::new(2, 6, 20, 1)));
        assert_eq!(bar_area(inner, 2, 3, 1), Some(Rect::new(2, 6, 20, 1)));
        assert_eq!(bar_area(inner, 2, 0, 1), None);
        assert_eq!(bar_area(inner, 0, 4, 1), None);
        assert_eq!(
            bar_area(inner, 70_000, 70_002, 1),
            Some(Rect::new(2, 7, 20, 1))
        );
    }

    #[test]
    fn test_input_view_counts_display_cells() {
        assert_eq!(input_view("fire", 4, 20), ("fire", 4));
        assert_eq!(input_view("日本語", 2, 20), ("日本語", 4));
        assert_eq!(input_view("🔥a", 1, 20), ("🔥a", 2));
    }

    #[test]
    fn test_input_view_scrolls_long_input() {
        assert_eq!(input_view("abcdefghij", 10, 5), ("ghij", 4));
        assert_eq!(input_view("abcdefghij", 2, 5), ("abcdefghij", 2));
        assert_eq!(input_view("日本語", 3, 4), ("語", 2));
        assert_eq!(input_view("abc", 3, 0), ("", 0));
    }

    #[test]
    fn test_cursor_stays_inside_input_box() {
        let now = Instant::now();
        let mut app = App::default();
        app.input = "x".repeat(200);
        app.cursor_position = 200;

        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        terminal
            .draw(|f| render_launcher(f, &mut app, now))
            .unwrap();
        let cursor = terminal.get_cursor_position().unwrap();
        // margin 1 + border 1 on each side of a 40-cell screen
        assert!(cursor.x < 38, "cursor at {cursor:?}");
    }

    #[test]
    fn test_user_palette_paints_highlight_bar() {
        let now = Instant::now();
        let mut app = fire_app(now);
        app.palette.highlight = ratatui::style::Color::Rgb(0xff, 0, 0);
        let buf = draw(&mut app, 20, now);

        let painted = (0..buf.area.height)
            .any(|y| buf[(10, y)].bg == ratatui::style::Color::Rgb(0xff, 0, 0));
        assert!(painted);
    }

    #[test]
    fn test_renders_candidates_and_web_slot() {
        let now = Instant::now();
        let mut app = fire_app(now);
        let text = buffer_text(&draw(&mut app, 20, now));

        assert!(text.contains("Results (2)"));
        assert!(text.contains("Firefox"));
        assert!(text.contains("Firewall Config"));
        assert!(text.contains("Look for fire in web"));
    }

    #[test]
    fn test_renders_literal_result() {
        let now = Instant::now();
        let mut app = App::default();
        app.input = "2+2".into();
        app.handle_reply(QueryReply::literal(1, "4"), now);
        let text = buffer_text(&draw(&mut app, 20, now));

        assert!(text.contains("Result"));
        assert!(!text.contains("Results ("));
        assert!(!text.contains("Look for"));
    }

    #[test]
    fn test_scrolls_to_keep_active_row_visible() {
        let now = Instant::now();
        let mut app = App::default();
        app.input = "a".into();
        let names: Vec<String> = (0..30).map(|i| format!("Item {i:02}")).collect();
        app.handle_reply(QueryReply::candidates(1, names), now);
        app.settle();
        for _ in 0..25 {
            app.select_next(now);
        }

        let text = buffer_text(&draw(&mut app, 16, now));
        assert!(app.scroll_top > 0);
        assert!(text.contains("Item 25"));
        assert!(!text.contains("Item 00"));
    }

    #[test]
    fn test_placeholder_shown_for_empty_input() {
        let now = Instant::now();
        let mut app = App::default();
        let text = buffer_text(&draw(&mut app, 12, now));
        assert!(text.contains("Search..."));
    }
}
