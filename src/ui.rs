use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::overlay::{GlitchOverlay, HEADLINE, SUBLINE};
use crate::stage::{Section, Stage};

const HORIZONTAL_MARGIN: u16 = 5;
const TERMINAL_WIDTH: u16 = 60;
const PROGRESS_BAR_WIDTH: usize = 12;
const OVERLAY_BAR_WIDTH: usize = 32;

/// Glitch palette shared by the overlay flash and its particles.
const GLITCH_PALETTE: [Color; 3] = [Color::Magenta, Color::Cyan, Color::Green];

pub fn draw(stage: &Stage, f: &mut Frame) {
    f.render_widget(stage, f.area());
}

impl Widget for &Stage {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.section() {
            Section::Hero => render_hero(self, area, buf),
            Section::Trinity => render_trinity(self, area, buf),
            Section::Footer => render_footer(self, area, buf),
        }

        // The match-progress dots follow the viewer across sections
        render_konami_dots(self, area, buf);

        if self.overlay.is_active() {
            render_overlay(self, &self.overlay, area, buf);
        }
    }
}

fn render_hero(stage: &Stage, area: Rect, buf: &mut Buffer) {
    let green_bold = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);
    let white_bold = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let terminal_height = stage.deck.terminal.len() as u16 + 3;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(2), // headline
            Constraint::Length(2), // tagline
            Constraint::Length(terminal_height),
            Constraint::Min(1),
            Constraint::Length(1), // scroll indicator
        ])
        .split(area);

    let headline: Vec<Line> = stage
        .deck
        .headline
        .iter()
        .enumerate()
        .map(|(i, l)| {
            // First headline line glitch-white, second holo-green
            let style = if i == 0 { white_bold } else { green_bold };
            Line::from(Span::styled(l.clone(), style))
        })
        .collect();
    Paragraph::new(headline)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Paragraph::new(Span::styled(stage.deck.tagline.clone(), dim))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    render_terminal_window(stage, chunks[3], buf);

    Paragraph::new(Span::styled("▼ scroll (↓ / PageDown)", dim))
        .alignment(Alignment::Center)
        .render(chunks[5], buf);
}

fn render_terminal_window(stage: &Stage, area: Rect, buf: &mut Buffer) {
    let width = TERMINAL_WIDTH.min(area.width);
    let window = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y,
        width,
        height: area.height,
    };

    let title = format!(" ● ● ●  {} ", stage.deck.terminal_title);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::DIM))
        .title(Span::styled(
            title,
            Style::default().fg(Color::DarkGray),
        ));
    let inner = block.inner(window);
    block.render(window, buf);

    let prompt_style = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);
    let command_style = Style::default().fg(Color::Green);
    let output_style = Style::default().fg(Color::Gray);
    let cursor = Span::styled("█", Style::default().fg(Color::Green));

    let progress = stage.reveal.progress();
    let mut lines: Vec<Line> = Vec::new();
    for (idx, item) in stage.reveal.script().iter().enumerate() {
        let Some(visible) = stage.reveal.visible_text(idx) else {
            break;
        };
        let mut spans = Vec::new();
        if item.is_command {
            spans.push(Span::styled("> ", prompt_style));
        }
        spans.push(Span::styled(
            visible.to_string(),
            if item.is_command {
                command_style
            } else {
                output_style
            },
        ));
        if progress.is_active && idx == progress.item_index && stage.cursor_visible() {
            spans.push(cursor.clone());
        }
        lines.push(Line::from(spans));
    }
    if stage.reveal.is_done() {
        // Ready marker: a fresh prompt with a blinking cursor
        let mut spans = vec![Span::styled("> ", prompt_style)];
        if stage.cursor_visible() {
            spans.push(cursor);
        }
        lines.push(Line::from(spans));
    }

    Paragraph::new(lines).render(inner, buf);
}

fn render_trinity(stage: &Stage, area: Rect, buf: &mut Buffer) {
    let green = Style::default().fg(Color::Green);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(2), // progress bars
        ])
        .split(area);

    Paragraph::new(Span::styled("> The Trinity of Mastery", green))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    render_pillar_strip(stage, chunks[1], buf);
    render_pillar_bars(stage, chunks[2], buf);
}

fn render_pillar_strip(stage: &Stage, area: Rect, buf: &mut Buffer) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let pane_width = area.width as i64;
    let offset_cols = (stage.pillar_offset_pct() / 100.0 * pane_width as f64).round() as i64;

    for (i, pillar) in stage.deck.pillars.iter().enumerate() {
        let pane_x = area.x as i64 + i as i64 * pane_width + offset_cols;
        if pane_x + pane_width <= area.x as i64 || pane_x >= area.x as i64 + pane_width {
            continue;
        }

        let copy_width = (pane_width as usize).saturating_sub(16).clamp(20, 48);
        let mut text: Vec<(String, Style)> = vec![
            (
                pillar.subtitle.to_uppercase(),
                Style::default().fg(Color::Green),
            ),
            (String::new(), Style::default()),
            (
                pillar.title.clone(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            (String::new(), Style::default()),
        ];
        for line in wrap_words(&pillar.copy, copy_width) {
            text.push((line, Style::default().fg(Color::Gray)));
        }
        text.push((String::new(), Style::default()));
        text.push(("━━━━━━".to_string(), Style::default().fg(Color::Green)));

        let top = area.y + area.height.saturating_sub(text.len() as u16) / 2;
        for (row, (line, style)) in text.iter().enumerate() {
            let y = top + row as u16;
            if y >= area.y + area.height {
                break;
            }
            let line_x = pane_x + (pane_width - line.width() as i64) / 2;
            draw_clipped(buf, area, line_x, y, line, *style);
        }
    }
}

fn render_pillar_bars(stage: &Stage, area: Rect, buf: &mut Buffer) {
    let mut spans: Vec<Span> = Vec::new();
    for i in 0..stage.deck.pillars.len() {
        if i > 0 {
            spans.push(Span::raw("   "));
        }
        let filled = (stage.pillar_progress(i) * PROGRESS_BAR_WIDTH as f64).round() as usize;
        spans.push(Span::styled(
            "█".repeat(filled),
            Style::default().fg(Color::Green),
        ));
        spans.push(Span::styled(
            "░".repeat(PROGRESS_BAR_WIDTH - filled),
            Style::default().add_modifier(Modifier::DIM),
        ));
    }
    Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_footer(stage: &Stage, area: Rect, buf: &mut Buffer) {
    let green = Style::default().fg(Color::Green);
    let green_bold = green.add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(2), // brand
            Constraint::Length(3), // stats
            Constraint::Length(2), // links
            Constraint::Length(2), // hint
            Constraint::Min(1),
            Constraint::Length(1), // bottom bar
        ])
        .split(area);

    Paragraph::new(Line::from(vec![
        Span::styled("vit", Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::styled("rine", green_bold),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    render_stats(stage, chunks[2], buf);

    let mut link_spans: Vec<Span> = Vec::new();
    for (i, link) in stage.deck.links.iter().enumerate() {
        if i > 0 {
            link_spans.push(Span::raw("   "));
        }
        link_spans.push(Span::styled(format!("[{}] ", link.key), green));
        link_spans.push(Span::styled(link.label.clone(), dim));
    }
    Paragraph::new(Line::from(link_spans))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    let hint = if stage.show_hint {
        Span::styled(stage.deck.hint.clone(), green)
    } else {
        Span::styled("press ? for a hint", dim)
    };
    Paragraph::new(hint)
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

    Paragraph::new(Span::styled(
        "Powered by neural networks & caffeine",
        dim,
    ))
    .alignment(Alignment::Center)
    .render(chunks[6], buf);
}

fn render_stats(stage: &Stage, area: Rect, buf: &mut Buffer) {
    let progress = stage.stats_progress();
    let green_bold = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let mut value_spans: Vec<Span> = Vec::new();
    let mut label_spans: Vec<Span> = Vec::new();
    for (i, stat) in stage.deck.stats.iter().enumerate() {
        if i > 0 {
            value_spans.push(Span::raw("    "));
            label_spans.push(Span::raw("    "));
        }
        let shown = (stat.value as f64 * progress).round() as u64;
        let value = format!("{}{}{}", stat.prefix, shown, stat.suffix);
        // Pad the narrower of the pair so columns stay aligned
        let width = value.width().max(stat.label.width());
        value_spans.push(Span::styled(format!("{value:^width$}"), green_bold));
        label_spans.push(Span::styled(format!("{:^width$}", stat.label), dim));
    }

    Paragraph::new(vec![Line::from(value_spans), Line::from(label_spans)])
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_konami_dots(stage: &Stage, area: Rect, buf: &mut Buffer) {
    let progress = stage.matcher.progress();
    if progress == 0 {
        return;
    }
    let total = stage.matcher.target_len();
    let mut dots = String::new();
    for i in 0..total {
        dots.push(if i < progress { '●' } else { '○' });
        dots.push(' ');
    }
    let width = dots.trim_end().width() as u16;
    let x = area.right().saturating_sub(width + 2);
    let y = area.bottom().saturating_sub(2);
    if x >= area.x && y >= area.y {
        buf.set_string(x, y, dots.trim_end(), Style::default().fg(Color::Green));
    }
}

fn render_overlay(stage: &Stage, overlay: &GlitchOverlay, area: Rect, buf: &mut Buffer) {
    let now = stage.clock;

    if let Some(idx) = overlay.flash_color_index(now) {
        buf.set_style(area, Style::default().bg(GLITCH_PALETTE[idx]));
    }

    for p in &overlay.particles {
        let (x, y) = (p.x.round() as i64, p.y.round() as i64);
        if x >= area.x as i64
            && x < area.right() as i64
            && y >= area.y as i64
            && y < area.bottom() as i64
        {
            buf.set_string(
                x as u16,
                y as u16,
                p.symbol.to_string(),
                Style::default().fg(GLITCH_PALETTE[p.color_index % GLITCH_PALETTE.len()]),
            );
        }
    }

    let center_y = area.y + area.height / 2;
    let headline_style = Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD);
    draw_centered(buf, area, center_y.saturating_sub(2), HEADLINE, headline_style);
    draw_centered(
        buf,
        area,
        center_y,
        SUBLINE,
        Style::default().fg(Color::White),
    );

    let filled = (overlay.bar_fill(now) * OVERLAY_BAR_WIDTH as f64).round() as usize;
    let bar = format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(OVERLAY_BAR_WIDTH - filled)
    );
    draw_centered(
        buf,
        area,
        center_y + 2,
        &bar,
        Style::default().fg(Color::Green),
    );
}

fn draw_centered(buf: &mut Buffer, area: Rect, y: u16, text: &str, style: Style) {
    if y < area.y || y >= area.bottom() {
        return;
    }
    let x = area.x as i64 + (area.width as i64 - text.width() as i64) / 2;
    draw_clipped(buf, area, x, y, text, style);
}

/// Write a line that may start left of the visible area, clipping both ends.
fn draw_clipped(buf: &mut Buffer, area: Rect, x: i64, y: u16, text: &str, style: Style) {
    if y < area.y || y >= area.bottom() {
        return;
    }
    let left = area.x as i64;
    let right = area.right() as i64;
    let skip = (left - x).max(0) as usize;
    let start_x = x.max(left);
    if start_x >= right {
        return;
    }
    let take = (right - start_x) as usize;
    let clipped: String = text.chars().skip(skip).take(take).collect();
    if !clipped.is_empty() {
        buf.set_string(start_x as u16, y, &clipped, style);
    }
}

/// Greedy word wrap; long words are placed on their own line unbroken.
fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.width() + 1 + word.width() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::content::Deck;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::time::Instant;

    fn render_to_buffer(stage: &Stage) -> Buffer {
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        stage.render(area, &mut buf);
        buf
    }

    fn buffer_text(buf: &Buffer) -> String {
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn stage() -> Stage {
        Stage::new(Deck::new("default"), &Config::default(), Instant::now()).unwrap()
    }

    #[test]
    fn test_wrap_words() {
        let lines = wrap_words("the quick brown fox jumps", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn test_wrap_words_long_word() {
        let lines = wrap_words("a veryverylongword b", 8);
        assert_eq!(lines, vec!["a", "veryverylongword", "b"]);
    }

    #[test]
    fn test_hero_renders_headline_and_window() {
        let s = stage();
        let text = buffer_text(&render_to_buffer(&s));
        assert!(text.contains("I Don't Just Code."));
        assert!(text.contains("vitrine.sh"));
    }

    #[test]
    fn test_trinity_renders_pillar_and_bars() {
        let mut s = stage();
        s.set_scroll(0.34); // just inside the trinity section
        let text = buffer_text(&render_to_buffer(&s));
        assert!(text.contains("The Trinity of Mastery"));
        assert!(text.contains("The Darkroom"));
    }

    #[test]
    fn test_footer_renders_links_and_stats() {
        let mut s = stage();
        s.set_scroll(1.0);
        let text = buffer_text(&render_to_buffer(&s));
        assert!(text.contains("[g]"));
        assert!(text.contains("GitHub"));
        assert!(text.contains("PROJECTS SHIPPED"));
    }

    #[test]
    fn test_konami_dots_shown_mid_match() {
        let mut s = stage();
        s.set_scroll(1.0);
        s.on_key(KeyEvent::new(KeyCode::Up, KeyModifiers::NONE));
        // One Up both scrolls and registers as match progress
        assert_eq!(s.matcher.progress(), 1);
        let text = buffer_text(&render_to_buffer(&s));
        assert!(text.contains('●'));
        assert!(text.contains('○'));
    }

    #[test]
    fn test_overlay_renders_achievement() {
        let mut s = stage();
        for code in crate::sequence::konami_code() {
            s.on_key(KeyEvent::new(code, KeyModifiers::NONE));
        }
        assert!(s.overlay.is_active());
        let text = buffer_text(&render_to_buffer(&s));
        assert!(text.contains("ACHIEVEMENT UNLOCKED"));
    }

    #[test]
    fn test_draw_clipped_left_edge() {
        let area = Rect::new(0, 0, 10, 1);
        let mut buf = Buffer::empty(area);
        draw_clipped(&mut buf, area, -3, 0, "abcdefgh", Style::default());
        assert_eq!(buffer_text(&buf).trim_end(), "defgh");
    }

    #[test]
    fn test_draw_clipped_right_edge() {
        let area = Rect::new(0, 0, 5, 1);
        let mut buf = Buffer::empty(area);
        draw_clipped(&mut buf, area, 3, 0, "abcdefgh", Style::default());
        assert_eq!(buffer_text(&buf).trim_end(), "   ab");
    }
}
