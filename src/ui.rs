use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::session::{CharClass, RoundState, RoundView};

const HORIZONTAL_MARGIN: u16 = 5;
const SUMMARY_WIDTH: u16 = 36;
const SUMMARY_HEIGHT: u16 = 9;

/// The whole typing screen: timer, paragraph, live metrics and, once time is
/// up, the summary overlay.
pub struct SessionScreen<'a> {
    pub view: &'a RoundView,
    pub best_wpm: Option<u32>,
}

impl<'a> SessionScreen<'a> {
    pub fn new(view: &'a RoundView) -> Self {
        Self {
            view,
            best_wpm: None,
        }
    }

    pub fn best_wpm(mut self, best: Option<u32>) -> Self {
        self.best_wpm = best;
        self
    }
}

fn class_style(class: CharClass) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match class {
        CharClass::Correct => bold.fg(Color::Green),
        CharClass::Incorrect => bold.fg(Color::Red),
        CharClass::Current => bold.add_modifier(Modifier::DIM | Modifier::UNDERLINED),
        CharClass::Pending => bold.add_modifier(Modifier::DIM),
    }
}

/// Styled spans for the paragraph. Mistyped spaces get a visible dot.
pub fn paragraph_spans(view: &RoundView) -> Vec<Span<'static>> {
    view.chars
        .iter()
        .map(|&(c, class)| {
            let shown = match (c, class) {
                (' ', CharClass::Incorrect) => '·',
                (c, _) => c,
            };
            Span::styled(shown.to_string(), class_style(class))
        })
        .collect()
}

pub fn metrics_line(view: &RoundView) -> String {
    format!(
        "{} wpm   {} cpm   {}% acc",
        view.metrics.wpm, view.metrics.cpm, view.metrics.accuracy
    )
}

impl Widget for SessionScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let dim_bold_style = Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let text: String = self.view.chars.iter().map(|(c, _)| *c).collect();
        let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
        let prompt_occupied_lines = if text.width() <= max_chars_per_line as usize {
            1
        } else {
            (text.width() as f64 / max_chars_per_line as f64).ceil() as u16 + 1
        };
        let padding = area.height.saturating_sub(prompt_occupied_lines + 4) / 2;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(padding),
                Constraint::Length(2),
                Constraint::Length(prompt_occupied_lines),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(area);

        let timer = Paragraph::new(Span::styled(
            self.view.seconds_remaining.to_string(),
            dim_bold_style,
        ))
        .alignment(Alignment::Center);
        timer.render(chunks[1], buf);

        let prompt = Paragraph::new(Line::from(paragraph_spans(self.view)))
            .alignment(if prompt_occupied_lines == 1 {
                Alignment::Center
            } else {
                Alignment::Left
            })
            .wrap(Wrap { trim: true });
        prompt.render(chunks[2], buf);

        let metrics = Paragraph::new(Span::styled(metrics_line(self.view), dim_bold_style))
            .alignment(Alignment::Center);
        metrics.render(chunks[3], buf);

        let hint = match self.view.state {
            RoundState::Idle => "start typing to begin / (esc)ape",
            RoundState::Running => "(esc)ape",
            RoundState::Ended => "",
        };
        Paragraph::new(Span::styled(hint, italic_style))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);

        if self.view.state == RoundState::Ended {
            render_summary(self.view, self.best_wpm, area, buf);
        }
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

fn render_summary(view: &RoundView, best_wpm: Option<u32>, area: Rect, buf: &mut Buffer) {
    let popup = centered(area, SUMMARY_WIDTH, SUMMARY_HEIGHT);
    Clear.render(popup, buf);

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(Span::styled(
            format!("{} wpm", view.metrics.wpm),
            bold_style.fg(Color::Magenta),
        )),
        Line::from(format!("{} cpm", view.metrics.cpm)),
        Line::from(format!("{}% accuracy", view.metrics.accuracy)),
    ];
    match best_wpm {
        Some(best) if view.metrics.wpm > best => lines.push(Line::from(Span::styled(
            "new best!",
            bold_style.fg(Color::Yellow),
        ))),
        Some(best) => lines.push(Line::from(format!("best {best} wpm"))),
        None => lines.push(Line::from("")),
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "(enter) again / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    )));

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" time's up "),
        )
        .render(popup, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Key;
    use crate::paragraph::Paragraph as Text;
    use crate::session::TypingSession;

    fn rendered(screen: SessionScreen<'_>, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        screen.render(area, &mut buf);
        buf.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn spans_follow_classification() {
        let mut session = TypingSession::new(Text::new("a b"));
        session.on_keystroke(Key::Char('a'));
        session.on_keystroke(Key::Char('x'));
        let spans = paragraph_spans(&session.view());

        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].style, class_style(CharClass::Correct));
        assert_eq!(spans[1].content, "·");
        assert_eq!(spans[1].style, class_style(CharClass::Incorrect));
        assert_eq!(spans[2].style, class_style(CharClass::Current));
    }

    #[test]
    fn typing_screen_shows_timer_and_text() {
        let session = TypingSession::new(Text::new("hi bye"));
        let out = rendered(SessionScreen::new(&session.view()), 60, 12);

        assert!(out.contains("60"));
        assert!(out.contains("hi bye"));
        assert!(out.contains("0 wpm"));
        assert!(!out.contains("time's up"));
    }

    #[test]
    fn ended_round_shows_summary() {
        let mut session = TypingSession::with_duration(Text::new("hi bye"), 1);
        for c in "hi ".chars() {
            session.on_keystroke(Key::Char(c));
        }
        session.tick();

        let out = rendered(SessionScreen::new(&session.view()).best_wpm(Some(0)), 60, 16);
        assert!(out.contains("time's up"));
        assert!(out.contains("1 wpm"));
        assert!(out.contains("100% accuracy"));
        assert!(out.contains("new best!"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let session = TypingSession::new(Text::new("a fairly long paragraph of words"));
        let _ = rendered(SessionScreen::new(&session.view()), 4, 2);
    }
}
