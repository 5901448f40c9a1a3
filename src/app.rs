use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{info, warn};

use crate::corpus::ParagraphGenerator;
use crate::history::{History, HistoryEntry};
use crate::keys::Key;
use crate::paragraph::Paragraph;
use crate::runtime::{EventSource, Runner, SessionEvent, Ticker};
use crate::session::{KeyOutcome, RoundSummary, TickOutcome, TypingSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// The typing session plus the things around it: where paragraphs come from
/// and where finished rounds go.
pub struct App {
    pub session: TypingSession,
    generator: Box<dyn ParagraphGenerator>,
    history: Option<History>,
    best_wpm: Option<u32>,
    previous_best: Option<u32>,
}

fn is_quit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
}

impl App {
    pub fn new(
        mut generator: Box<dyn ParagraphGenerator>,
        round_secs: u32,
        history: Option<History>,
    ) -> Self {
        let mut session = TypingSession::with_duration(Paragraph::default(), round_secs);
        session.start_round(generator.as_mut());

        let best_wpm = history.as_ref().and_then(|h| match h.best_wpm() {
            Ok(best) => best,
            Err(err) => {
                warn!(%err, "could not read round history");
                None
            }
        });

        Self {
            session,
            generator,
            history,
            best_wpm,
            previous_best: best_wpm,
        }
    }

    pub fn best_wpm(&self) -> Option<u32> {
        self.best_wpm
    }

    /// Apply one event. Arms the round timer on the first keystroke and
    /// cancels it when time runs out.
    pub fn handle<E: EventSource, T: Ticker>(
        &mut self,
        event: SessionEvent,
        runner: &mut Runner<E, T>,
    ) -> Control {
        match event {
            SessionEvent::Tick(_) => {
                if let TickOutcome::Ended(summary) = self.session.tick() {
                    runner.disarm_timer();
                    self.finish_round(&summary);
                }
            }
            SessionEvent::Resize => {}
            SessionEvent::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    return Control::Continue;
                }
                if is_quit(&key) {
                    runner.disarm_timer();
                    return Control::Quit;
                }

                if self.session.has_ended() {
                    if matches!(key.code, KeyCode::Enter | KeyCode::Char('r')) {
                        self.session.reset_round(self.generator.as_mut());
                    }
                } else if self.session.on_keystroke(Key::from(key)) == KeyOutcome::Started {
                    runner.arm_timer();
                }
            }
        }
        Control::Continue
    }

    fn finish_round(&mut self, summary: &RoundSummary) {
        if let Some(ref history) = self.history {
            let entry = HistoryEntry::from_summary(summary, Local::now());
            if let Err(err) = history.append(&entry) {
                warn!(%err, path = %history.path().display(), "could not record round");
            }
        }
        info!(wpm = summary.metrics.wpm, best = ?self.best_wpm, "round finished");
        self.previous_best = self.best_wpm;
        self.best_wpm = Some(
            self.best_wpm
                .map_or(summary.metrics.wpm, |best| best.max(summary.metrics.wpm)),
        );
    }

    /// Best wpm before the round that just ended, for the summary screen
    pub fn previous_best_wpm(&self) -> Option<u32> {
        self.previous_best
    }
}
