use tracing::{debug, info};

use crate::corpus::ParagraphGenerator;
use crate::keys::Key;
use crate::paragraph::Paragraph;
use crate::scoring::{self, Keystroke, KeystrokeRecord, RoundMetrics};

/// Length of a round unless configured otherwise
pub const ROUND_SECS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum RoundState {
    Idle,
    Running,
    Ended,
}

/// How a paragraph position should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Correct,
    Incorrect,
    Current,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Filtered out, or the round cannot take input
    Ignored,
    /// First keystroke of the round; the per-second timer should be armed
    Started,
    Accepted,
}

/// Final numbers shown when time runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSummary {
    pub metrics: RoundMetrics,
    pub duration_secs: u32,
    pub typed_chars: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Ignored,
    Counting(u32),
    /// Time is up; the timer must be cancelled
    Ended(RoundSummary),
}

/// Everything the rendering layer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct RoundView {
    pub chars: Vec<(char, CharClass)>,
    pub metrics: RoundMetrics,
    pub seconds_remaining: u32,
    pub state: RoundState,
}

/// One timed typing round: reference text, cursor, keystrokes and score
#[derive(Debug, Clone)]
pub struct TypingSession {
    paragraph: Paragraph,
    record: KeystrokeRecord,
    cursor: usize,
    metrics: RoundMetrics,
    duration_secs: u32,
    seconds_remaining: u32,
    state: RoundState,
}

impl TypingSession {
    pub fn new(paragraph: Paragraph) -> Self {
        Self::with_duration(paragraph, ROUND_SECS)
    }

    pub fn with_duration(paragraph: Paragraph, duration_secs: u32) -> Self {
        let duration_secs = duration_secs.max(1);
        Self {
            paragraph,
            record: KeystrokeRecord::new(),
            cursor: 0,
            metrics: RoundMetrics::default(),
            duration_secs,
            seconds_remaining: duration_secs,
            state: RoundState::Idle,
        }
    }

    pub fn paragraph(&self) -> &Paragraph {
        &self.paragraph
    }

    pub fn record(&self) -> &KeystrokeRecord {
        &self.record
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn metrics(&self) -> RoundMetrics {
        self.metrics
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RoundState::Running
    }

    pub fn has_ended(&self) -> bool {
        self.state == RoundState::Ended
    }

    /// Begin a fresh round with a new paragraph. Only applies while idle.
    pub fn start_round<G: ParagraphGenerator + ?Sized>(&mut self, generator: &mut G) -> bool {
        if self.state != RoundState::Idle {
            debug!(state = %self.state, "start_round ignored");
            return false;
        }
        self.install(generator.generate());
        true
    }

    /// Dismiss the summary of an ended round and go back to idle.
    pub fn reset_round<G: ParagraphGenerator + ?Sized>(&mut self, generator: &mut G) -> bool {
        if self.state != RoundState::Ended {
            debug!(state = %self.state, "reset_round ignored");
            return false;
        }
        self.install(generator.generate());
        self.state = RoundState::Idle;
        true
    }

    fn install(&mut self, paragraph: Paragraph) {
        debug!(chars = paragraph.len(), "new round");
        self.paragraph = paragraph;
        self.record.clear();
        self.cursor = 0;
        self.metrics = RoundMetrics::default();
        self.seconds_remaining = self.duration_secs;
    }

    pub fn on_keystroke(&mut self, key: Key) -> KeyOutcome {
        if key.is_ignored() || self.state == RoundState::Ended {
            return KeyOutcome::Ignored;
        }

        let started = self.state == RoundState::Idle;
        if started {
            debug!("round running");
            self.state = RoundState::Running;
        }

        match key {
            Key::Backspace => self.backspace(),
            Key::Char(c) => self.write(c),
            Key::Ignored(_) => {}
        }

        if started {
            KeyOutcome::Started
        } else {
            KeyOutcome::Accepted
        }
    }

    fn write(&mut self, c: char) {
        // past the final character nothing is recorded, but a space still
        // closes the last word
        if let Some(expected) = self.paragraph.get(self.cursor) {
            self.record.insert(
                self.cursor,
                Keystroke {
                    typed: Some(c),
                    expected,
                },
            );
            self.cursor += 1;
        }

        if c == ' ' {
            self.metrics = scoring::score(&self.record);
            debug!(
                wpm = self.metrics.wpm,
                accuracy = self.metrics.accuracy,
                "word boundary"
            );
        }
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        if let Some(keystroke) = self.record.get_mut(&self.cursor) {
            keystroke.typed = None;
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.state != RoundState::Running {
            return TickOutcome::Ignored;
        }

        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining > 0 {
            return TickOutcome::Counting(self.seconds_remaining);
        }

        self.state = RoundState::Ended;
        let summary = self.summary();
        info!(
            wpm = summary.metrics.wpm,
            cpm = summary.metrics.cpm,
            accuracy = summary.metrics.accuracy,
            "round ended"
        );
        TickOutcome::Ended(summary)
    }

    pub fn summary(&self) -> RoundSummary {
        RoundSummary {
            metrics: self.metrics,
            duration_secs: self.duration_secs,
            typed_chars: self.record.values().filter(|k| k.typed.is_some()).count(),
        }
    }

    pub fn classify(&self, idx: usize) -> CharClass {
        use std::cmp::Ordering::*;
        match idx.cmp(&self.cursor) {
            Equal => CharClass::Current,
            Greater => CharClass::Pending,
            Less => match self.record.get(&idx) {
                Some(k) if k.is_correct() => CharClass::Correct,
                _ => CharClass::Incorrect,
            },
        }
    }

    pub fn classes(&self) -> Vec<(char, CharClass)> {
        self.paragraph
            .chars()
            .iter()
            .enumerate()
            .map(|(idx, c)| (*c, self.classify(idx)))
            .collect()
    }

    pub fn view(&self) -> RoundView {
        RoundView {
            chars: self.classes(),
            metrics: self.metrics,
            seconds_remaining: self.seconds_remaining,
            state: self.state,
        }
    }
}
