use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What was typed at a position, next to what the paragraph expects there.
/// `typed` is `None` once the position has been backspaced over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keystroke {
    pub typed: Option<char>,
    pub expected: char,
}

impl Keystroke {
    pub fn is_correct(&self) -> bool {
        self.typed == Some(self.expected)
    }
}

/// Position-keyed record of everything typed this round
pub type KeystrokeRecord = BTreeMap<usize, Keystroke>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundMetrics {
    pub wpm: u32,
    pub cpm: u32,
    pub accuracy: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WordTally {
    pub correct: usize,
    pub expected: usize,
}

impl WordTally {
    /// Whole-number percentage, rounded down. Zero when nothing is expected yet.
    pub fn accuracy(&self) -> u8 {
        if self.expected == 0 {
            return 0;
        }
        (self.correct * 100 / self.expected).min(100) as u8
    }
}

/// Compare typed and expected text word by word at the same ordinal position.
pub fn tally_words(typed: &str, expected: &str) -> WordTally {
    let typed_words = typed.split(' ').filter(|w| !w.is_empty());
    let expected_words: Vec<&str> = expected.split(' ').filter(|w| !w.is_empty()).collect();

    let correct = typed_words
        .zip(expected_words.iter())
        .filter(|(t, e)| t == *e)
        .count();

    WordTally {
        correct,
        expected: expected_words.len(),
    }
}

/// Snapshot metrics from the keystroke record. Both rates are the raw count of
/// correctly typed words; they are not normalised by elapsed time.
pub fn score(record: &KeystrokeRecord) -> RoundMetrics {
    let typed: String = record.values().filter_map(|k| k.typed).collect();
    let expected: String = record.values().map(|k| k.expected).collect();

    let tally = tally_words(&typed, &expected);
    let correct = tally.correct as u32;

    RoundMetrics {
        wpm: correct,
        cpm: correct,
        accuracy: tally.accuracy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_of(typed: &str, expected: &str) -> KeystrokeRecord {
        typed
            .chars()
            .zip(expected.chars())
            .enumerate()
            .map(|(idx, (t, e))| {
                (
                    idx,
                    Keystroke {
                        typed: Some(t),
                        expected: e,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn tally_counts_matching_words_by_position() {
        let tally = tally_words("the cot sat", "the cat sat");
        assert_eq!(tally, WordTally { correct: 2, expected: 3 });
        assert_eq!(tally.accuracy(), 66);
    }

    #[test]
    fn tally_discards_empty_tokens() {
        let tally = tally_words("  hi   ", " hi ");
        assert_eq!(tally, WordTally { correct: 1, expected: 1 });
    }

    #[test]
    fn accuracy_is_zero_without_expected_words() {
        assert_eq!(WordTally::default().accuracy(), 0);
        assert_eq!(tally_words("", "   ").accuracy(), 0);
    }

    #[test]
    fn score_wrong_word() {
        let metrics = score(&record_of("xxx ", "the "));
        assert_eq!(
            metrics,
            RoundMetrics {
                wpm: 0,
                cpm: 0,
                accuracy: 0
            }
        );
    }

    #[test]
    fn score_all_correct() {
        let metrics = score(&record_of("hi there ", "hi there "));
        assert_eq!(metrics.wpm, 2);
        assert_eq!(metrics.cpm, 2);
        assert_eq!(metrics.accuracy, 100);
    }

    #[test]
    fn cleared_positions_drop_out_of_typed_text() {
        let mut record = record_of("hix ", "hi b");
        record.insert(
            2,
            Keystroke {
                typed: None,
                expected: ' ',
            },
        );
        // typed collapses to "hi " while expected stays "hi b"
        let metrics = score(&record);
        assert_eq!(metrics.wpm, 1);
        assert_eq!(metrics.accuracy, 50);
    }

    #[test]
    fn keystroke_correctness() {
        let k = Keystroke {
            typed: Some('a'),
            expected: 'a',
        };
        assert!(k.is_correct());
        let cleared = Keystroke {
            typed: None,
            expected: 'a',
        };
        assert!(!cleared.is_correct());
    }
}
