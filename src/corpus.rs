use cgisf_lib::cgisf;
use include_dir::{include_dir, Dir};
use itertools::Itertools;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::CorpusError;
use crate::paragraph::Paragraph;

static CORPUS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/lang");

/// Supplies the reference text for each new round
pub trait ParagraphGenerator {
    fn generate(&mut self) -> Paragraph;
}

impl<F: FnMut() -> Paragraph> ParagraphGenerator for F {
    fn generate(&mut self) -> Paragraph {
        self()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum, strum_macros::Display)]
pub enum CorpusKind {
    Words,
    Passages,
    Sentences,
}

#[derive(Deserialize, Clone, Debug)]
pub struct WordList {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PassageList {
    pub name: String,
    pub size: u32,
    pub passages: Vec<String>,
}

fn read_embedded<T: DeserializeOwned>(name: &str) -> Result<T, CorpusError> {
    let file = CORPUS_DIR
        .get_file(format!("{name}.json"))
        .ok_or_else(|| CorpusError::NotFound {
            name: name.to_string(),
        })?;

    let contents = file.contents_utf8().ok_or_else(|| CorpusError::Encoding {
        name: name.to_string(),
    })?;

    serde_json::from_str(contents).map_err(|source| CorpusError::Parse {
        name: name.to_string(),
        source,
    })
}

impl WordList {
    pub fn load(name: &str) -> Result<Self, CorpusError> {
        let list: WordList = read_embedded(name)?;
        if list.words.is_empty() {
            return Err(CorpusError::Empty {
                name: name.to_string(),
            });
        }
        Ok(list)
    }
}

impl PassageList {
    pub fn load() -> Result<Self, CorpusError> {
        let list: PassageList = read_embedded("passages")?;
        if list.passages.is_empty() {
            return Err(CorpusError::Empty {
                name: "passages".to_string(),
            });
        }
        Ok(list)
    }
}

/// Random words drawn with replacement from a word list
pub struct WordGenerator<R: Rng = StdRng> {
    words: Vec<String>,
    count: usize,
    rng: R,
}

impl WordGenerator<StdRng> {
    pub fn new(list: WordList, count: usize) -> Self {
        Self::with_rng(list, count, StdRng::from_entropy())
    }
}

impl<R: Rng> WordGenerator<R> {
    pub fn with_rng(list: WordList, count: usize, rng: R) -> Self {
        Self {
            words: list.words,
            count,
            rng,
        }
    }
}

impl<R: Rng> ParagraphGenerator for WordGenerator<R> {
    fn generate(&mut self) -> Paragraph {
        let words = &self.words;
        let rng = &mut self.rng;
        let text = (0..self.count)
            .filter_map(|_| words.choose(&mut *rng))
            .join(" ");
        Paragraph::new(&text)
    }
}

/// One of the fixed passages, never the same one twice in a row
pub struct PassageGenerator<R: Rng = StdRng> {
    passages: Vec<String>,
    last: Option<usize>,
    rng: R,
}

impl PassageGenerator<StdRng> {
    pub fn new(list: PassageList) -> Self {
        Self::with_rng(list, StdRng::from_entropy())
    }
}

impl<R: Rng> PassageGenerator<R> {
    pub fn with_rng(list: PassageList, rng: R) -> Self {
        Self {
            passages: list.passages,
            last: None,
            rng,
        }
    }
}

impl<R: Rng> ParagraphGenerator for PassageGenerator<R> {
    fn generate(&mut self) -> Paragraph {
        if self.passages.is_empty() {
            return Paragraph::default();
        }

        let mut idx = self.rng.gen_range(0..self.passages.len());
        if self.passages.len() > 1 && Some(idx) == self.last {
            idx = (idx + 1) % self.passages.len();
        }
        self.last = Some(idx);
        Paragraph::new(&self.passages[idx])
    }
}

/// Generated nonsense sentences, lower-cased and stripped to letters and spaces
pub struct SentenceGenerator {
    count: usize,
}

impl SentenceGenerator {
    pub fn new(count: usize) -> Self {
        Self {
            count: count.max(1),
        }
    }
}

impl ParagraphGenerator for SentenceGenerator {
    fn generate(&mut self) -> Paragraph {
        let rng = &mut rand::thread_rng();
        let text = (0..self.count)
            .map(|_| {
                cgisf(
                    rng.gen_range(1..3),
                    rng.gen_range(1..3),
                    rng.gen_range(1..5),
                    rng.gen_bool(0.5),
                    rng.gen_range(1..3),
                    rng.gen_bool(0.5),
                )
            })
            .flat_map(|s| {
                s.split_whitespace()
                    .map(|w| {
                        w.chars()
                            .filter(|c| c.is_alphabetic())
                            .collect::<String>()
                            .to_lowercase()
                    })
                    .filter(|w| !w.is_empty())
                    .collect::<Vec<_>>()
            })
            .join(" ");
        Paragraph::new(&text)
    }
}

/// Always the same text, for `--prompt` and tests
#[derive(Debug, Clone)]
pub struct FixedGenerator {
    paragraph: Paragraph,
}

impl FixedGenerator {
    pub fn new(text: &str) -> Self {
        Self {
            paragraph: Paragraph::new(text),
        }
    }
}

impl ParagraphGenerator for FixedGenerator {
    fn generate(&mut self) -> Paragraph {
        self.paragraph.clone()
    }
}

/// Settings that pick and configure a generator
#[derive(Debug, Clone)]
pub struct CorpusConfig {
    pub kind: CorpusKind,
    pub language: String,
    pub word_count: usize,
    pub custom_prompt: Option<String>,
}

pub fn build_generator(config: &CorpusConfig) -> Result<Box<dyn ParagraphGenerator>, CorpusError> {
    if let Some(ref prompt) = config.custom_prompt {
        return Ok(Box::new(FixedGenerator::new(prompt)));
    }

    let generator: Box<dyn ParagraphGenerator> = match config.kind {
        CorpusKind::Words => Box::new(WordGenerator::new(
            WordList::load(&config.language)?,
            config.word_count,
        )),
        CorpusKind::Passages => Box::new(PassageGenerator::new(PassageList::load()?)),
        // roughly six words per generated sentence
        CorpusKind::Sentences => Box::new(SentenceGenerator::new(config.word_count / 6)),
    };
    Ok(generator)
}
