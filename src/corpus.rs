use include_dir::{include_dir, Dir};
use rand::{seq::SliceRandom, Rng};
use serde::Deserialize;

use crate::error::{Error, Result};

static LANG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/lang");

/// Name of the built-in word pool.
pub const DEFAULT_CORPUS: &str = "typo";

/// Fixed pool of candidate words a trial samples from
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Corpus {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl Corpus {
    /// Load an embedded corpus by name (`src/lang/<name>.json`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCorpus`] for a missing file and [`Error::Json`]
    /// when the file does not deserialize.
    pub fn load(name: &str) -> Result<Self> {
        let file = LANG_DIR
            .get_file(format!("{name}.json"))
            .ok_or_else(|| Error::UnknownCorpus(name.to_string()))?;
        let contents = file
            .contents_utf8()
            .ok_or_else(|| Error::UnknownCorpus(name.to_string()))?;
        let corpus: Corpus = serde_json::from_str(contents)?;
        Ok(Self::from_words(corpus.name, corpus.words))
    }

    /// Build an ad-hoc corpus. Words are trimmed and blanks dropped.
    pub fn from_words<I, S>(name: impl Into<String>, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        Self {
            name: name.into(),
            size: words.len() as u32,
            words,
        }
    }

    /// Shuffle-then-take: `min(count, len)` words from distinct positions.
    pub fn sample<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<String> {
        let mut positions: Vec<usize> = (0..self.words.len()).collect();
        positions.shuffle(rng);
        positions
            .into_iter()
            .take(count)
            .map(|i| self.words[i].clone())
            .collect()
    }
}

impl Default for Corpus {
    fn default() -> Self {
        Self::load(DEFAULT_CORPUS).unwrap_or_else(|_| Self::from_words(DEFAULT_CORPUS, ["typo"]))
    }
}
