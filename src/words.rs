use serde::Deserialize;
use thiserror::Error;

/// Word list used when the remote word service cannot be reached.
/// Same contents as the default list the service hands out.
pub const FALLBACK_WORDS: &[&str] = &[
    "myrmecology",
    "beater",
    "unclouded",
    "delusional",
    "overbid",
    "nomadic",
    "nones",
    "carrousel",
    "outlets",
    "templates",
    "ember",
    "novelisations",
    "glossiness",
    "controversial",
    "monocyte",
    "impugner",
    "embroiled",
    "initialism",
    "tabbies",
    "gelato",
    "physiologist",
    "delayed",
    "scriptures",
    "dribbled",
    "provisional",
    "germ",
    "hairstylists",
    "spottily",
    "elated",
    "mapping",
    "tiebreakers",
    "easters",
    "coffees",
    "conformable",
    "central",
    "capitalism",
    "germinal",
    "kilosiemens",
    "ultra",
    "humanistic",
    "formatters",
    "fortune",
    "conversions",
    "angularities",
    "aneurysm",
    "quantize",
    "contribute",
    "cephalics",
    "teeing",
    "denudes",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WordListError {
    #[error("word list is empty")]
    Empty,
    #[error("word list entry {0} is blank")]
    BlankEntry(usize),
}

/// Payload of `GET /api/words`
#[derive(Deserialize, Debug)]
pub struct WordsPayload {
    pub words: Vec<String>,
}

/// Ordered, non-empty list of lowercase prompt words
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    pub fn new<I, S>(words: I) -> Result<Self, WordListError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .enumerate()
            .map(|(idx, w)| {
                let w = w.as_ref().trim().to_lowercase();
                if w.is_empty() {
                    Err(WordListError::BlankEntry(idx))
                } else {
                    Ok(w)
                }
            })
            .collect::<Result<Vec<String>, WordListError>>()?;

        if words.is_empty() {
            return Err(WordListError::Empty);
        }

        Ok(Self { words })
    }

    pub fn fallback() -> Self {
        Self {
            words: FALLBACK_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.words.get(idx).map(String::as_str)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

impl TryFrom<WordsPayload> for WordList {
    type Error = WordListError;

    fn try_from(payload: WordsPayload) -> Result<Self, Self::Error> {
        WordList::new(payload.words)
    }
}
