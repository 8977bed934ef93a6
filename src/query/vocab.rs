//! Term vocabulary and 0/1 query vectors

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Ordered term list; a term's position is its slot index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
}

impl From<Vec<String>> for Vocabulary {
    fn from(terms: Vec<String>) -> Self {
        let mut vocab = Self::default();
        for term in terms {
            vocab.insert(term);
        }
        vocab
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocab: Vocabulary) -> Self {
        vocab.terms
    }
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from terms, rejecting vocabularies larger than `slot_count`
    pub fn with_terms<I, S>(terms: I, slot_count: usize) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let vocab = Self::from(terms.into_iter().map(Into::into).collect::<Vec<_>>());
        if vocab.len() > slot_count {
            return Err(Error::InvalidInput(format!(
                "vocabulary of {} terms exceeds slot capacity {slot_count}",
                vocab.len()
            )));
        }
        Ok(vocab)
    }

    /// Slot index of `term`, appending it if new
    pub fn insert(&mut self, term: impl Into<String>) -> usize {
        let term = term.into();
        if let Some(&i) = self.index.get(&term) {
            return i;
        }
        let i = self.terms.len();
        self.index.insert(term.clone(), i);
        self.terms.push(term);
        i
    }

    pub fn get(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Membership flags over a vocabulary, ready for encryption
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryVector(Vec<u64>);

impl QueryVector {
    /// 1 at the slot of every known term, 0 elsewhere; unknown terms are ignored
    pub fn from_terms<S: AsRef<str>>(terms: &[S], vocab: &Vocabulary) -> Self {
        let mut flags = vec![0u64; vocab.len()];
        for i in terms.iter().filter_map(|t| vocab.get(t.as_ref())) {
            flags[i] = 1;
        }
        Self(flags)
    }

    /// From a comma-joined term list
    pub fn from_term_list(text: &str, vocab: &Vocabulary) -> Self {
        Self::from_terms(&super::parse_term_list(text), vocab)
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of set flags
    pub fn count_ones(&self) -> usize {
        self.0.iter().filter(|&&v| v != 0).count()
    }

    pub fn into_inner(self) -> Vec<u64> {
        self.0
    }
}
