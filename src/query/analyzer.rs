//! Keyword extraction on top of an external morphological analyzer

use crate::error::{Error, Result};

/// Part-of-speech tags relevant to keyword selection
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PosTag {
    /// General noun (NNG)
    CommonNoun,
    /// Proper noun (NNP)
    ProperNoun,
    /// Foreign-script token (SL)
    Foreign,
    /// Any other tag, kept verbatim
    Other(String),
}

impl PosTag {
    /// Map an analyzer tag name, case-insensitively
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "nng" => Self::CommonNoun,
            "nnp" => Self::ProperNoun,
            "sl" => Self::Foreign,
            _ => Self::Other(name.to_string()),
        }
    }
}

/// One analyzed token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub form: String,
    pub tag: PosTag,
}

impl Token {
    pub fn new(form: impl Into<String>, tag: PosTag) -> Self {
        Self {
            form: form.into(),
            tag,
        }
    }

    /// Nouns of at least two characters, and foreign tokens of any length
    pub fn is_keyword(&self) -> bool {
        match self.tag {
            PosTag::CommonNoun | PosTag::ProperNoun => self.form.chars().count() >= 2,
            PosTag::Foreign => !self.form.is_empty(),
            PosTag::Other(_) => false,
        }
    }
}

/// Keyword forms in token order; duplicates are kept
pub fn select_keywords(tokens: &[Token]) -> Vec<String> {
    tokens
        .iter()
        .filter(|t| t.is_keyword())
        .map(|t| t.form.clone())
        .collect()
}

/// Comma-joined list with a trailing comma, the analyzer's wire format
pub fn join_terms<S: AsRef<str>>(terms: &[S]) -> String {
    terms.iter().fold(String::new(), |mut out, term| {
        out.push_str(term.as_ref());
        out.push(',');
        out
    })
}

/// Parse a comma-joined term list; whitespace is trimmed and empty entries dropped
pub fn parse_term_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// A loaded morphological analyzer
pub trait TermExtractor {
    fn analyze(&self, text: &str) -> Result<Vec<Token>>;
}

/// Owner of a stateful extractor with an explicit lifecycle.
///
/// Loading happens once in [`ExtractorHandle::initialize`]; extraction before
/// that fails with [`Error::NotInitialized`].
pub struct ExtractorHandle<E> {
    extractor: Option<E>,
}

impl<E: TermExtractor> ExtractorHandle<E> {
    pub fn new() -> Self {
        Self { extractor: None }
    }

    pub fn is_initialized(&self) -> bool {
        self.extractor.is_some()
    }

    /// Load the extractor with `load`. Succeeds without calling `load` if
    /// already initialized.
    pub fn initialize<F>(&mut self, load: F) -> Result<()>
    where
        F: FnOnce() -> Result<E>,
    {
        if self.extractor.is_none() {
            self.extractor = Some(load()?);
            tracing::info!("term extractor initialized");
        }
        Ok(())
    }

    /// Keywords of `text`, in order
    pub fn extract(&self, text: &str) -> Result<Vec<String>> {
        let extractor = self
            .extractor
            .as_ref()
            .ok_or(Error::NotInitialized("term extractor"))?;
        Ok(select_keywords(&extractor.analyze(text)?))
    }

    /// Drop the loaded extractor; returns whether one was loaded
    pub fn teardown(&mut self) -> bool {
        self.extractor.take().is_some()
    }
}

impl<E: TermExtractor> Default for ExtractorHandle<E> {
    fn default() -> Self {
        Self::new()
    }
}
