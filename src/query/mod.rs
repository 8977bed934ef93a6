//! Query construction: extracted keywords to a 0/1 vector over a vocabulary
//!
//! The morphological analyzer itself is external; it plugs in through
//! [`TermExtractor`] and is owned by an [`ExtractorHandle`].

mod analyzer;
mod vocab;

pub use analyzer::{
    join_terms, parse_term_list, select_keywords, ExtractorHandle, PosTag, TermExtractor, Token,
};
pub use vocab::{QueryVector, Vocabulary};
