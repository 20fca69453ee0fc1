//! Atom-level SMILES tokenizer
//!
//! Splits a canonical SMILES string into the symbol sequence a downstream
//! sequence model consumes: bracket atoms like `[nH]` or `[O-]` are single
//! tokens, as are the two-character elements Br and Cl.

use regex::Regex;
use thiserror::Error;

// bracket atoms first, then two-char elements before their one-char
// prefixes, aromatic atoms, bonds, branches, and ring closures (%NN or a
// single digit)
const ATOM_PATTERN: &str = r"\[[^\]]+\]|Br?|Cl?|N|O|S|P|F|I|b|c|n|o|s|p|\(|\)|\.|=|#|-|\+|\\|/|:|~|@|\?|>|\*|\$|%[0-9]{2}|[0-9]";

/// The input contains a symbol with no entry in the token vocabulary.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unrecognized symbol at byte {offset} in {smiles:?}")]
pub struct TokenizeError {
    pub smiles: String,
    pub offset: usize,
}

pub struct SmilesTokenizer {
    pattern: Regex,
}

impl SmilesTokenizer {
    pub fn new() -> Self {
        Self {
            // the pattern is a constant, so compilation cannot fail
            pattern: Regex::new(ATOM_PATTERN).expect("invalid atom pattern"),
        }
    }

    /// Split `smiles` into atom-level tokens. Every character must belong
    /// to exactly one token; a gap between matches means the string is not
    /// representable in the vocabulary and is an error. The empty string
    /// tokenizes to an empty sequence.
    pub fn tokenize(&self, smiles: &str) -> Result<Vec<String>, TokenizeError> {
        let mut tokens = Vec::new();
        let mut pos = 0;
        for m in self.pattern.find_iter(smiles) {
            if m.start() != pos {
                return Err(unrecognized(smiles, pos));
            }
            tokens.push(m.as_str().to_owned());
            pos = m.end();
        }
        if pos != smiles.len() {
            return Err(unrecognized(smiles, pos));
        }
        Ok(tokens)
    }
}

impl Default for SmilesTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

fn unrecognized(smiles: &str, offset: usize) -> TokenizeError {
    TokenizeError {
        smiles: smiles.to_owned(),
        offset,
    }
}
