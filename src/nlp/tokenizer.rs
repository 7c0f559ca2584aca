//! Unicode-aware tokenization
//!
//! This module provides UAX #29 word segmentation with token classification.
//! URLs and e-mail addresses are recognized on whitespace-delimited chunks
//! before segmentation, since UAX #29 would split them apart.

use crate::types::{FieldKind, Token, TokenType};
use unicode_segmentation::UnicodeSegmentation;

/// Characters peeled off a chunk before testing it for a URL or e-mail
const WRAPPING_PUNCTUATION: &[char] = &[
    '(', ')', '[', ']', '<', '>', '"', '\'', ',', '.', ';', ':', '!', '?',
];

/// A Unicode-aware tokenizer following UAX #29
#[derive(Debug, Clone)]
pub struct Tokenizer {
    /// Minimum length (in chars) of a word token
    min_token_length: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    /// Create a new tokenizer with default settings
    pub fn new() -> Self {
        Self {
            min_token_length: 1,
        }
    }

    /// Set minimum word token length
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_token_length = min_length;
        self
    }

    /// Tokenize one field into classified tokens.
    ///
    /// Whitespace is dropped; punctuation is kept as
    /// [`TokenType::Punctuation`] so that downstream stages can break phrases
    /// on it. `normalized` holds the lowercased surface form; stemming is
    /// applied later by the analyzer.
    pub fn tokenize(&self, text: &str, field: FieldKind) -> Vec<Token> {
        let mut tokens = Vec::new();

        for (chunk_start, chunk) in whitespace_chunks(text) {
            if let Some((core_start, core_type)) = Self::link_core(chunk) {
                let core = chunk[core_start..].trim_end_matches(WRAPPING_PUNCTUATION);
                let core_end = core_start + core.len();
                self.push_segments(&mut tokens, &chunk[..core_start], chunk_start, field);
                tokens.push(Token::new(
                    core,
                    core.to_lowercase(),
                    core_type,
                    field,
                    chunk_start + core_start,
                    chunk_start + core_end,
                ));
                self.push_segments(&mut tokens, &chunk[core_end..], chunk_start + core_end, field);
                continue;
            }

            self.push_segments(&mut tokens, chunk, chunk_start, field);
        }

        tokens
    }

    /// Segment `text` with UAX #29 and append the classified pieces
    fn push_segments(&self, tokens: &mut Vec<Token>, text: &str, offset: usize, field: FieldKind) {
        for (start, piece) in text.split_word_bound_indices() {
            let token_type = match Self::classify(piece) {
                Some(t) => t,
                None => continue,
            };

            if token_type == TokenType::Word && piece.chars().count() < self.min_token_length {
                continue;
            }

            let abs_start = offset + start;
            tokens.push(Token::new(
                piece,
                piece.to_lowercase(),
                token_type,
                field,
                abs_start,
                abs_start + piece.len(),
            ));
        }
    }

    /// Classify a single UAX #29 segment. Whitespace yields `None`.
    pub fn classify(piece: &str) -> Option<TokenType> {
        if piece.chars().all(char::is_whitespace) {
            return None;
        }

        if !piece.chars().any(char::is_alphanumeric) {
            return Some(TokenType::Punctuation);
        }

        if piece.starts_with(|c: char| c.is_ascii_digit())
            && piece
                .chars()
                .all(|c| c.is_ascii_digit() || c == '.' || c == ',')
        {
            return Some(TokenType::Number);
        }

        if Self::is_acronym(piece) {
            return Some(TokenType::Acronym);
        }

        Some(TokenType::Word)
    }

    /// `NASA`, `U.S.A`: at least two uppercase letters, nothing but letters and dots
    fn is_acronym(piece: &str) -> bool {
        let mut letters = 0;
        for c in piece.chars() {
            if c.is_alphabetic() {
                if !c.is_uppercase() {
                    return false;
                }
                letters += 1;
            } else if c != '.' {
                return false;
            }
        }
        letters >= 2
    }

    /// If the chunk (minus wrapping punctuation) is a URL or e-mail address,
    /// return the byte offset where it starts within the chunk and its type.
    fn link_core(chunk: &str) -> Option<(usize, TokenType)> {
        let core = chunk.trim_start_matches(WRAPPING_PUNCTUATION);
        let core_start = chunk.len() - core.len();
        let core = core.trim_end_matches(WRAPPING_PUNCTUATION);
        if core.is_empty() {
            return None;
        }

        if is_url(core) {
            Some((core_start, TokenType::Url))
        } else if is_email(core) {
            Some((core_start, TokenType::Email))
        } else {
            None
        }
    }
}

fn is_url(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    ["http://", "https://", "www."]
        .iter()
        .any(|prefix| lower.starts_with(prefix) && lower.len() > prefix.len())
}

fn is_email(s: &str) -> bool {
    let mut parts = s.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };
    let valid_chars = |part: &str| {
        part.chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | '+'))
    };
    !local.is_empty()
        && valid_chars(local)
        && valid_chars(domain)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Maximal runs of non-whitespace with their byte offsets
fn whitespace_chunks(text: &str) -> Vec<(usize, &str)> {
    let mut chunks = Vec::new();
    let mut start = None;

    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                chunks.push((s, &text[s..i]));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        chunks.push((s, &text[s..]));
    }

    chunks
}
