#![forbid(unsafe_code)]

//! N-gram generation for the approximate full-text index.
//!
//! Text is case-folded, split into tokens on runs of anything that is not a
//! letter, a combining mark or (optionally) a digit, and every token is cut
//! into contiguous substrings of a fixed number of characters. Tokens shorter
//! than the gram length are emitted whole.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;

static SEPARATORS_WITH_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{M}\p{Nd}]+").expect("valid separator pattern"));

static SEPARATORS_WITHOUT_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{M}]+").expect("valid separator pattern"));

/// Case folding rules applied before tokenization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseLocale {
    /// Unicode default lowercase mapping.
    #[default]
    Root,
    /// Turkish/Azeri: `I` folds to dotless `ı` and `İ` folds to `i`.
    Turkic,
}

impl CaseLocale {
    pub fn lowercase(self, text: &str) -> String {
        match self {
            Self::Root => text.to_lowercase(),
            Self::Turkic => {
                let mut out = String::with_capacity(text.len());
                for ch in text.chars() {
                    match ch {
                        'I' => out.push('ı'),
                        'İ' => out.push('i'),
                        other => out.extend(other.to_lowercase()),
                    }
                }
                out
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NGramGenerator {
    gram_length: usize,
    min_token_length: usize,
    include_digits: bool,
    lowercase: bool,
    case_locale: CaseLocale,
}

impl NGramGenerator {
    /// A generator producing grams of `gram_length` characters.
    ///
    /// A zero length is treated as one.
    pub fn new(gram_length: usize) -> Self {
        Self {
            gram_length: gram_length.max(1),
            min_token_length: 1,
            include_digits: true,
            lowercase: true,
            case_locale: CaseLocale::Root,
        }
    }

    pub fn with_min_token_length(mut self, min_token_length: usize) -> Self {
        self.min_token_length = min_token_length;
        self
    }

    pub fn include_digits(mut self, include: bool) -> Self {
        self.include_digits = include;
        self
    }

    pub fn lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    pub fn case_locale(mut self, locale: CaseLocale) -> Self {
        self.case_locale = locale;
        self
    }

    pub fn gram_length(&self) -> usize {
        self.gram_length
    }

    /// Normalizes `text` the same way [`Self::grams`] does before splitting.
    pub fn normalize(&self, text: &str) -> String {
        if self.lowercase {
            self.case_locale.lowercase(text)
        } else {
            text.to_string()
        }
    }

    pub fn tokens<'a>(&self, normalized: &'a str) -> impl Iterator<Item = &'a str> {
        let separators = if self.include_digits {
            &*SEPARATORS_WITH_DIGITS
        } else {
            &*SEPARATORS_WITHOUT_DIGITS
        };
        separators.split(normalized).filter(|token| !token.is_empty())
    }

    pub fn grams(&self, text: &str) -> BTreeSet<String> {
        let normalized = self.normalize(text);
        let mut out = BTreeSet::new();
        for token in self.tokens(&normalized) {
            self.push_token_grams(token, &mut out);
        }
        out
    }

    fn push_token_grams(&self, token: &str, out: &mut BTreeSet<String>) {
        let chars: Vec<char> = token.chars().collect();
        if chars.len() < self.min_token_length {
            return;
        }
        if chars.len() <= self.gram_length {
            out.insert(token.to_string());
            return;
        }
        for window in chars.windows(self.gram_length) {
            out.insert(window.iter().collect());
        }
    }
}

impl Default for NGramGenerator {
    fn default() -> Self {
        Self::new(3)
    }
}
