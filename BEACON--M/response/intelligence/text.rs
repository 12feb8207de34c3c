use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\p{Alphabetic}\p{N}\s]").expect("static tokenizer pattern is valid")
});

/// Lowercases `text`, blanks out punctuation and splits on whitespace.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_WORD
        .replace_all(&lowered, " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Tokens of one narrative plus the two lookup forms the matchers need.
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    tokens: Vec<String>,
    set: HashSet<String>,
    joined: String,
}

impl TokenStream {
    /// Tokenizes the narrative.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::from_tokens(tokenize(text))
    }

    /// Wraps an already tokenized sequence.
    #[must_use]
    pub fn from_tokens(tokens: Vec<String>) -> Self {
        let set = tokens.iter().cloned().collect();
        let joined = tokens.join(" ");
        Self {
            tokens,
            set,
            joined,
        }
    }

    /// Tokens in narrative order.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// True when the narrative produced no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Single-word membership.
    #[must_use]
    pub fn contains_word(&self, word: &str) -> bool {
        self.set.contains(word)
    }

    /// Substring match against the space-joined tokens.
    #[must_use]
    pub fn contains_phrase(&self, phrase: &str) -> bool {
        self.joined.contains(phrase)
    }

    /// Phrases (terms with a space) match as substrings, single words by membership.
    #[must_use]
    pub fn matches_term(&self, term: &str) -> bool {
        if is_phrase(term) {
            self.contains_phrase(term)
        } else {
            self.contains_word(term)
        }
    }
}

/// Whether a keyword spans more than one word.
#[must_use]
pub fn is_phrase(term: &str) -> bool {
    term.contains(' ')
}
