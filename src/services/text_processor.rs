// Text Processing Service
// Sentence segmentation, tokenization and small lexical counters

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::warn;

const SENTENCE_SENTINEL: char = '\x00';

fn sentence_boundary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Rust regex has no lookahead: the character that opens the next sentence
    // is consumed here and put back behind the sentinel.
    RE.get_or_init(|| {
        Regex::new(r#"([.!?])\s+([\p{Lu}0-9“(\[])"#).expect("sentence boundary regex")
    })
}

/// Split raw text into trimmed, non-empty sentences.
///
/// A boundary is `.`, `!` or `?` followed by whitespace and then an uppercase
/// letter, a digit, an opening quote or a bracket. Abbreviations such as
/// "Dr. Smith" split too; that is accepted.
pub fn segment_sentences(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return vec![];
    }

    let marked = sentence_boundary_re().replace_all(text, "${1}\x00${2}");
    marked
        .split(SENTENCE_SENTINEL)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn unicode_token_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| match Regex::new(r"[\p{L}\p{N}']+") {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(error = %e, "tokenizer.unicode_unavailable, using latin fallback");
            None
        }
    })
    .as_ref()
}

fn latin_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-zÀ-ÖØ-öø-ÿ0-9']+").expect("latin token regex"))
}

/// Lowercase word/number tokens of a sentence. Apostrophes stay inside tokens.
pub fn tokenize(sentence: &str) -> Vec<String> {
    match unicode_token_re() {
        Some(re) => collect_tokens(re, sentence),
        None => tokenize_latin(sentence),
    }
}

/// Tokenizer restricted to ASCII plus the Latin-1 accented range.
pub fn tokenize_latin(sentence: &str) -> Vec<String> {
    collect_tokens(latin_token_re(), sentence)
}

fn collect_tokens(re: &Regex, sentence: &str) -> Vec<String> {
    let lower = sentence.to_lowercase();
    re.find_iter(&lower).map(|m| m.as_str().to_string()).collect()
}

/// Shannon entropy of the text in bits per character.
pub fn char_entropy(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let mut freq: HashMap<char, usize> = HashMap::new();
    let mut n = 0usize;
    for ch in text.chars() {
        *freq.entry(ch).or_insert(0) += 1;
        n += 1;
    }
    let n = n as f64;
    freq.values()
        .map(|&c| {
            let p = c as f64 / n;
            -p * p.log2()
        })
        .sum()
}

/// Count of punctuation marks that humans tend to sprinkle through prose.
pub fn count_punctuation(text: &str) -> usize {
    text.chars()
        .filter(|c| {
            matches!(
                c,
                ',' | ':' | ';' | '-' | '—' | '(' | ')' | '[' | ']' | '“' | '”' | '"' | '\'' | '…'
            )
        })
        .count()
}

pub fn count_digits(text: &str) -> usize {
    text.chars().filter(|c| c.is_ascii_digit()).count()
}
