// Document Statistics
// Call-scoped frequency tables shared by the scorer and the similarity index

use std::collections::HashMap;

const VARIANCE_FLOOR: f64 = 0.0001;

/// Document-wide token statistics for one `analyze` call.
#[derive(Debug, Clone, Default)]
pub struct DocumentStatistics {
    unigram_freq: HashMap<String, usize>,
    bigram_freq: HashMap<String, usize>,
    repeated_bigrams: usize,
    repeated_bigram_ratio: f64,
    mean_len: f64,
    std_len: f64,
}

pub(crate) fn bigram_key(a: &str, b: &str) -> String {
    let mut key = String::with_capacity(a.len() + b.len() + 1);
    key.push_str(a);
    key.push(' ');
    key.push_str(b);
    key
}

impl DocumentStatistics {
    /// Build the tables from every sentence's tokens. Bigrams run across
    /// sentence boundaries, over the flattened token stream.
    pub fn build(sentence_tokens: &[Vec<String>]) -> Self {
        let mut unigram_freq: HashMap<String, usize> = HashMap::new();
        let mut bigram_freq: HashMap<String, usize> = HashMap::new();

        let mut prev: Option<&str> = None;
        for token in sentence_tokens.iter().flatten() {
            *unigram_freq.entry(token.clone()).or_insert(0) += 1;
            if let Some(p) = prev {
                *bigram_freq.entry(bigram_key(p, token)).or_insert(0) += 1;
            }
            prev = Some(token.as_str());
        }

        let repeated_bigrams = bigram_freq.values().filter(|&&c| c > 1).count();
        let repeated_bigram_ratio = if bigram_freq.is_empty() {
            0.0
        } else {
            repeated_bigrams as f64 / bigram_freq.len() as f64
        };

        let lengths: Vec<f64> = sentence_tokens.iter().map(|t| t.len() as f64).collect();
        let count = lengths.len().max(1) as f64;
        let mean_len = lengths.iter().sum::<f64>() / count;
        let variance = lengths.iter().map(|l| (l - mean_len).powi(2)).sum::<f64>() / count;
        let std_len = variance.max(VARIANCE_FLOOR).sqrt();

        Self {
            unigram_freq,
            bigram_freq,
            repeated_bigrams,
            repeated_bigram_ratio,
            mean_len,
            std_len,
        }
    }

    pub fn unigram_count(&self, token: &str) -> usize {
        self.unigram_freq.get(token).copied().unwrap_or(0)
    }

    pub fn bigram_count(&self, a: &str, b: &str) -> usize {
        self.bigram_freq.get(&bigram_key(a, b)).copied().unwrap_or(0)
    }

    pub fn distinct_bigrams(&self) -> usize {
        self.bigram_freq.len()
    }

    pub fn repeated_bigrams(&self) -> usize {
        self.repeated_bigrams
    }

    /// Share of distinct bigrams that occur more than once, 0 without bigrams.
    pub fn repeated_bigram_ratio(&self) -> f64 {
        self.repeated_bigram_ratio
    }

    /// Fraction of a sentence's own bigrams that repeat somewhere in the document.
    pub fn sentence_repetition(&self, tokens: &[String]) -> f64 {
        if tokens.len() < 2 {
            return 0.0;
        }
        let pairs = tokens.windows(2);
        let total = pairs.len();
        let repeated = pairs.filter(|w| self.bigram_count(&w[0], &w[1]) > 1).count();
        repeated as f64 / total as f64
    }

    pub fn mean_len(&self) -> f64 {
        self.mean_len
    }

    pub fn std_len(&self) -> f64 {
        self.std_len
    }
}
