// AI Scorer
// Per-sentence stylometric features combined into a 0-100 AI-likelihood score.
//
// The weights and centers below are heuristically tuned; keep their literal
// values so scores stay comparable across releases.

use super::statistics::DocumentStatistics;
use crate::services::text_processor::{char_entropy, count_digits, count_punctuation};
use std::collections::HashSet;

const W_BURSTINESS: f64 = 0.22;
const W_TTR: f64 = 0.18;
const W_STOPWORD_MID: f64 = 0.12;
const W_AVG_WORD_LEN: f64 = 0.12;
const W_ENTROPY: f64 = 0.10;
const W_DOC_REPETITION: f64 = 0.10;
const W_SENT_REPETITION: f64 = 0.10;
const W_PUNCTUATION: f64 = 0.06;
const DIGIT_PENALTY: f64 = 0.08;

const STOPWORD_CENTER: f64 = 0.45;
const ENTROPY_CENTER: f64 = 3.5;

/// English-biased function words. Non-English text scores low on the
/// stopword feature; that is a known limitation of the heuristic.
const STOPWORDS: &[&str] = &[
    "the", "of", "and", "to", "in", "a", "is", "that", "for", "on", "with", "as", "by", "it",
    "be", "are", "this", "an", "or", "from", "at", "which", "but", "not", "we", "our", "their",
    "also", "can", "have", "has", "was", "were", "than", "these", "those", "such", "may", "more",
    "most", "any", "all", "some", "into", "between", "over", "under", "about", "after", "before",
    "during", "through", "per", "i", "you", "he", "she", "they", "them", "his", "her", "its",
    "there", "here",
];

fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

/// Normalized sentence features, each in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SentenceFeatures {
    pub burstiness: f64,
    pub ttr_score: f64,
    pub stopword_mid: f64,
    pub avg_word_len: f64,
    pub entropy: f64,
    pub doc_repetition: f64,
    pub sentence_repetition: f64,
    pub punctuation: f64,
    /// Applied as a penalty after the weighted sum.
    pub digit_density: f64,
    /// Mean document frequency of the sentence's tokens. Diagnostic only, unweighted.
    pub token_concentration: f64,
}

impl SentenceFeatures {
    pub fn extract(sentence: &str, tokens: &[String], stats: &DocumentStatistics) -> Self {
        let total = tokens.len();

        let burstiness = 1.0 - ((total as f64 - stats.mean_len()).abs() / stats.std_len()).min(1.0);

        let ttr_score = if total == 0 {
            1.0
        } else {
            let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
            1.0 - unique.len() as f64 / total as f64
        };

        let stopword_ratio = if total == 0 {
            0.0
        } else {
            tokens.iter().filter(|t| is_stopword(t)).count() as f64 / total as f64
        };
        let stopword_mid =
            1.0 - ((stopword_ratio - STOPWORD_CENTER).abs() / STOPWORD_CENTER).min(1.0);

        let avg_len = if total == 0 {
            0.0
        } else {
            tokens.iter().map(|t| t.chars().count()).sum::<usize>() as f64 / total as f64
        };
        let avg_word_len = ((avg_len - 4.0) / 4.0).clamp(0.0, 1.0);

        let entropy =
            1.0 - ((char_entropy(sentence) - ENTROPY_CENTER).abs() / ENTROPY_CENTER).min(1.0);

        let punctuation = (count_punctuation(sentence) as f64 / 8.0).min(1.0);
        let digit_density = (count_digits(sentence) as f64 / 6.0).min(1.0);

        let concentration = tokens.iter().map(|t| stats.unigram_count(t)).sum::<usize>() as f64
            / total.max(1) as f64;
        let token_concentration = ((concentration - 1.0) / 5.0).clamp(0.0, 1.0);

        Self {
            burstiness,
            ttr_score,
            stopword_mid,
            avg_word_len,
            entropy,
            doc_repetition: stats.repeated_bigram_ratio(),
            sentence_repetition: stats.sentence_repetition(tokens),
            punctuation,
            digit_density,
            token_concentration,
        }
    }

    pub fn weighted_sum(&self) -> f64 {
        W_BURSTINESS * self.burstiness
            + W_TTR * self.ttr_score
            + W_STOPWORD_MID * self.stopword_mid
            + W_AVG_WORD_LEN * self.avg_word_len
            + W_ENTROPY * self.entropy
            + W_DOC_REPETITION * self.doc_repetition
            + W_SENT_REPETITION * self.sentence_repetition
            + W_PUNCTUATION * self.punctuation
    }

    /// Heuristic score in [0, 1]: the weighted sum less the digit penalty, clamped.
    pub fn score(&self) -> f64 {
        let score = (self.weighted_sum() - DIGIT_PENALTY * self.digit_density).max(0.0);
        if score.is_nan() {
            return 0.0;
        }
        score.clamp(0.0, 1.0)
    }
}

/// AI-likelihood of one sentence, 0-100.
pub fn score_sentence(sentence: &str, tokens: &[String], stats: &DocumentStatistics) -> u32 {
    let features = SentenceFeatures::extract(sentence, tokens, stats);
    (features.score() * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::text_processor::tokenize;

    fn score_alone(sentence: &str) -> (SentenceFeatures, u32) {
        let tokens = tokenize(sentence);
        let stats = DocumentStatistics::build(std::slice::from_ref(&tokens));
        let features = SentenceFeatures::extract(sentence, &tokens, &stats);
        (features, score_sentence(sentence, &tokens, &stats))
    }

    #[test]
    fn test_stopword_list_size() {
        let unique: HashSet<&str> = STOPWORDS.iter().copied().collect();
        assert_eq!(unique.len(), STOPWORDS.len());
        assert!(is_stopword("the"));
        assert!(!is_stopword("analysis"));
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total = W_BURSTINESS
            + W_TTR
            + W_STOPWORD_MID
            + W_AVG_WORD_LEN
            + W_ENTROPY
            + W_DOC_REPETITION
            + W_SENT_REPETITION
            + W_PUNCTUATION;
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_sentence_is_not_bursty() {
        let (features, _) = score_alone("The quick brown fox jumps over the lazy dog.");
        assert_eq!(features.burstiness, 1.0);
        // "the" twice out of nine tokens
        assert!((features.ttr_score - (1.0 - 8.0 / 9.0)).abs() < 1e-12);
        assert_eq!(features.doc_repetition, 0.0);
        assert_eq!(features.sentence_repetition, 0.0);
    }

    #[test]
    fn test_all_features_in_unit_range() {
        for s in [
            "",
            "x",
            "1234567890 1234567890",
            "Internationalization considerations notwithstanding, standardization prevails.",
            "a a a a a a a a a a a a",
        ] {
            let (f, score) = score_alone(s);
            for v in [
                f.burstiness,
                f.ttr_score,
                f.stopword_mid,
                f.avg_word_len,
                f.entropy,
                f.doc_repetition,
                f.sentence_repetition,
                f.punctuation,
                f.digit_density,
                f.token_concentration,
            ] {
                assert!((0.0..=1.0).contains(&v), "feature out of range for {:?}: {:?}", s, f);
            }
            assert!(score <= 100);
        }
    }

    #[test]
    fn test_digits_reduce_score() {
        let tokens = tokenize("Revenue grew strongly across every region this year.");
        let stats = DocumentStatistics::build(std::slice::from_ref(&tokens));
        let base = SentenceFeatures::extract(
            "Revenue grew strongly across every region this year.",
            &tokens,
            &stats,
        );
        let mut with_digits = base;
        with_digits.digit_density = 1.0;
        assert!(with_digits.score() < base.score());
        assert!((base.score() - with_digits.score() - 0.08).abs() < 1e-9);
    }

    #[test]
    fn test_long_words_raise_avg_len_feature() {
        let (short, _) = score_alone("I am on it.");
        let (long, _) = score_alone("Extraordinarily sophisticated methodologies.");
        assert_eq!(short.avg_word_len, 0.0);
        assert!(long.avg_word_len > 0.9);
    }
}
