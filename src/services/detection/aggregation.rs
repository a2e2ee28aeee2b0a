// Aggregation Logic
// Aggregates sentence scores into the document report

use crate::models::{Report, SentenceScore};

const PLAGIARISM_PERCENTILE: f64 = 0.95;

/// Aggregate sentence scores into the document report.
///
/// `ai_score` is the rounded mean of sentence `ai` values. `plagiarism` is the
/// 95th percentile of sentence `plagiarism` values rather than the mean, so a
/// single heavily duplicated sentence dominates the document score.
pub fn aggregate_sentences(sentences: Vec<SentenceScore>) -> Report {
    if sentences.is_empty() {
        return Report::default();
    }

    let ai_score = mean_score(&sentences);
    let plagiarism = percentile_plagiarism(&sentences);

    Report {
        ai_score,
        plagiarism,
        sentences,
    }
}

fn mean_score(sentences: &[SentenceScore]) -> u32 {
    let total: u64 = sentences.iter().map(|s| u64::from(s.ai.min(100))).sum();
    let mean = total as f64 / sentences.len() as f64;
    mean.round().clamp(0.0, 100.0) as u32
}

fn percentile_plagiarism(sentences: &[SentenceScore]) -> u32 {
    let mut values: Vec<u32> = sentences.iter().map(|s| s.plagiarism.min(100)).collect();
    values.sort_unstable();
    let idx = (PLAGIARISM_PERCENTILE * (values.len() - 1) as f64).floor() as usize;
    values[idx.min(values.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(ai: u32, plagiarism: u32) -> SentenceScore {
        SentenceScore {
            sentence: format!("s{}-{}", ai, plagiarism),
            ai,
            plagiarism,
            source: None,
        }
    }

    #[test]
    fn test_aggregate_empty() {
        let report = aggregate_sentences(Vec::new());
        assert_eq!(report.ai_score, 0);
        assert_eq!(report.plagiarism, 0);
        assert!(report.sentences.is_empty());
    }

    #[test]
    fn test_percentile_of_eleven() {
        let sentences: Vec<SentenceScore> = (0..=10).rev().map(|i| score(0, i * 10)).collect();
        let report = aggregate_sentences(sentences);
        assert_eq!(report.plagiarism, 90);
        // order of sentences is untouched
        assert_eq!(report.sentences[0].plagiarism, 100);
    }

    #[test]
    fn test_percentile_index_small_documents() {
        let report = aggregate_sentences(vec![score(10, 0), score(10, 0), score(10, 100)]);
        // floor(0.95 * 2) = 1 -> second smallest
        assert_eq!(report.plagiarism, 0);
        let report = aggregate_sentences(vec![score(10, 0), score(10, 100)]);
        assert_eq!(report.plagiarism, 0);
        let report = aggregate_sentences(vec![score(10, 100)]);
        assert_eq!(report.plagiarism, 100);
    }

    #[test]
    fn test_ai_mean_rounds() {
        let report = aggregate_sentences(vec![score(10, 0), score(21, 0)]);
        assert_eq!(report.ai_score, 16);
        let report = aggregate_sentences(vec![score(10, 0), score(20, 0), score(20, 0)]);
        assert_eq!(report.ai_score, 17);
    }
}
