// Analyzer
// End-to-end pipeline: sentences -> tokens -> statistics/similarity -> scores -> report

use super::aggregation::aggregate_sentences;
use super::scorer::score_sentence;
use super::similarity::SimilarityIndex;
use super::statistics::DocumentStatistics;
use crate::models::{AnalyzeOptions, Report, SentenceScore};
use crate::services::corpus_store::CorpusStore;
use crate::services::text_processor::{segment_sentences, tokenize};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Score one document. Deterministic, synchronous and infallible: empty input
/// yields an empty report and every score is within [0, 100].
pub fn analyze(text: &str, options: &AnalyzeOptions) -> Report {
    let t0 = Instant::now();
    let n = options.ngram_size();

    let sentences = segment_sentences(text);
    if sentences.is_empty() {
        debug!("analyze.empty_input");
        return Report::default();
    }

    let sentence_tokens: Vec<Vec<String>> = sentences.iter().map(|s| tokenize(s)).collect();
    let stats = DocumentStatistics::build(&sentence_tokens);
    let index = SimilarityIndex::build(&sentence_tokens, &options.corpus, n);

    let scores: Vec<SentenceScore> = sentences
        .iter()
        .zip(sentence_tokens.iter())
        .enumerate()
        .map(|(i, (sentence, tokens))| {
            let ai = score_sentence(sentence, tokens, &stats);
            let plagiarism = index.plagiarism(i);
            SentenceScore {
                sentence: sentence.clone(),
                ai: ai.min(100),
                plagiarism: ((plagiarism.similarity * 100.0).round() as u32).min(100),
                source: plagiarism.source.map(str::to_string),
            }
        })
        .collect();

    let report = aggregate_sentences(scores);
    info!(
        sentences = report.sentences.len(),
        corpus_docs = index.reference_count(),
        ngram = n,
        ai_score = report.ai_score,
        plagiarism = report.plagiarism,
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "analyze.completed"
    );
    report
}

/// Score a document against whatever the store currently holds.
///
/// The store is read once, before scoring starts. If it cannot be read the
/// analysis still runs, with internal duplicate detection only.
pub fn analyze_with_store<S: CorpusStore + ?Sized>(
    text: &str,
    store: &S,
    ngram: Option<usize>,
) -> Report {
    let corpus = match store.list() {
        Ok(docs) => docs,
        Err(e) => {
            warn!(error = %e, "corpus.unavailable, continuing without reference documents");
            Vec::new()
        }
    };
    analyze(text, &AnalyzeOptions { corpus, ngram })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CorpusEntry;
    use crate::services::corpus_store::{CorpusError, JsonCorpusStore, MemoryCorpus};
    use uuid::Uuid;

    struct BrokenStore;

    impl CorpusStore for BrokenStore {
        fn add(&mut self, _name: &str, _text: &str) -> Result<Uuid, CorpusError> {
            Err(CorpusError::Io(std::io::Error::other("read only")))
        }
        fn list(&self) -> Result<Vec<CorpusEntry>, CorpusError> {
            Err(CorpusError::Io(std::io::Error::other("disk gone")))
        }
        fn clear(&mut self) -> Result<(), CorpusError> {
            Ok(())
        }
        fn count(&self) -> Result<usize, CorpusError> {
            Ok(0)
        }
    }

    #[test]
    fn test_analyze_empty() {
        assert_eq!(analyze("", &AnalyzeOptions::default()), Report::default());
        assert_eq!(analyze("  \n ", &AnalyzeOptions::default()), Report::default());
    }

    #[test]
    fn test_single_character() {
        let report = analyze("x", &AnalyzeOptions::default());
        assert_eq!(report.sentences.len(), 1);
        assert_eq!(report.sentences[0].plagiarism, 0);
        assert!(report.ai_score <= 100);
    }

    #[test]
    fn test_sentence_order_preserved() {
        let report = analyze(
            "Zebras graze quietly. Apples fall down. Mountains rise slowly.",
            &AnalyzeOptions::default(),
        );
        let texts: Vec<&str> = report.sentences.iter().map(|s| s.sentence.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Zebras graze quietly.", "Apples fall down.", "Mountains rise slowly."]
        );
    }

    #[test]
    fn test_internal_duplicates_have_no_source() {
        let text = "The committee approved the annual budget today. \
                    The committee approved the annual budget today.";
        let report = analyze(text, &AnalyzeOptions::default());
        assert_eq!(report.sentences.len(), 2);
        for s in &report.sentences {
            assert_eq!(s.plagiarism, 100);
            assert_eq!(s.source, None);
        }
    }

    #[test]
    fn test_store_backed_analysis() {
        let mut store = MemoryCorpus::default();
        store
            .add("ref.txt", "Researchers measured the thermal conductivity of graphene samples.")
            .unwrap();
        let report = analyze_with_store(
            "Researchers measured the thermal conductivity of graphene samples. Nothing else matched here.",
            &store,
            None,
        );
        assert_eq!(report.sentences[0].source.as_deref(), Some("ref.txt"));
        assert_eq!(report.sentences[0].plagiarism, 100);
        assert_eq!(report.sentences[1].source, None);
    }

    #[test]
    fn test_broken_store_degrades_to_internal_only() {
        let report = analyze_with_store("One short sentence here. Another one follows it.", &BrokenStore, Some(3));
        assert_eq!(report.sentences.len(), 2);
        assert!(report.sentences.iter().all(|s| s.source.is_none()));
    }

    #[test]
    fn test_corrupt_corpus_file_degrades_to_internal_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.json");
        std::fs::write(&path, "{ not a corpus").unwrap();
        let store = JsonCorpusStore::new(path);
        assert!(store.list().is_err());

        let report = analyze_with_store("One short sentence here. One short sentence here.", &store, Some(3));
        assert_eq!(report.sentences.len(), 2);
        assert!(report.sentences.iter().all(|s| s.source.is_none()));
        assert_eq!(report.plagiarism, 100);
    }
}
