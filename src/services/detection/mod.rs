// Detection Module
// Document integrity scoring organized into specialized submodules:
// - statistics: call-scoped unigram/bigram tables and sentence length moments
// - scorer: per-sentence AI-likelihood features and weighting
// - similarity: n-gram Jaccard index for internal and corpus duplicates
// - aggregation: document-level scores from sentence scores
// - analyzer: the end-to-end pipeline

pub mod aggregation;
pub mod analyzer;
pub mod scorer;
pub mod similarity;
pub mod statistics;

pub use aggregation::aggregate_sentences;
pub use analyzer::{analyze, analyze_with_store};
pub use scorer::{score_sentence, SentenceFeatures};
pub use similarity::{jaccard, ngram_set, NGramSet, SimilarityIndex, SOURCE_MIN_SIMILARITY};
pub use statistics::DocumentStatistics;
