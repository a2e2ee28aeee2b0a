// AcadCheck Core Services
// Scoring core plus the corpus, extraction and config collaborators

pub mod config_store;
pub mod corpus_store;
pub mod detection;
pub mod extraction;
pub mod highlight;
pub mod text_processor;

pub use config_store::*;
pub use corpus_store::*;
pub use extraction::{extract_file, extract_text, ExtractError};
pub use highlight::{report_highlight_groups, resolve_highlights, resolve_highlights_bounded};
pub use text_processor::{segment_sentences, tokenize};

// Re-export detection module functions
pub use detection::{
    aggregate_sentences,
    analyze,
    analyze_with_store,
    DocumentStatistics,
    SentenceFeatures,
    SimilarityIndex,
};
