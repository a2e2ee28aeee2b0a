// AcadCheck Data Models
// Shapes shared by the scoring core, the collaborators and the CLI

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_NGRAM: usize = 5;
pub const MIN_NGRAM: usize = 3;
pub const MAX_NGRAM: usize = 7;

// ============ Analysis Input ============

/// A reference document as handed to `analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusEntry {
    pub name: String,
    pub text: String,
}

impl CorpusEntry {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOptions {
    #[serde(default)]
    pub corpus: Vec<CorpusEntry>,
    /// Requested n-gram size; clamped to [3, 7], defaults to 5.
    #[serde(default)]
    pub ngram: Option<usize>,
}

impl AnalyzeOptions {
    pub fn with_corpus(corpus: Vec<CorpusEntry>) -> Self {
        Self { corpus, ngram: None }
    }

    pub fn ngram_size(&self) -> usize {
        self.ngram
            .unwrap_or(DEFAULT_NGRAM)
            .clamp(MIN_NGRAM, MAX_NGRAM)
    }
}

// ============ Analysis Output ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceScore {
    pub sentence: String,
    /// AI-likelihood, 0-100.
    pub ai: u32,
    /// Lexical overlap with other sentences or the corpus, 0-100.
    pub plagiarism: u32,
    /// Best-matching reference document, only when its similarity is >= 0.30.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub ai_score: u32,
    pub plagiarism: u32,
    pub sentences: Vec<SentenceScore>,
}

// ============ Highlighting ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightGroup {
    pub terms: Vec<String>,
    pub style: String,
}

impl HighlightGroup {
    pub fn new<I, S>(terms: I, style: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
            style: style.into(),
        }
    }
}

/// A contiguous run of the input text, plain when `style` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightSpan {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl HighlightSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }

    pub fn styled(text: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Some(style.into()),
        }
    }

    pub fn is_highlighted(&self) -> bool {
        self.style.is_some()
    }
}

// ============ Corpus Storage ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusDocument {
    pub id: Uuid,
    pub name: String,
    pub text: String,
    pub added_at: DateTime<Utc>,
}

impl From<&CorpusDocument> for CorpusEntry {
    fn from(doc: &CorpusDocument) -> Self {
        CorpusEntry {
            name: doc.name.clone(),
            text: doc.text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ngram_size_clamped() {
        let mut opts = AnalyzeOptions::default();
        assert_eq!(opts.ngram_size(), 5);
        opts.ngram = Some(1);
        assert_eq!(opts.ngram_size(), 3);
        opts.ngram = Some(12);
        assert_eq!(opts.ngram_size(), 7);
        opts.ngram = Some(4);
        assert_eq!(opts.ngram_size(), 4);
    }

    #[test]
    fn test_sentence_score_omits_missing_source() {
        let score = SentenceScore {
            sentence: "Hello there.".to_string(),
            ai: 10,
            plagiarism: 0,
            source: None,
        };
        let json = serde_json::to_string(&score).unwrap();
        assert!(!json.contains("source"));

        let report = Report::default();
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(json, r#"{"aiScore":0,"plagiarism":0,"sentences":[]}"#);
    }

    #[test]
    fn test_plain_span_serialization() {
        let span = HighlightSpan::plain("abc");
        assert_eq!(serde_json::to_string(&span).unwrap(), r#"{"text":"abc"}"#);
        assert!(!span.is_highlighted());
    }
}
