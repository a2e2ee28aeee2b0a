// Similarity Index
// N-gram set fingerprints with Jaccard similarity, used for internal
// (within-document) and external (corpus) duplicate detection.

use crate::models::CorpusEntry;
use crate::services::text_processor::tokenize;
use std::collections::HashSet;

/// A similarity above this counts as a near-exact duplicate and stops the search.
const EARLY_EXIT_SIMILARITY: f64 = 0.98;
/// Minimum external similarity for a reference document to be named as source.
pub const SOURCE_MIN_SIMILARITY: f64 = 0.30;

pub type NGramSet = HashSet<String>;

/// Set of space-joined `n`-token windows. Empty when there are fewer than `n` tokens.
pub fn ngram_set(tokens: &[String], n: usize) -> NGramSet {
    if n == 0 || tokens.len() < n {
        return NGramSet::new();
    }
    tokens.windows(n).map(|w| w.join(" ")).collect()
}

/// |A ∩ B| / |A ∪ B|, and 0 when both sets are empty.
pub fn jaccard(a: &NGramSet, b: &NGramSet) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let inter = small.iter().filter(|g| large.contains(*g)).count();
    let union = a.len() + b.len() - inter;
    if union == 0 {
        0.0
    } else {
        inter as f64 / union as f64
    }
}

#[derive(Debug, Clone)]
pub struct ReferenceDocument {
    pub name: String,
    pub ngrams: NGramSet,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlagiarismMatch<'a> {
    pub similarity: f64,
    pub source: Option<&'a str>,
}

/// Per-call index over the document's sentences and the reference corpus.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    n: usize,
    sentence_sets: Vec<NGramSet>,
    references: Vec<ReferenceDocument>,
}

impl SimilarityIndex {
    pub fn build(sentence_tokens: &[Vec<String>], corpus: &[CorpusEntry], n: usize) -> Self {
        let sentence_sets = sentence_tokens.iter().map(|t| ngram_set(t, n)).collect();
        let references = corpus
            .iter()
            .map(|doc| ReferenceDocument {
                name: doc.name.clone(),
                ngrams: ngram_set(&tokenize(&doc.text), n),
            })
            .collect();
        Self {
            n,
            sentence_sets,
            references,
        }
    }

    pub fn ngram_size(&self) -> usize {
        self.n
    }

    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    /// Highest similarity between sentence `i` and any other sentence.
    pub fn internal_similarity(&self, i: usize) -> f64 {
        let Some(own) = self.sentence_sets.get(i) else {
            return 0.0;
        };
        let mut best = 0.0f64;
        for (j, other) in self.sentence_sets.iter().enumerate() {
            if j == i {
                continue;
            }
            best = best.max(jaccard(own, other));
            if best > EARLY_EXIT_SIMILARITY {
                break;
            }
        }
        best
    }

    /// Highest similarity between sentence `i` and any reference document.
    pub fn external_match(&self, i: usize) -> (f64, Option<&str>) {
        let Some(own) = self.sentence_sets.get(i) else {
            return (0.0, None);
        };
        let mut best = 0.0f64;
        let mut best_name: Option<&str> = None;
        for doc in &self.references {
            let sim = jaccard(own, &doc.ngrams);
            if sim > best {
                best = sim;
                best_name = Some(doc.name.as_str());
            }
            if best > EARLY_EXIT_SIMILARITY {
                break;
            }
        }
        (best, best_name)
    }

    /// Combined plagiarism similarity for sentence `i`; the source is kept only
    /// when the external match itself clears `SOURCE_MIN_SIMILARITY`.
    pub fn plagiarism(&self, i: usize) -> PlagiarismMatch<'_> {
        let internal = self.internal_similarity(i);
        let (external, name) = self.external_match(i);
        PlagiarismMatch {
            similarity: internal.max(external).clamp(0.0, 1.0),
            source: if external >= SOURCE_MIN_SIMILARITY { name } else { None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_ngram_set_short_sentence_is_empty() {
        assert!(ngram_set(&toks("a b"), 3).is_empty());
        assert_eq!(ngram_set(&toks("a b c"), 3).len(), 1);
        assert_eq!(ngram_set(&toks("a b c a b c"), 3).len(), 3);
    }

    #[test]
    fn test_jaccard() {
        let a = ngram_set(&toks("a b c d"), 3);
        let b = ngram_set(&toks("b c d e"), 3);
        // {abc, bcd} vs {bcd, cde}
        assert!((jaccard(&a, &b) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(jaccard(&a, &a), 1.0);
        assert_eq!(jaccard(&NGramSet::new(), &NGramSet::new()), 0.0);
        assert_eq!(jaccard(&a, &NGramSet::new()), 0.0);
    }

    #[test]
    fn test_internal_similarity_skips_self() {
        let sentences = vec![toks("one two three four"), toks("five six seven eight")];
        let index = SimilarityIndex::build(&sentences, &[], 3);
        assert_eq!(index.internal_similarity(0), 0.0);
        assert_eq!(index.internal_similarity(5), 0.0);
    }

    #[test]
    fn test_internal_duplicate() {
        let s = toks("the same words appear here again");
        let index = SimilarityIndex::build(&[s.clone(), toks("unrelated text goes right here"), s], &[], 5);
        assert_eq!(index.internal_similarity(0), 1.0);
        assert_eq!(index.internal_similarity(2), 1.0);
        assert_eq!(index.internal_similarity(1), 0.0);
        assert_eq!(index.plagiarism(0).source, None);
    }

    #[test]
    fn test_external_best_source() {
        let sentence = toks("alpha beta gamma delta epsilon zeta");
        let corpus = vec![
            CorpusEntry::new("weak.txt", "alpha beta gamma delta something else entirely different"),
            CorpusEntry::new("ref.txt", "Alpha beta gamma delta epsilon zeta"),
        ];
        let index = SimilarityIndex::build(&[sentence], &corpus, 3);
        assert_eq!(index.reference_count(), 2);
        let (sim, name) = index.external_match(0);
        assert_eq!(sim, 1.0);
        assert_eq!(name, Some("ref.txt"));
        let m = index.plagiarism(0);
        assert_eq!(m.similarity, 1.0);
        assert_eq!(m.source, Some("ref.txt"));
    }

    #[test]
    fn test_weak_external_match_has_no_source() {
        let sentence = toks("a b c d e f g h i j");
        // Shares only "a b c" out of many n-grams.
        let corpus = vec![CorpusEntry::new("weak.txt", "a b c x y z q r s t u v")];
        let index = SimilarityIndex::build(&[sentence], &corpus, 3);
        let m = index.plagiarism(0);
        assert!(m.similarity > 0.0 && m.similarity < SOURCE_MIN_SIMILARITY);
        assert_eq!(m.source, None);
    }
}
