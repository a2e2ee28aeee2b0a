// Highlight Resolver
// Resolves overlapping search terms into a non-overlapping span partition of the text

use crate::models::{HighlightGroup, HighlightSpan, Report, SentenceScore};
use std::collections::HashSet;
use tracing::debug;

/// Default number of text blocks scanned by `resolve_highlights_bounded`.
pub const DEFAULT_MAX_UNITS: usize = 20_000;

pub const AI_STYLE: &str = "ai";
pub const PLAGIARISM_STYLE: &str = "plagiarism";

/// One search term, case-folded, with the style of the group it came from.
#[derive(Debug, Clone)]
struct Needle<'g> {
    folded: Vec<char>,
    style: &'g str,
}

/// Per-character case folding that never changes the character count, so a
/// match in the folded text maps back onto character boundaries of the original.
fn fold(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

fn flatten_groups(groups: &[HighlightGroup]) -> Vec<Needle<'_>> {
    let mut needles: Vec<Needle<'_>> = groups
        .iter()
        .flat_map(|g| {
            g.terms
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(move |t| Needle {
                    folded: t.chars().map(fold).collect(),
                    style: g.style.as_str(),
                })
        })
        .collect();
    // Longer terms first; the sort is stable so earlier groups win exact ties.
    needles.sort_by(|a, b| b.folded.len().cmp(&a.folded.len()));
    needles
}

fn find_from(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&i| haystack[i..i + needle.len()] == *needle)
}

fn resolve_with(text: &str, needles: &[Needle<'_>]) -> Vec<HighlightSpan> {
    if text.is_empty() {
        return vec![];
    }
    if needles.is_empty() {
        return vec![HighlightSpan::plain(text)];
    }

    let folded: Vec<char> = text.chars().map(fold).collect();
    // byte offset of every char index, plus the end
    let offsets: Vec<usize> = text
        .char_indices()
        .map(|(b, _)| b)
        .chain(std::iter::once(text.len()))
        .collect();

    // Cached next occurrence per needle; only recomputed once the cursor passes it.
    let mut next: Vec<Option<usize>> = needles.iter().map(|n| find_from(&folded, &n.folded, 0)).collect();

    let mut spans = Vec::new();
    let mut cursor = 0usize;
    while cursor < folded.len() {
        let mut best: Option<(usize, usize, &str)> = None;
        for (k, needle) in needles.iter().enumerate() {
            if matches!(next[k], Some(pos) if pos < cursor) {
                next[k] = find_from(&folded, &needle.folded, cursor);
            }
            let Some(start) = next[k] else {
                continue;
            };
            let len = needle.folded.len();
            let better = match best {
                None => true,
                Some((b_start, b_len, _)) => start < b_start || (start == b_start && len > b_len),
            };
            if better {
                best = Some((start, len, needle.style));
            }
        }

        let Some((start, len, style)) = best else {
            break;
        };
        if start > cursor {
            spans.push(HighlightSpan::plain(&text[offsets[cursor]..offsets[start]]));
        }
        let end = start + len;
        spans.push(HighlightSpan::styled(&text[offsets[start]..offsets[end]], style));
        cursor = end;
    }

    if cursor < folded.len() {
        spans.push(HighlightSpan::plain(&text[offsets[cursor]..]));
    }
    spans
}

/// Partition `text` into plain and highlighted spans.
///
/// Matching is case-insensitive exact substring search. Scanning left to
/// right, the earliest match wins and a tie at the same start goes to the
/// longer term, so "hello world" beats "hello". Concatenating the returned
/// spans reproduces `text` exactly; empty text yields no spans.
pub fn resolve_highlights(text: &str, groups: &[HighlightGroup]) -> Vec<HighlightSpan> {
    resolve_with(text, &flatten_groups(groups))
}

/// Resolve highlights over many independent text blocks with a cap on the
/// number of blocks scanned. Blocks past the cap come back as a single plain
/// span: they were not scanned. Whitespace-only blocks are never scanned and
/// do not count against the cap.
pub fn resolve_highlights_bounded<S: AsRef<str>>(
    blocks: &[S],
    groups: &[HighlightGroup],
    max_units: usize,
) -> Vec<Vec<HighlightSpan>> {
    let needles = flatten_groups(groups);
    let mut processed = 0usize;
    let mut capped = false;

    let out: Vec<Vec<HighlightSpan>> = blocks
        .iter()
        .map(|block| {
            let text = block.as_ref();
            if text.trim().is_empty() {
                return plain_block(text);
            }
            if processed >= max_units {
                capped = true;
                return plain_block(text);
            }
            processed += 1;
            resolve_with(text, &needles)
        })
        .collect();

    if capped {
        debug!(max_units, blocks = blocks.len(), "highlight.cap_reached");
    }
    out
}

fn plain_block(text: &str) -> Vec<HighlightSpan> {
    if text.is_empty() {
        vec![]
    } else {
        vec![HighlightSpan::plain(text)]
    }
}

fn unique_sentences<'a>(it: impl Iterator<Item = &'a SentenceScore>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for s in it {
        if seen.insert(s.sentence.as_str()) {
            out.push(s.sentence.clone());
        }
    }
    out
}

/// Sentences whose `key` clears the first threshold that selects anything,
/// falling back to the top 10% (at least one) by `key`.
fn select_terms(sentences: &[SentenceScore], thresholds: &[u32], key: fn(&SentenceScore) -> u32) -> Vec<String> {
    for &t in thresholds {
        let terms = unique_sentences(sentences.iter().filter(|s| key(s) >= t));
        if !terms.is_empty() {
            return terms;
        }
    }
    if sentences.is_empty() {
        return vec![];
    }
    let top = ((sentences.len() as f64 * 0.1).ceil() as usize).max(1);
    let mut ranked: Vec<&SentenceScore> = sentences.iter().collect();
    ranked.sort_by(|a, b| key(b).cmp(&key(a)));
    unique_sentences(ranked.into_iter().take(top))
}

/// Highlight groups for rendering a report: the AI group first, then the
/// plagiarism group, which stays empty when the document plagiarism is 0.
pub fn report_highlight_groups(report: &Report) -> Vec<HighlightGroup> {
    let ai_terms = select_terms(&report.sentences, &[70, 50], |s| s.ai);
    let plagiarism_terms = if report.plagiarism == 0 {
        vec![]
    } else {
        select_terms(&report.sentences, &[50, 40], |s| s.plagiarism)
    };

    vec![
        HighlightGroup::new(ai_terms, AI_STYLE),
        HighlightGroup::new(plagiarism_terms, PLAGIARISM_STYLE),
    ]
}
