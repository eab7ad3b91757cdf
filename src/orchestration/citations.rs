//! Annotation resolution: inline `[n]` markers and the citation list.
//!
//! [`resolve_message`] is pure and shared by the polling and streaming
//! drivers. Document names are looked up beforehand by
//! [`CitationResolver`], so the resolution itself never touches the network.

use std::collections::{BTreeSet, HashMap};
use std::ops::Range;
use std::sync::Arc;

use futures_util::future::join_all;
use thiserror::Error;
use tracing::{debug, warn};

use super::outcome::{Answer, CitationRecord};
use crate::remote::{Annotation, AssistantBackend, Lookup, Message, TextContent};

/// Document id to display name. Absent ids fall back to the raw id.
pub type DocumentLabels = HashMap<String, String>;

/// Why a single annotation was skipped.
#[derive(Debug, Error, PartialEq)]
pub enum AnnotationError {
    /// A citation without a document id.
    #[error("citation annotation has an empty document id")]
    EmptyDocumentId,
}

/// Resolve a finished message into answer text and citations.
///
/// Text parts are processed independently; ordinals restart at 0 for each
/// part. Resolved parts are joined with `\n` and the result is trimmed.
pub fn resolve_message(message: &Message, labels: &DocumentLabels) -> Answer {
    let mut parts = Vec::new();
    let mut citations = Vec::new();

    for text in message.text_parts() {
        let (resolved, part_citations) = resolve_text(text, labels);
        citations.extend(part_citations);
        if !resolved.is_empty() {
            parts.push(resolved);
        }
    }

    Answer {
        text: parts.join("\n").trim().to_string(),
        citations,
    }
}

/// Resolve one text part.
pub fn resolve_text(text: &TextContent, labels: &DocumentLabels) -> (String, Vec<CitationRecord>) {
    let mut claims = SpanClaims::new(&text.value);
    let mut citations = Vec::new();

    for (ordinal, annotation) in text.annotations.iter().enumerate() {
        match resolve_annotation(ordinal, annotation, &mut claims, labels) {
            Ok(Some(citation)) => citations.push(citation),
            Ok(None) => {}
            Err(e) => warn!(ordinal, error = %e, "skipping annotation"),
        }
    }

    (claims.render(), citations)
}

fn resolve_annotation(
    ordinal: usize,
    annotation: &Annotation,
    claims: &mut SpanClaims<'_>,
    labels: &DocumentLabels,
) -> Result<Option<CitationRecord>, AnnotationError> {
    let document = match annotation.cited_document() {
        Some(reference) if reference.file_id.trim().is_empty() => {
            return Err(AnnotationError::EmptyDocumentId)
        }
        Some(reference) => Some(reference.file_id.as_str()),
        None => None,
    };

    if let Some(span) = annotation.text.as_deref().filter(|s| !s.is_empty()) {
        if !claims.claim(span, ordinal) {
            debug!(ordinal, span, "annotation span not found in text");
        }
    }

    Ok(document.map(|id| CitationRecord {
        ordinal,
        label: labels.get(id).cloned().unwrap_or_else(|| id.to_string()),
    }))
}

/// Non-overlapping span replacements over the original text.
///
/// Matches are recorded against the original text and markers are only
/// inserted by [`SpanClaims::render`], so a span can never match inside a
/// marker or inside an earlier replacement.
struct SpanClaims<'a> {
    text: &'a str,
    claims: Vec<(Range<usize>, usize)>,
}

impl<'a> SpanClaims<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            claims: Vec::new(),
        }
    }

    /// Claim the earliest occurrence of `span` not already claimed.
    fn claim(&mut self, span: &str, ordinal: usize) -> bool {
        match self.find_unclaimed(span) {
            Some(start) => {
                self.claims.push((start..start + span.len(), ordinal));
                true
            }
            None => false,
        }
    }

    /// First occurrence that overlaps no claim.
    fn find_unclaimed(&self, span: &str) -> Option<usize> {
        let mut pos = 0;
        while pos <= self.text.len() {
            let start = pos + self.text[pos..].find(span)?;
            let end = start + span.len();
            if !self.claims.iter().any(|(r, _)| r.start < end && start < r.end) {
                return Some(start);
            }
            pos = start + self.text[start..].chars().next().map_or(1, char::len_utf8);
        }
        None
    }

    fn render(mut self) -> String {
        self.claims.sort_by_key(|(range, _)| range.start);

        let mut out = String::with_capacity(self.text.len());
        let mut last = 0;
        for (range, ordinal) in &self.claims {
            out.push_str(&self.text[last..range.start]);
            out.push_str(&format!("[{}]", ordinal));
            last = range.end;
        }
        out.push_str(&self.text[last..]);
        out
    }
}

/// Looks up document names, then runs [`resolve_message`].
#[derive(Clone)]
pub struct CitationResolver {
    backend: Arc<dyn AssistantBackend>,
}

impl CitationResolver {
    /// Create a resolver over `backend`.
    pub fn new(backend: Arc<dyn AssistantBackend>) -> Self {
        Self { backend }
    }

    /// Fetch display names for every document cited by `message`.
    /// Failed lookups are left out of the map.
    pub async fn document_labels(&self, message: &Message) -> DocumentLabels {
        let ids: BTreeSet<&str> = message
            .text_parts()
            .flat_map(|text| text.annotations.iter())
            .filter_map(Annotation::cited_document)
            .map(|reference| reference.file_id.as_str())
            .filter(|id| !id.trim().is_empty())
            .collect();

        let lookups = ids.into_iter().map(|id| async move {
            let lookup = Lookup::attempt("document name", self.backend.retrieve_file(id)).await;
            (id, lookup)
        });

        join_all(lookups)
            .await
            .into_iter()
            .filter_map(|(id, lookup)| {
                lookup
                    .found()
                    .filter(|file| !file.filename.is_empty())
                    .map(|file| (id.to_string(), file.filename))
            })
            .collect()
    }

    /// Resolve `message` with document names looked up from the backend.
    pub async fn resolve(&self, message: &Message) -> Answer {
        let labels = self.document_labels(message).await;
        resolve_message(message, &labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::ContentPart;

    fn labels(pairs: &[(&str, &str)]) -> DocumentLabels {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_markers_and_citations() {
        let message = Message::assistant_text(
            "Plan A costs 10【4:0†source】 and plan B 20【4:1†source】.",
            vec![
                Annotation::citation("【4:0†source】", "file-a"),
                Annotation::citation("【4:1†source】", "file-b"),
            ],
        );
        let answer = resolve_message(&message, &labels(&[("file-a", "prices.pdf")]));

        assert_eq!(answer.text, "Plan A costs 10[0] and plan B 20[1].");
        assert_eq!(answer.citation_lines(), vec!["[0] prices.pdf", "[1] file-b"]);
    }

    #[test]
    fn test_identical_spans_consumed_left_to_right() {
        let message = Message::assistant_text(
            "one [src] two [src] three [src]",
            vec![
                Annotation::citation("[src]", "f1"),
                Annotation::citation("[src]", "f2"),
                Annotation::citation("[src]", "f3"),
            ],
        );
        let answer = resolve_message(&message, &DocumentLabels::new());
        assert_eq!(answer.text, "one [0] two [1] three [2]");
    }

    #[test]
    fn test_out_of_order_spans_still_found() {
        let message = Message::assistant_text(
            "alpha †1 beta †2",
            vec![Annotation::span("†2"), Annotation::span("†1")],
        );
        let answer = resolve_message(&message, &DocumentLabels::new());
        assert_eq!(answer.text, "alpha [1] beta [0]");
        assert!(answer.citations.is_empty());
    }

    #[test]
    fn test_repeated_span_claims_earliest_occurrence() {
        let message = Message::assistant_text(
            "a [s] b [t] c [s]",
            vec![Annotation::span("[t]"), Annotation::span("[s]")],
        );
        let answer = resolve_message(&message, &DocumentLabels::new());
        assert_eq!(answer.text, "a [1] b [0] c [s]");
    }

    #[test]
    fn test_span_never_matches_inside_marker() {
        // The second span "[0]" is literal text that only exists once the
        // first replacement is made; it must not match the marker.
        let message = Message::assistant_text(
            "x【a】 y",
            vec![Annotation::span("【a】"), Annotation::span("[0]")],
        );
        let answer = resolve_message(&message, &DocumentLabels::new());
        assert_eq!(answer.text, "x[0] y");
    }

    #[test]
    fn test_missing_span_keeps_ordinal_and_citation() {
        let message = Message::assistant_text(
            "Answer【1】",
            vec![
                Annotation::citation("【drifted】", "file-x"),
                Annotation::citation("【1】", "file-y"),
            ],
        );
        let answer = resolve_message(&message, &DocumentLabels::new());

        assert_eq!(answer.text, "Answer[1]");
        // Orphaned citation is preserved.
        assert_eq!(answer.citation_lines(), vec!["[0] file-x", "[1] file-y"]);
    }

    #[test]
    fn test_malformed_annotation_is_isolated() {
        let broken = Annotation::citation("【b】", "");
        let message = Message::assistant_text(
            "a【a】 b【b】 c【c】",
            vec![
                Annotation::citation("【a】", "f-a"),
                broken,
                Annotation::citation("【c】", "f-c"),
            ],
        );
        let answer = resolve_message(&message, &DocumentLabels::new());

        assert_eq!(answer.text, "a[0] b【b】 c[2]");
        assert_eq!(answer.citation_lines(), vec!["[0] f-a", "[2] f-c"]);
    }

    #[test]
    fn test_multiple_text_parts_joined_and_trimmed() {
        let mut message = Message::assistant_text(
            "  first【x】",
            vec![Annotation::citation("【x】", "f1")],
        );
        message.content.push(ContentPart::Unknown);
        message.content.push(ContentPart::Text {
            text: TextContent {
                value: String::new(),
                annotations: vec![],
            },
        });
        message.content.push(ContentPart::Text {
            text: TextContent {
                value: "second【y】\n".to_string(),
                annotations: vec![Annotation::citation("【y】", "f2")],
            },
        });

        let answer = resolve_message(&message, &DocumentLabels::new());
        assert_eq!(answer.text, "first[0]\nsecond[0]");
        assert_eq!(answer.citation_lines(), vec!["[0] f1", "[0] f2"]);
    }

    #[test]
    fn test_annotation_without_span_only_cites() {
        let mut annotation = Annotation::citation("", "f1");
        annotation.text = None;
        let message = Message::assistant_text("plain text", vec![annotation]);
        let answer = resolve_message(&message, &DocumentLabels::new());
        assert_eq!(answer.text, "plain text");
        assert_eq!(answer.citation_lines(), vec!["[0] f1"]);
    }

    #[test]
    fn test_multibyte_text() {
        let message = Message::assistant_text(
            "ñandú【é】ü【é】",
            vec![Annotation::span("【é】"), Annotation::span("【é】")],
        );
        let answer = resolve_message(&message, &DocumentLabels::new());
        assert_eq!(answer.text, "ñandú[0]ü[1]");
    }
}
