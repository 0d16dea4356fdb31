//! Answer matching: embedding similarity + field filter + keyword boost +
//! threshold decision.

use std::collections::HashSet;

use super::dataset::QaRecord;
use super::embedding::{Embedding, SentenceEncoder};
use super::ChatError;

/// Additive score bonus per distinct matched keyword
pub const KEYWORD_BOOST: f32 = 0.05;

/// Result of matching a query against the index.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// A dataset answer scored at or above the threshold
    Match {
        answer: String,
        /// Final score rounded to 2 decimals, at most 1.0
        confidence: f32,
    },
    /// No candidate in the requested field reached the threshold
    NoMatch,
}

/// Read-only index over the Q&A dataset.
///
/// Holds one embedding per record, row-aligned, computed once at startup
/// from `question + " " + keywords`. Matching is a linear scan; fine at
/// dataset scale, and swappable for an ANN structure without touching the
/// contract.
pub struct ChatIndex {
    records: Vec<QaRecord>,
    embeddings: Vec<Embedding>,
    encoder: Box<dyn SentenceEncoder>,
    threshold: f32,
}

impl ChatIndex {
    /// Encode all records in one batch and build the index.
    pub fn build(
        records: Vec<QaRecord>,
        encoder: Box<dyn SentenceEncoder>,
        threshold: f32,
    ) -> Result<Self, ChatError> {
        let texts: Vec<String> = records.iter().map(|r| r.combined_text()).collect();
        let refs: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();
        let embeddings = encoder.encode_batch(&refs)?;

        tracing::info!(records = records.len(), "Chat index built");

        Ok(Self {
            records,
            embeddings,
            encoder,
            threshold,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Find the best answer for `question` among records in `field`.
    ///
    /// Field comparison is case-insensitive. Score ties keep the first-seen
    /// record (lowest index).
    pub fn answer(&self, field: &str, question: &str) -> Result<MatchOutcome, ChatError> {
        let query = self.encoder.encode(question)?;
        let field = field.to_lowercase();

        let mut best: Option<(usize, f32)> = None;
        for (idx, record) in self.records.iter().enumerate() {
            if record.field.to_lowercase() != field {
                continue;
            }

            let base = query.dot(&self.embeddings[idx]);
            let score = (base + keyword_boost(question, &record.keywords)).min(1.0);

            if best.map_or(true, |(_, top)| score > top) {
                best = Some((idx, score));
            }
        }

        match best {
            Some((idx, score)) if score >= self.threshold => Ok(MatchOutcome::Match {
                answer: self.records[idx].answer.clone(),
                confidence: (score * 100.0).round() / 100.0,
            }),
            _ => Ok(MatchOutcome::NoMatch),
        }
    }
}

/// Count distinct keywords appearing in the question and convert to a bonus.
///
/// Matching is case-insensitive substring search on the raw text, not
/// tokenized: a keyword inside an unrelated word still counts. Intentional.
fn keyword_boost(question: &str, keywords: &str) -> f32 {
    let question = question.to_lowercase();
    let mut matched: HashSet<String> = HashSet::new();

    for keyword in keywords.split(',') {
        let keyword = keyword.trim().to_lowercase();
        if !keyword.is_empty() && question.contains(&keyword) {
            matched.insert(keyword);
        }
    }

    KEYWORD_BOOST * matched.len() as f32
}
