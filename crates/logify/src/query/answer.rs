//! Combined verdict for a question: TRUE, FALSE or UNCERTAIN with a
//! confidence and a short explanation

use super::{QueryEngine, Verdict};
use crate::error::{LogifyError, Result};
use crate::knowledge_base::KnowledgeBase;
use crate::logic::Formula;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnswerKind {
    /// The query follows from the hard constraints
    True,
    /// Its negation follows from the hard constraints
    False,
    /// The hard constraints allow both; see the confidence
    Uncertain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: AnswerKind,
    pub confidence: f64,
    pub explanation: String,
}

impl QueryEngine {
    /// Decide `query` from the hard constraints where possible, and fall
    /// back to the soft evidence otherwise.
    ///
    /// An inconsistent knowledge base has no meaningful answer and yields
    /// `InconsistentHardSet`.
    pub fn answer(&self, kb: &KnowledgeBase, query: &Formula) -> Result<Answer> {
        let entailed = self.entailment(kb, query)?;
        if entailed == Verdict::Vacuous {
            return Err(LogifyError::InconsistentHardSet);
        }
        if entailed == Verdict::Holds(true) {
            return Ok(Answer {
                answer: AnswerKind::True,
                confidence: 1.0,
                explanation: format!("`{}` follows from the hard constraints", query),
            });
        }

        let negation = query.clone().negated();
        if self.entailment(kb, &negation)? == Verdict::Holds(true) {
            return Ok(Answer {
                answer: AnswerKind::False,
                confidence: 0.0,
                explanation: format!("`{}` follows from the hard constraints", negation),
            });
        }

        let confidence = self.confidence(kb, query)?;
        Ok(Answer {
            answer: AnswerKind::Uncertain,
            confidence,
            explanation: format!(
                "hard constraints allow both `{}` and its negation; soft evidence gives {:.3}",
                query, confidence
            ),
        })
    }
}
