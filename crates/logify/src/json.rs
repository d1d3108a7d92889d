//! JSON records for constraint sets, query requests and responses

use crate::encoding::Constraint;
use crate::error::{ErrorKind, LogifyError, Result};
use crate::logic::Formula;
use crate::query::Verdict;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    Hard,
    Soft,
}

/// One input constraint: `{kind, formula, confidence?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintRecord {
    pub kind: ConstraintKind,
    pub formula: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl ConstraintRecord {
    pub fn hard(formula: impl Into<String>) -> Self {
        ConstraintRecord {
            kind: ConstraintKind::Hard,
            formula: formula.into(),
            confidence: None,
        }
    }

    pub fn soft(formula: impl Into<String>, confidence: f64) -> Self {
        ConstraintRecord {
            kind: ConstraintKind::Soft,
            formula: formula.into(),
            confidence: Some(confidence),
        }
    }

    /// Parse the formula and check that a confidence is present iff soft
    pub fn to_constraint(&self) -> Result<Constraint> {
        let formula: Formula = self.formula.parse()?;
        match (self.kind, self.confidence) {
            (ConstraintKind::Hard, None) => Ok(Constraint::hard(formula)),
            (ConstraintKind::Soft, Some(w)) => Constraint::soft(formula, w),
            (ConstraintKind::Hard, Some(_)) => Err(LogifyError::InvalidRecord(format!(
                "hard constraint `{}` must not carry a confidence",
                self.formula
            ))),
            (ConstraintKind::Soft, None) => Err(LogifyError::InvalidRecord(format!(
                "soft constraint `{}` needs a confidence",
                self.formula
            ))),
        }
    }
}

impl From<&Constraint> for ConstraintRecord {
    fn from(constraint: &Constraint) -> Self {
        match constraint {
            Constraint::Hard(f) => ConstraintRecord::hard(f.to_string()),
            Constraint::Soft {
                formula,
                confidence,
            } => ConstraintRecord::soft(formula.to_string(), *confidence),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Entailment,
    Consistency,
    Confidence,
}

/// `{type, formula}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(rename = "type")]
    pub query_type: QueryType,
    pub formula: String,
}

impl QueryRequest {
    pub fn new(query_type: QueryType, formula: impl Into<String>) -> Self {
        QueryRequest {
            query_type,
            formula: formula.into(),
        }
    }

    pub fn entailment(formula: impl Into<String>) -> Self {
        Self::new(QueryType::Entailment, formula)
    }

    pub fn consistency(formula: impl Into<String>) -> Self {
        Self::new(QueryType::Consistency, formula)
    }

    pub fn confidence(formula: impl Into<String>) -> Self {
        Self::new(QueryType::Confidence, formula)
    }
}

/// `{holds}`, `{value}` or `{error, message}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryResponse {
    Holds { holds: Verdict },
    Value { value: f64 },
    Error { error: ErrorKind, message: String },
}

impl QueryResponse {
    pub fn error(err: &LogifyError) -> Self {
        QueryResponse::Error {
            error: err.kind(),
            message: err.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, QueryResponse::Error { .. })
    }
}

impl From<Result<Verdict>> for QueryResponse {
    fn from(result: Result<Verdict>) -> Self {
        match result {
            Ok(holds) => QueryResponse::Holds { holds },
            Err(e) => QueryResponse::error(&e),
        }
    }
}

impl From<Result<f64>> for QueryResponse {
    fn from(result: Result<f64>) -> Self {
        match result {
            Ok(value) => QueryResponse::Value { value },
            Err(e) => QueryResponse::error(&e),
        }
    }
}

/// Wire form of a verdict: `true`, `false` or `"vacuous"`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum HoldsJson {
    Known(bool),
    Marker(VacuousMarker),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum VacuousMarker {
    Vacuous,
}

impl From<Verdict> for HoldsJson {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Holds(b) => HoldsJson::Known(b),
            Verdict::Vacuous => HoldsJson::Marker(VacuousMarker::Vacuous),
        }
    }
}

impl From<HoldsJson> for Verdict {
    fn from(json: HoldsJson) -> Self {
        match json {
            HoldsJson::Known(b) => Verdict::Holds(b),
            HoldsJson::Marker(VacuousMarker::Vacuous) => Verdict::Vacuous,
        }
    }
}

/// Parse a JSON array of constraint records
pub fn parse_records(text: &str) -> Result<Vec<ConstraintRecord>> {
    Ok(serde_json::from_str(text)?)
}

/// Parse a JSON array of query requests
pub fn parse_requests(text: &str) -> Result<Vec<QueryRequest>> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_shapes() {
        let cases = [
            (QueryResponse::Holds { holds: Verdict::Holds(true) }, r#"{"holds":true}"#),
            (QueryResponse::Holds { holds: Verdict::Vacuous }, r#"{"holds":"vacuous"}"#),
            (QueryResponse::Value { value: 0.25 }, r#"{"value":0.25}"#),
            (
                QueryResponse::error(&LogifyError::BothUnreachable),
                concat!(
                    r#"{"error":"BothUnreachable","message":"Neither the query nor its "#,
                    r#"negation is satisfiable with the hard constraints"}"#
                ),
            ),
        ];
        for (response, text) in cases {
            assert_eq!(serde_json::to_string(&response).unwrap(), text);
            let back: QueryResponse = serde_json::from_str(text).unwrap();
            assert_eq!(back, response);
        }
    }

    #[test]
    fn test_request_type_field() {
        let req: QueryRequest =
            serde_json::from_str(r#"{"type": "confidence", "formula": "P4"}"#).unwrap();
        assert_eq!(req, QueryRequest::confidence("P4"));
        let unknown = r#"{"type": "probability", "formula": "P4"}"#;
        assert!(serde_json::from_str::<QueryRequest>(unknown).is_err());
    }

    #[test]
    fn test_record_validation() {
        assert!(ConstraintRecord::hard("a & b").to_constraint().unwrap().is_hard());

        let missing: ConstraintRecord =
            serde_json::from_str(r#"{"kind": "soft", "formula": "a"}"#).unwrap();
        assert!(matches!(missing.to_constraint(), Err(LogifyError::InvalidRecord(_))));

        let extra = ConstraintRecord {
            confidence: Some(0.5),
            ..ConstraintRecord::hard("a")
        };
        assert!(matches!(extra.to_constraint(), Err(LogifyError::InvalidRecord(_))));

        assert!(matches!(
            ConstraintRecord::soft("a", 0.0).to_constraint(),
            Err(LogifyError::InvalidConfidence { .. })
        ));
        assert!(matches!(
            ConstraintRecord::hard("a &").to_constraint(),
            Err(LogifyError::Syntax(_))
        ));
    }

    #[test]
    fn test_record_round_trip_through_constraint() {
        let constraint = Constraint::soft("p => q | r".parse().unwrap(), 0.75).unwrap();
        let record = ConstraintRecord::from(&constraint);
        assert_eq!(record.formula, "p => q | r");
        assert_eq!(record.to_constraint().unwrap(), constraint);
    }

    #[test]
    fn test_malformed_json_is_invalid_record() {
        let err = parse_records("[{\"kind\": \"maybe\"}]").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRecord);
    }
}
