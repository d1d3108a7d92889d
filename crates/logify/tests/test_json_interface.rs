//! Record-level interface: constraint records in, query responses out

use logify::json::{parse_records, parse_requests};
use logify::{
    EngineConfig, ErrorKind, KnowledgeBase, QueryEngine, QueryRequest, QueryResponse, Verdict,
};
use logify_search::BranchAndBound;
use std::time::Duration;

fn new_engine(config: EngineConfig) -> QueryEngine {
    QueryEngine::new(config, BranchAndBound::new())
}

const CONSTRAINTS: &str = r#"[
    {"kind": "hard", "formula": "P1 => P2"},
    {"kind": "soft", "formula": "P2 => P3", "confidence": 0.9},
    {"kind": "soft", "formula": "P3", "confidence": 0.4}
]"#;

const REQUESTS: &str = r#"[
    {"type": "consistency", "formula": "P1 & ~P2"},
    {"type": "entailment",  "formula": "~P1 | P2"},
    {"type": "confidence",  "formula": "P3"},
    {"type": "entailment",  "formula": "P1 &"},
    {"type": "consistency", "formula": "P9"}
]"#;

fn load(engine: &QueryEngine) -> KnowledgeBase {
    engine.load(&parse_records(CONSTRAINTS).unwrap()).unwrap()
}

#[test]
fn test_run_answers_each_request_type() {
    let engine = new_engine(EngineConfig::default());
    let kb = load(&engine);
    let requests = parse_requests(REQUESTS).unwrap();

    let responses: Vec<QueryResponse> = requests.iter().map(|r| engine.run(&kb, r)).collect();
    assert_eq!(responses[0], QueryResponse::Holds { holds: Verdict::Holds(false) });
    assert_eq!(responses[1], QueryResponse::Holds { holds: Verdict::Holds(true) });
    match &responses[2] {
        QueryResponse::Value { value } => assert!((0.0..=1.0).contains(value)),
        other => panic!("expected a value, got {:?}", other),
    }
    match &responses[3] {
        QueryResponse::Error { error, message } => {
            assert_eq!(*error, ErrorKind::SyntaxError);
            assert!(message.contains("position 4"), "{}", message);
        }
        other => panic!("expected a syntax error, got {:?}", other),
    }
    // Unknown names are free by default
    assert_eq!(responses[4], QueryResponse::Holds { holds: Verdict::Holds(true) });
}

#[test]
fn test_batch_preserves_order() {
    let engine = new_engine(EngineConfig::default());
    let kb = load(&engine);
    let requests = parse_requests(REQUESTS).unwrap();

    let sequential: Vec<QueryResponse> = requests.iter().map(|r| engine.run(&kb, r)).collect();
    let parallel = engine.run_batch(&kb, &requests);
    assert_eq!(parallel, sequential);
}

#[test]
fn test_batch_of_many_requests() {
    let engine = new_engine(EngineConfig::default());
    let kb = load(&engine);
    let requests: Vec<QueryRequest> = (0..64)
        .map(|i| match i % 3 {
            0 => QueryRequest::entailment("P1 => P2"),
            1 => QueryRequest::consistency(format!("P1 & extra{}", i)),
            _ => QueryRequest::confidence("P2 | P3"),
        })
        .collect();
    let responses = engine.run_batch(&kb, &requests);
    assert_eq!(responses.len(), 64);
    for (i, response) in responses.iter().enumerate() {
        assert!(!response.is_error(), "request {} failed: {:?}", i, response);
    }
    assert_eq!(responses[0], responses[3]);
    assert_eq!(responses[2], responses[5]);
}

#[test]
fn test_vacuous_response_json() {
    let engine = new_engine(EngineConfig::default());
    let text = r#"[{"kind":"hard","formula":"P1"},{"kind":"hard","formula":"~P1"}]"#;
    let records = parse_records(text).unwrap();
    let kb = engine.load(&records).unwrap();

    let response = engine.run(&kb, &QueryRequest::entailment("P1"));
    assert_eq!(serde_json::to_string(&response).unwrap(), r#"{"holds":"vacuous"}"#);

    let response = engine.run(&kb, &QueryRequest::confidence("P1"));
    let json: serde_json::Value = serde_json::to_value(&response).unwrap();
    assert_eq!(json["error"], "BothUnreachable");
}

#[test]
fn test_rejecting_inconsistent_hard_set() {
    let config = EngineConfig::from_json(r#"{"reject_inconsistent_hard_set": true}"#).unwrap();
    let engine = new_engine(config);
    let records = parse_records(r#"[{"kind":"hard","formula":"a & ~a"}]"#).unwrap();
    let err = engine.load(&records).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InconsistentHardSet);
}

#[test]
fn test_bad_records() {
    let engine = new_engine(EngineConfig::default());
    let cases = [
        (r#"[{"kind":"soft","formula":"a"}]"#, ErrorKind::InvalidRecord),
        (r#"[{"kind":"soft","formula":"a","confidence":1.0}]"#, ErrorKind::InvalidConfidence),
        (r#"[{"kind":"hard","formula":"(a"}]"#, ErrorKind::SyntaxError),
    ];
    for (text, kind) in cases {
        let records = parse_records(text).unwrap();
        let err = engine.load(&records).unwrap_err();
        assert_eq!(err.kind(), kind, "{}", text);
    }
    assert_eq!(parse_records("{").unwrap_err().kind(), ErrorKind::InvalidRecord);
}

#[test]
fn test_strict_and_timeout_responses() {
    let kb = load(&new_engine(EngineConfig::default()));

    let strict = new_engine(EngineConfig::default().strict());
    let response = strict.run(&kb, &QueryRequest::consistency("P9"));
    assert!(matches!(
        response,
        QueryResponse::Error { error: ErrorKind::UnknownProposition, .. }
    ));

    let impatient = new_engine(EngineConfig::default().with_solver_timeout(Duration::ZERO));
    let response = impatient.run(&kb, &QueryRequest::confidence("P3"));
    assert!(matches!(
        response,
        QueryResponse::Error { error: ErrorKind::SolverTimeout, .. }
    ));
}
