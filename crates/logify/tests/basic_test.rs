//! End-to-end scenarios: build a knowledge base, then query it

use approx::assert_relative_eq;
use logify::{
    Constraint, EngineConfig, Formula, HardSetStatus, LogifyError, QueryEngine, Verdict,
    WeightTransform,
};
use logify_search::BranchAndBound;

fn new_engine(config: EngineConfig) -> QueryEngine {
    QueryEngine::new(config, BranchAndBound::new())
}

fn f(text: &str) -> Formula {
    text.parse().unwrap()
}

#[test]
fn test_hard_implication() {
    let engine = new_engine(EngineConfig::default());
    let kb = engine.build(&[Constraint::hard(f("P1 => P2"))]).unwrap();

    assert_eq!(engine.consistency(&kb, &f("P1 & ~P2")).unwrap(), Verdict::Holds(false));
    assert_eq!(engine.entailment(&kb, &f("~P1 | P2")).unwrap(), Verdict::Holds(true));

    // Not entailed, but consistent
    assert_eq!(engine.entailment(&kb, &f("P2")).unwrap(), Verdict::Holds(false));
    assert_eq!(engine.consistency(&kb, &f("P2")).unwrap(), Verdict::Holds(true));
}

#[test]
fn test_soft_implication_confidence() {
    let engine = new_engine(EngineConfig::default());
    let kb = engine
        .build(&[
            Constraint::hard(f("P3")),
            Constraint::soft(f("P3 => P4"), 0.9).unwrap(),
        ])
        .unwrap();

    let t = WeightTransform::default();
    let (keep, drop) = t.pair(0.9).unwrap();
    let expected = keep as f64 / (keep as f64 + drop as f64);

    let value = engine.confidence(&kb, &f("P4")).unwrap();
    assert_relative_eq!(value, expected, epsilon = 1e-12);
    assert!(value > 0.9 && value < 1.0, "value {}", value);

    // Same inputs, same bits
    let again = engine.confidence(&kb, &f("P4")).unwrap();
    assert_eq!(value.to_bits(), again.to_bits());
}

#[test]
fn test_soft_implication_without_evidence_for_antecedent() {
    // P3 is free, so P4 can be either value without violating the rule
    let engine = new_engine(EngineConfig::default());
    let kb = engine
        .build(&[Constraint::soft(f("P3 => P4"), 0.9).unwrap()])
        .unwrap();
    assert_eq!(engine.confidence(&kb, &f("P4")).unwrap(), 0.5);
    // The rule itself is believed
    let value = engine.confidence(&kb, &f("P3 => P4")).unwrap();
    assert!(value > 0.9, "value {}", value);
}

#[test]
fn test_inconsistent_hard_set_is_vacuous() {
    let engine = new_engine(EngineConfig::default());
    let kb = engine
        .build(&[Constraint::hard(f("P1")), Constraint::hard(f("~P1"))])
        .unwrap();
    assert_eq!(kb.status(), HardSetStatus::Inconsistent);

    assert_eq!(engine.entailment(&kb, &f("P1")).unwrap(), Verdict::Vacuous);
    assert_eq!(engine.entailment(&kb, &f("Q")).unwrap(), Verdict::Vacuous);
    assert_eq!(engine.consistency(&kb, &f("P1")).unwrap(), Verdict::Vacuous);
    assert!(matches!(
        engine.confidence(&kb, &f("P1")),
        Err(LogifyError::BothUnreachable)
    ));
}

#[test]
fn test_confidence_extremes_from_hard_constraints() {
    let engine = new_engine(EngineConfig::default());
    let kb = engine
        .build(&[
            Constraint::hard(f("a")),
            Constraint::soft(f("b"), 0.3).unwrap(),
        ])
        .unwrap();
    assert_eq!(engine.confidence(&kb, &f("a")).unwrap(), 1.0);
    assert_eq!(engine.confidence(&kb, &f("~a")).unwrap(), 0.0);
    let b = engine.confidence(&kb, &f("b")).unwrap();
    assert!(b < 0.5, "b = {}", b);
}

#[test]
fn test_conflicting_soft_evidence() {
    let engine = new_engine(EngineConfig::default());
    let kb = engine
        .build(&[
            Constraint::soft(f("x"), 0.8).unwrap(),
            Constraint::soft(f("~x"), 0.6).unwrap(),
        ])
        .unwrap();
    let value = engine.confidence(&kb, &f("x")).unwrap();
    assert!(value > 0.5 && value < 0.8, "value {}", value);
}

#[test]
fn test_chain_of_rules() {
    let engine = new_engine(EngineConfig::default());
    let kb = engine
        .build(&[
            Constraint::hard(f("a => b")),
            Constraint::hard(f("b => c")),
            Constraint::hard(f("c <=> d | e")),
            Constraint::hard(f("~e")),
        ])
        .unwrap();
    assert_eq!(engine.entailment(&kb, &f("a => d")).unwrap(), Verdict::Holds(true));
    assert_eq!(engine.entailment(&kb, &f("d => a")).unwrap(), Verdict::Holds(false));
    assert_eq!(engine.consistency(&kb, &f("a & ~d")).unwrap(), Verdict::Holds(false));
}

#[test]
fn test_strict_mode_rejects_unknown_names() {
    let engine = new_engine(EngineConfig::default().strict());
    let kb = engine.build(&[Constraint::hard(f("a"))]).unwrap();
    assert_eq!(engine.entailment(&kb, &f("a")).unwrap(), Verdict::Holds(true));
    assert!(matches!(
        engine.entailment(&kb, &f("a | ghost")),
        Err(LogifyError::UnknownProposition { name }) if name == "ghost"
    ));
}

#[test]
fn test_timeout_is_not_an_answer() {
    let kb = new_engine(EngineConfig::default())
        .build(&[Constraint::hard(f("a"))])
        .unwrap();
    let impatient =
        new_engine(EngineConfig::default().with_solver_timeout(std::time::Duration::ZERO));
    let err = impatient.entailment(&kb, &f("a")).unwrap_err();
    assert!(matches!(err, LogifyError::SolverTimeout { .. }));
    assert!(err.is_recoverable());
}
