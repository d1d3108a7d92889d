//! Formula text parsing

pub mod formula;

pub use formula::{parse_formula, ParsedFormula, SyntaxError, SyntaxErrorKind, MAX_NESTING};
