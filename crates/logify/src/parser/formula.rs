//! Recursive-descent parser for propositional formulas
//!
//! Precedence, tightest first: `~` > `&` > `|` > `=>` > `<=>`. Both `=>`
//! and `<=>` associate to the right; chains of `&` or `|` become a single
//! n-ary node.
//!
//! Parentheses, negations and `=>`/`<=>` links each descend one level.
//! Input nested deeper than [`MAX_NESTING`] is rejected with
//! [`SyntaxErrorKind::TooDeep`] rather than recursing further.

use crate::logic::Formula;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, multispace0, satisfy},
    combinator::{cut, map, opt, recognize},
    error::{ErrorKind, ParseError},
    multi::many0,
    sequence::{delimited, pair, preceded},
    IResult,
};
use std::str::FromStr;
use thiserror::Error;

/// What the grammar was looking for when it gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expected {
    Operand,
    CloseParen,
    /// Nesting limit reached; not an expectation but carried the same way
    Shallower,
}

/// Deepest nesting of parentheses, negations and `=>`/`<=>` links accepted
pub const MAX_NESTING: usize = 256;

/// Internal nom error that remembers the furthest position reached
#[derive(Debug, Clone, PartialEq)]
struct GrammarError<'a> {
    input: &'a str,
    expected: Expected,
}

impl<'a> ParseError<&'a str> for GrammarError<'a> {
    fn from_error_kind(input: &'a str, _kind: ErrorKind) -> Self {
        GrammarError {
            input,
            expected: Expected::Operand,
        }
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    fn or(self, other: Self) -> Self {
        if other.input.len() < self.input.len() {
            other
        } else {
            self
        }
    }
}

type PResult<'a, T> = IResult<&'a str, T, GrammarError<'a>>;

/// Kind of syntax error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    #[error("empty formula")]
    Empty,
    #[error("missing operand")]
    MissingOperand,
    #[error("unclosed '('")]
    UnclosedParenthesis,
    #[error("unmatched ')'")]
    UnmatchedParenthesis,
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),
    #[error("formula nested too deeply")]
    TooDeep,
}

/// Malformed formula text. `position` is a character offset into the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error at position {position}: {kind}")]
pub struct SyntaxError {
    pub position: usize,
    pub kind: SyntaxErrorKind,
}

/// Parser output: the tree and its proposition names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFormula {
    pub formula: Formula,
    /// Distinct proposition names in first-occurrence order
    pub propositions: Vec<String>,
}

/// Parse a formula from text
pub fn parse_formula(text: &str) -> Result<ParsedFormula, SyntaxError> {
    if text.trim().is_empty() {
        return Err(SyntaxError {
            position: 0,
            kind: SyntaxErrorKind::Empty,
        });
    }

    match equivalence(text, 0) {
        Ok((rest, formula)) if rest.is_empty() => {
            let propositions = formula.propositions().into_iter().collect();
            Ok(ParsedFormula {
                formula,
                propositions,
            })
        }
        Ok((rest, _)) => {
            let kind = if rest.starts_with(')') {
                SyntaxErrorKind::UnmatchedParenthesis
            } else {
                SyntaxErrorKind::UnexpectedToken(leading_token(rest))
            };
            Err(SyntaxError {
                position: char_offset(text, rest),
                kind,
            })
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(SyntaxError {
            position: char_offset(text, e.input),
            kind: classify(e),
        }),
        Err(nom::Err::Incomplete(_)) => Err(SyntaxError {
            position: text.chars().count(),
            kind: SyntaxErrorKind::MissingOperand,
        }),
    }
}

impl FromStr for Formula {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_formula(s).map(|parsed| parsed.formula)
    }
}

fn classify(e: GrammarError<'_>) -> SyntaxErrorKind {
    let rest = e.input;
    match e.expected {
        Expected::Shallower => SyntaxErrorKind::TooDeep,
        Expected::CloseParen if rest.is_empty() => SyntaxErrorKind::UnclosedParenthesis,
        Expected::Operand if rest.is_empty() || starts_with_operator(rest) => {
            SyntaxErrorKind::MissingOperand
        }
        _ => SyntaxErrorKind::UnexpectedToken(leading_token(rest)),
    }
}

fn starts_with_operator(rest: &str) -> bool {
    ["&", "|", "∧", "∨", "=>", "->", "⟹", "→", "<=>", "<->", "⟺", "↔", ")"]
        .iter()
        .any(|op| rest.starts_with(op))
}

/// Identifier run at the start of `rest`, or its first character
fn leading_token(rest: &str) -> String {
    let word: String = rest.chars().take_while(|&c| is_ident_char(c)).collect();
    if word.is_empty() {
        rest.chars().next().map(String::from).unwrap_or_default()
    } else {
        word
    }
}

fn char_offset(text: &str, rest: &str) -> usize {
    text[..text.len() - rest.len()].chars().count()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

fn not_op(input: &str) -> PResult<'_, &str> {
    alt((tag("~"), tag("!"), tag("¬")))(input)
}

fn and_op(input: &str) -> PResult<'_, &str> {
    alt((tag("&&"), tag("&"), tag("∧")))(input)
}

fn or_op(input: &str) -> PResult<'_, &str> {
    alt((tag("||"), tag("|"), tag("∨")))(input)
}

fn implies_op(input: &str) -> PResult<'_, &str> {
    alt((tag("=>"), tag("->"), tag("⟹"), tag("→")))(input)
}

fn iff_op(input: &str) -> PResult<'_, &str> {
    alt((tag("<=>"), tag("<->"), tag("⟺"), tag("↔")))(input)
}

fn close_paren(input: &str) -> PResult<'_, char> {
    char::<_, GrammarError<'_>>(')')(input).map_err(|e| {
        e.map(|err| GrammarError {
            input: err.input,
            expected: Expected::CloseParen,
        })
    })
}

/// Fail hard once `depth` passes the nesting limit
fn descend(input: &str, depth: usize) -> Result<usize, nom::Err<GrammarError<'_>>> {
    if depth >= MAX_NESTING {
        return Err(nom::Err::Failure(GrammarError {
            input,
            expected: Expected::Shallower,
        }));
    }
    Ok(depth + 1)
}

/// Lowest precedence level: right-associative `<=>`
fn equivalence(input: &str, depth: usize) -> PResult<'_, Formula> {
    let (input, left) = implication(input, depth)?;
    let (input, right) = opt(preceded(iff_op, |i| nested(i, depth, equivalence)))(input)?;
    Ok((
        input,
        match right {
            Some(right) => Formula::iff(left, right),
            None => left,
        },
    ))
}

/// Right-associative `=>`
fn implication(input: &str, depth: usize) -> PResult<'_, Formula> {
    let (input, left) = disjunction(input, depth)?;
    let (input, right) = opt(preceded(implies_op, |i| nested(i, depth, implication)))(input)?;
    Ok((
        input,
        match right {
            Some(right) => Formula::implies(left, right),
            None => left,
        },
    ))
}

fn disjunction(input: &str, depth: usize) -> PResult<'_, Formula> {
    let (input, first) = conjunction(input, depth)?;
    let (input, rest) = many0(preceded(or_op, cut(|i| conjunction(i, depth))))(input)?;
    Ok((input, join(first, rest, Formula::Or)))
}

fn conjunction(input: &str, depth: usize) -> PResult<'_, Formula> {
    let (input, first) = unary(input, depth)?;
    let (input, rest) = many0(preceded(and_op, cut(|i| unary(i, depth))))(input)?;
    Ok((input, join(first, rest, Formula::And)))
}

fn join(first: Formula, rest: Vec<Formula>, build: fn(Vec<Formula>) -> Formula) -> Formula {
    if rest.is_empty() {
        first
    } else {
        let mut operands = Vec::with_capacity(rest.len() + 1);
        operands.push(first);
        operands.extend(rest);
        build(operands)
    }
}

/// Negation, parenthesised formula or atom, with surrounding whitespace
fn unary(input: &str, depth: usize) -> PResult<'_, Formula> {
    delimited(
        multispace0,
        alt((
            map(preceded(not_op, |i| nested(i, depth, unary)), Formula::not),
            preceded(char('('), |i| nested(i, depth, parenthesised)),
            map(atom_name, Formula::atom),
        )),
        multispace0,
    )(input)
}

/// Run `inner` one level deeper, committed
fn nested<'a>(
    input: &'a str,
    depth: usize,
    inner: fn(&'a str, usize) -> PResult<'a, Formula>,
) -> PResult<'a, Formula> {
    let depth = descend(input, depth)?;
    cut(move |i| inner(i, depth))(input)
}

fn parenthesised(input: &str, depth: usize) -> PResult<'_, Formula> {
    let (input, inner) = equivalence(input, depth)?;
    let (input, _) = close_paren(input)?;
    Ok((input, inner))
}

fn atom_name(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(is_ident_char),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(n: &str) -> Formula {
        Formula::atom(n)
    }

    fn parse(text: &str) -> Formula {
        parse_formula(text).unwrap().formula
    }

    fn error(text: &str) -> SyntaxError {
        parse_formula(text).unwrap_err()
    }

    #[test]
    fn test_precedence() {
        // ~ > & > | > => > <=>
        assert_eq!(
            parse("~a & b | c => d <=> e"),
            Formula::iff(
                Formula::implies(
                    Formula::Or(vec![Formula::And(vec![Formula::not(p("a")), p("b")]), p("c")]),
                    p("d"),
                ),
                p("e"),
            )
        );
    }

    #[test]
    fn test_right_associativity() {
        assert_eq!(
            parse("a => b => c"),
            Formula::implies(p("a"), Formula::implies(p("b"), p("c")))
        );
        assert_eq!(
            parse("a <=> b <=> c"),
            Formula::iff(p("a"), Formula::iff(p("b"), p("c")))
        );
    }

    #[test]
    fn test_nary_chains_and_parentheses() {
        assert_eq!(parse("a & b & c"), Formula::And(vec![p("a"), p("b"), p("c")]));
        assert_eq!(
            parse("(a | b) & c"),
            Formula::And(vec![Formula::Or(vec![p("a"), p("b")]), p("c")])
        );
        assert_eq!(parse("((a))"), p("a"));
        assert_eq!(parse("~~a"), Formula::not(Formula::not(p("a"))));
    }

    #[test]
    fn test_alternative_spellings() {
        assert_eq!(parse("¬P1 ∧ P2 ∨ P3 ⟹ P4 ⟺ P5"), parse("~P1 & P2 | P3 => P4 <=> P5"));
        assert_eq!(parse("!a && b || c -> d <-> e"), parse("~a & b | c => d <=> e"));
        assert_eq!(parse("a → b ↔ c"), parse("a => b <=> c"));
    }

    #[test]
    fn test_propositions_in_first_occurrence_order() {
        let parsed = parse_formula("q & (p | q) => r_1 & p").unwrap();
        assert_eq!(parsed.propositions, vec!["q", "p", "r_1"]);
    }

    #[test]
    fn test_display_round_trip() {
        for text in [
            "a & (b | c) => ~d",
            "(a <=> b) <=> c",
            "~(a & b) | (c => d)",
            "(a => b) => c",
            "a | (b | c)",
        ] {
            let f = parse(text);
            assert_eq!(parse(&f.to_string()), f, "round trip of {}", text);
        }
    }

    #[test]
    fn test_errors_carry_position() {
        assert_eq!(error("").kind, SyntaxErrorKind::Empty);
        assert_eq!(
            error("a & "),
            SyntaxError { position: 4, kind: SyntaxErrorKind::MissingOperand }
        );
        assert_eq!(
            error("a & | b"),
            SyntaxError { position: 4, kind: SyntaxErrorKind::MissingOperand }
        );
        assert_eq!(
            error("(a & b"),
            SyntaxError { position: 6, kind: SyntaxErrorKind::UnclosedParenthesis }
        );
        assert_eq!(
            error("a & b)"),
            SyntaxError { position: 5, kind: SyntaxErrorKind::UnmatchedParenthesis }
        );
        assert_eq!(
            error("a $ b"),
            SyntaxError {
                position: 2,
                kind: SyntaxErrorKind::UnexpectedToken("$".into())
            }
        );
        assert_eq!(
            error("a b"),
            SyntaxError {
                position: 2,
                kind: SyntaxErrorKind::UnexpectedToken("b".into())
            }
        );
        assert_eq!(error("~").kind, SyntaxErrorKind::MissingOperand);
    }

    #[test]
    fn test_nesting_limit() {
        let ok = format!("{}a{}", "(".repeat(MAX_NESTING - 1), ")".repeat(MAX_NESTING - 1));
        assert_eq!(parse(&ok), p("a"));

        let deep = 20_000;
        let parens = format!("{}a{}", "(".repeat(deep), ")".repeat(deep));
        assert_eq!(error(&parens).kind, SyntaxErrorKind::TooDeep);

        let negations = format!("{}a", "~".repeat(deep));
        let e = error(&negations);
        assert_eq!(e.kind, SyntaxErrorKind::TooDeep);
        assert_eq!(e.position, MAX_NESTING + 1);

        let chain = vec!["a"; deep].join(" => ");
        assert_eq!(error(&chain).kind, SyntaxErrorKind::TooDeep);

        // Long flat chains are iterative and stay unlimited
        let flat = vec!["a"; deep].join(" & ");
        assert!(parse_formula(&flat).is_ok());
    }

    #[test]
    fn test_position_counts_characters() {
        // '¬' and '∧' are multi-byte
        let e = error("¬a ∧ ");
        assert_eq!(e.position, 5);
        assert_eq!(e.kind, SyntaxErrorKind::MissingOperand);
    }
}
