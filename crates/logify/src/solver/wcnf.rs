//! WCNF writer (MaxSAT Evaluation 2022 format)
//!
//! ```text
//! c comment
//! h 1 -2 0        hard clause
//! 7 3 0           soft clause with weight 7
//! ```

use super::MaxSatProblem;
use crate::logic::Clause;
use std::io::{self, Write};

pub fn write_wcnf<W: Write>(problem: &MaxSatProblem<'_>, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "c logify: {} vars, {} hard, {} soft",
        problem.var_count(),
        problem.hard.len(),
        problem.soft.len()
    )?;
    for clause in &problem.hard {
        write!(out, "h")?;
        write_literals(clause, out)?;
    }
    for (clause, weight) in &problem.soft {
        write!(out, "{}", weight)?;
        write_literals(clause, out)?;
    }
    Ok(())
}

pub fn to_wcnf_string(problem: &MaxSatProblem<'_>) -> String {
    let mut buf = Vec::new();
    // Writing to a Vec cannot fail
    let _ = write_wcnf(problem, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

fn write_literals<W: Write>(clause: &Clause, out: &mut W) -> io::Result<()> {
    for lit in clause.literals() {
        write!(out, " {}", lit)?;
    }
    writeln!(out, " 0")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wcnf_layout() {
        let h = Clause::from_dimacs(&[1, -2]);
        let s = Clause::from_dimacs(&[2]);
        let empty = Clause::new(vec![]);
        let problem = MaxSatProblem::new(2)
            .with_hard([&h, &empty])
            .with_soft([(&s, 42)]);
        let text = to_wcnf_string(&problem);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "c logify: 2 vars, 2 hard, 1 soft");
        assert_eq!(&lines[1..], &["h 1 -2 0", "h 0", "42 2 0"][..]);
    }
}
