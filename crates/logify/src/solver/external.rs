//! External MaxSAT executable backend
//!
//! The problem is written as WCNF to the child's stdin. The child must print
//! the usual competition lines on stdout:
//!
//! ```text
//! o 12
//! s OPTIMUM FOUND
//! v 0110...           (or: v 1 -2 -3 4 ... 0)
//! ```
//!
//! The child is killed once the budget expires. Output still held open by
//! processes it started is abandoned, not waited for.

use super::wcnf::write_wcnf;
use super::{MaxSatProblem, MaxSatSolver, Solution, SolverError, SolverOutcome};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Runs a MaxSAT solver binary per call
#[derive(Debug, Clone)]
pub struct ExternalMaxSat {
    program: PathBuf,
    args: Vec<String>,
}

impl ExternalMaxSat {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        ExternalMaxSat {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl MaxSatSolver for ExternalMaxSat {
    fn name(&self) -> &str {
        "external"
    }

    fn solve(
        &self,
        problem: &MaxSatProblem<'_>,
        budget: Duration,
    ) -> Result<SolverOutcome, SolverError> {
        if budget.is_zero() {
            return Err(SolverError::Timeout { budget });
        }
        let deadline = Instant::now().checked_add(budget);

        let mut input = Vec::new();
        write_wcnf(problem, &mut input)?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                SolverError::Failure(format!("failed to start `{}`: {e}", self.program.display()))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| SolverError::Failure("failed to open solver stdin".into()))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| SolverError::Failure("failed to open solver stdout".into()))?;

        // Feed and drain on detached threads. A process the solver forked
        // can hold either pipe open after the solver itself is gone, so
        // neither thread is ever joined; the output arrives over a channel
        // with the deadline applied.
        thread::spawn(move || {
            // A solver that exits early closes its stdin; that is not an error
            let _ = stdin.write_all(&input);
        });
        let (sender, output) = mpsc::channel();
        thread::spawn(move || {
            let mut text = String::new();
            let _ = sender.send(stdout.read_to_string(&mut text).map(|_| text));
        });

        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if expired(deadline) {
                let _ = child.kill();
                let _ = child.wait();
                return Err(self.timed_out(budget));
            }
            thread::sleep(POLL_INTERVAL);
        };

        let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));
        let received = match remaining {
            Some(remaining) => output.recv_timeout(remaining),
            None => output.recv().map_err(RecvTimeoutError::from),
        };
        let text = match received {
            Ok(text) => text?,
            Err(RecvTimeoutError::Timeout) => return Err(self.timed_out(budget)),
            Err(RecvTimeoutError::Disconnected) => {
                return Err(SolverError::Failure("solver output reader panicked".into()))
            }
        };

        let outcome = parse_output(&text, problem)?;
        tracing::debug!(program = %self.program.display(), %status, "external solver finished");
        Ok(outcome)
    }
}

impl ExternalMaxSat {
    fn timed_out(&self, budget: Duration) -> SolverError {
        tracing::warn!(
            program = %self.program.display(),
            ?budget,
            "external solver abandoned at deadline"
        );
        SolverError::Timeout { budget }
    }
}

fn expired(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

/// Interpret solver stdout against the problem it was given.
///
/// The reported cost line is not trusted: the cost is recomputed from the
/// model, and a model that breaks a mandatory clause is rejected.
pub fn parse_output(text: &str, problem: &MaxSatProblem<'_>) -> Result<SolverOutcome, SolverError> {
    let mut status = None;
    let mut values: Vec<&str> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("s ") {
            status = Some(rest.trim());
        } else if let Some(rest) = line.strip_prefix("v ") {
            values.extend(rest.split_whitespace());
        }
    }

    match status {
        Some("UNSATISFIABLE") => return Ok(SolverOutcome::Unsatisfiable),
        Some("OPTIMUM FOUND") => {}
        Some("SATISFIABLE") if problem.is_pure_sat() => {}
        Some("SATISFIABLE") => {
            return Err(SolverError::Failure(
                "solver stopped before proving optimality".into(),
            ))
        }
        Some(other) => return Err(SolverError::Failure(format!("solver status `{}`", other))),
        None => return Err(SolverError::Failure("no status line in solver output".into())),
    }

    let n = problem.var_count() as usize;
    let assignment = parse_model(&values, n)?;
    if !problem.satisfies_hard(&assignment) {
        return Err(SolverError::Failure(
            "solver model violates a mandatory clause".into(),
        ));
    }
    let cost = problem.cost_of(&assignment);
    Ok(SolverOutcome::Optimal(Solution { assignment, cost }))
}

/// Accepts both the 2022 bit-string model and the older signed-literal list
fn parse_model(tokens: &[&str], n: usize) -> Result<Vec<bool>, SolverError> {
    let mut assignment = vec![false; n];
    if let [bits] = tokens {
        if bits.len() > 1 && bits.chars().all(|c| c == '0' || c == '1') {
            for (value, c) in assignment.iter_mut().zip(bits.chars()) {
                *value = c == '1';
            }
            return Ok(assignment);
        }
    }
    for token in tokens {
        let lit: i64 = token
            .parse()
            .map_err(|_| SolverError::Failure(format!("bad model token `{}`", token)))?;
        if lit == 0 {
            continue;
        }
        let index = lit.unsigned_abs() as usize - 1;
        if let Some(value) = assignment.get_mut(index) {
            *value = lit > 0;
        }
    }
    Ok(assignment)
}
