use rustsat::solvers::{Solve, SolverResult};
use rustsat::types::{Clause, Lit};
use rustsat_batsat::BasicSolver;

use super::encode::{encode_problem, EncodedSystem};
use super::ConstraintProblem;
use crate::{AnalysisError, Result};

/// Outcome of one satisfiability query.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Feasibility {
    Satisfiable,
    Unsatisfiable,
}

impl Feasibility {
    pub const fn is_satisfiable(self) -> bool {
        matches!(self, Self::Satisfiable)
    }
}

/// Answers satisfiability queries against a fixed base constraint system.
///
/// Every query runs on a private solver loaded with its own copy of the base
/// CNF, so a probe's temporary forcing can never leak into another query's
/// view and queries may run in any order, or concurrently.
#[derive(Clone, Debug)]
pub struct FeasibilityEngine {
    system: EncodedSystem,
}

impl FeasibilityEngine {
    pub fn new(problem: &ConstraintProblem) -> Self {
        Self {
            system: encode_problem(problem),
        }
    }

    pub fn variable_count(&self) -> usize {
        self.system.cell_lits.len()
    }

    /// Satisfiability of the base system with nothing forced.
    pub fn check_base(&self) -> Result<Feasibility> {
        self.run(None)
    }

    /// Satisfiability with one variable temporarily forced to a value.
    pub fn probe(&self, var: usize, forced_mine: bool) -> Result<Feasibility> {
        let lit = self.system.cell_lits[var];
        self.run(Some(if forced_mine { lit } else { !lit }))
    }

    fn run(&self, forced: Option<Lit>) -> Result<Feasibility> {
        let mut solver = BasicSolver::default();
        solver
            .add_cnf(self.system.cnf.clone())
            .map_err(|err| AnalysisError::Backend(err.to_string()))?;

        if let Some(lit) = forced {
            let clause: Clause = [lit].into_iter().collect();
            solver
                .add_clause(clause)
                .map_err(|err| AnalysisError::Backend(err.to_string()))?;
        }

        match solver
            .solve()
            .map_err(|err| AnalysisError::Backend(err.to_string()))?
        {
            SolverResult::Sat => Ok(Feasibility::Satisfiable),
            SolverResult::Unsat => Ok(Feasibility::Unsatisfiable),
            other => Err(AnalysisError::Backend(format!(
                "unexpected solver outcome: {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{BoolTerm, CardConstraint, ConstraintKind, CountBound, MineVariable};

    fn two_cell_problem(bound: CountBound) -> ConstraintProblem {
        ConstraintProblem {
            variables: vec![
                MineVariable {
                    id: 0,
                    coords: (0, 0),
                },
                MineVariable {
                    id: 1,
                    coords: (0, 1),
                },
            ],
            constraints: vec![CardConstraint {
                id: 0,
                kind: ConstraintKind::Clue { cell: (1, 0) },
                terms: vec![
                    BoolTerm {
                        var: 0,
                        negated: false,
                    },
                    BoolTerm {
                        var: 1,
                        negated: false,
                    },
                ],
                bound,
            }],
            components: Vec::new(),
            unconstrained_variable_ids: Vec::new(),
            has_budget: false,
        }
    }

    #[test]
    fn base_check_accepts_a_satisfiable_system() {
        let engine = FeasibilityEngine::new(&two_cell_problem(CountBound::Exactly(1)));
        assert_eq!(engine.check_base().unwrap(), Feasibility::Satisfiable);
    }

    #[test]
    fn probes_detect_forced_values() {
        // Exactly two mines among two cells: both probes for "safe" fail.
        let engine = FeasibilityEngine::new(&two_cell_problem(CountBound::Exactly(2)));
        assert_eq!(
            engine.probe(0, false).unwrap(),
            Feasibility::Unsatisfiable
        );
        assert_eq!(engine.probe(0, true).unwrap(), Feasibility::Satisfiable);
    }

    #[test]
    fn probes_leave_no_trace_on_the_base_system() {
        let engine = FeasibilityEngine::new(&two_cell_problem(CountBound::Exactly(1)));

        // Opposite forcings in sequence both succeed against the same base.
        assert_eq!(engine.probe(0, true).unwrap(), Feasibility::Satisfiable);
        assert_eq!(engine.probe(0, false).unwrap(), Feasibility::Satisfiable);
        assert_eq!(engine.probe(0, true).unwrap(), Feasibility::Satisfiable);
        assert_eq!(engine.check_base().unwrap(), Feasibility::Satisfiable);
    }

    #[test]
    fn empty_problem_is_trivially_satisfiable() {
        let engine = FeasibilityEngine::new(&ConstraintProblem::default());
        assert_eq!(engine.check_base().unwrap(), Feasibility::Satisfiable);
        assert_eq!(engine.variable_count(), 0);
    }
}
