use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{
    build_constraints, ConstraintBuildOutput, Feasibility, FeasibilityEngine, NeighborCache,
};
use crate::*;

/// Positions proven by the current observation set. Ordered sets keep the
/// result identical across runs on the same snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub proven_safe: BTreeSet<Coord2>,
    pub proven_mine: BTreeSet<Coord2>,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.proven_safe.is_empty() && self.proven_mine.is_empty()
    }

    pub fn len(&self) -> usize {
        self.proven_safe.len() + self.proven_mine.len()
    }
}

/// Cooperative cancellation handle, checked between probes. Clone it into
/// whatever task should be able to abort a long classification.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Classification driver. Owns the neighbor cache for the current board
/// shape and variant and rebuilds it when either changes.
#[derive(Clone, Debug, Default)]
pub struct Analyzer {
    cache: Option<NeighborCache>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(&mut self, board: &Board) -> Result<Classification> {
        self.classify_with_cancel(board, None)
    }

    pub fn classify_with_cancel(
        &mut self,
        board: &Board,
        cancel: Option<&CancelFlag>,
    ) -> Result<Classification> {
        board.validate()?;
        let cache = self.cache_for(board);
        run_classification(board, cache, cancel)
    }

    fn cache_for(&mut self, board: &Board) -> &NeighborCache {
        let stale = self
            .cache
            .as_ref()
            .is_none_or(|cache| !cache.matches(board));
        if stale {
            self.cache = Some(NeighborCache::new(board.size(), board.variant()));
        }
        self.cache.as_ref().expect("cache was just rebuilt")
    }
}

/// One-shot convenience entry point.
pub fn infer(board: &Board) -> Result<Classification> {
    Analyzer::new().classify(board)
}

fn run_classification(
    board: &Board,
    cache: &NeighborCache,
    cancel: Option<&CancelFlag>,
) -> Result<Classification> {
    let built = build_constraints(board, cache);
    log_build(&built);

    if built.nothing_to_classify() {
        return Ok(Classification::default());
    }

    if !built.contradictions.is_empty() {
        log::debug!("build-time contradictions: {:?}", built.contradictions);
        return Err(AnalysisError::InfeasibleConstraints);
    }

    let engine = FeasibilityEngine::new(&built.problem);
    if engine.check_base()? == Feasibility::Unsatisfiable {
        return Err(AnalysisError::InfeasibleConstraints);
    }

    let mut result = Classification::default();

    // An unread clue cell is still a clue cell, so its indicator is pinned
    // false in every satisfying assignment.
    result.proven_safe.extend(built.unread_clues.iter().copied());

    // Without a budget constraint a variable outside every clue constraint
    // can take either value in some satisfying assignment.
    let skip_unprobed: BTreeSet<usize> = if built.problem.has_budget {
        BTreeSet::new()
    } else {
        built
            .problem
            .unconstrained_variable_ids
            .iter()
            .copied()
            .collect()
    };

    for variable in &built.problem.variables {
        if let Some(cancel) = cancel {
            if cancel.is_cancelled() {
                return Err(AnalysisError::Cancelled);
            }
        }
        if skip_unprobed.contains(&variable.id) {
            continue;
        }

        let mine_probe = engine.probe(variable.id, true)?;
        let safe_probe = engine.probe(variable.id, false)?;

        match (mine_probe, safe_probe) {
            (Feasibility::Unsatisfiable, Feasibility::Unsatisfiable) => {
                return Err(AnalysisError::ProbeConflict {
                    cell: variable.coords,
                });
            }
            (Feasibility::Unsatisfiable, Feasibility::Satisfiable) => {
                result.proven_safe.insert(variable.coords);
            }
            (Feasibility::Satisfiable, Feasibility::Unsatisfiable) => {
                result.proven_mine.insert(variable.coords);
            }
            (Feasibility::Satisfiable, Feasibility::Satisfiable) => {}
        }
    }

    Ok(result)
}

fn log_build(built: &ConstraintBuildOutput) {
    let stats = &built.stats;
    log::debug!(
        "constraint build: {} variables, {} clue / {} bound / {} budget constraints, \
         {} components (largest {}), {} contradictions",
        stats.variable_count,
        stats.clue_constraint_count,
        stats.bound_constraint_count,
        stats.budget_constraint_count,
        stats.component_count,
        stats.max_component_variables,
        stats.contradiction_count,
    );
}
