use std::collections::{BTreeMap, BTreeSet};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::NeighborCache;
use crate::*;

/// One live boolean decision variable: "this cell holds a mine". Only
/// `Unknown` cells become variables; every other mark pins its indicator at
/// build time and is folded into the constraint arithmetic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MineVariable {
    pub id: usize,
    pub coords: Coord2,
}

/// A variable occurrence inside a cardinality constraint. A negated term
/// counts the variable being false; entering even-parity indicators negated
/// turns the parity-weighted signed sum into a plain true-term count.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoolTerm {
    pub var: usize,
    pub negated: bool,
}

/// Bound on the number of true terms in a constraint.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountBound {
    Exactly(usize),
    AtMost(usize),
    Between(usize, usize),
    /// The count equals the low value or the high value, nothing in between.
    OneOf(usize, usize),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// A read clue: its neighbor count is known exactly.
    Clue { cell: Coord2 },
    /// An unread clue: some value 0..=8 exists there, so its neighbor count
    /// is only bounded.
    ClueBound { cell: Coord2 },
    /// The board-wide total-mine budget.
    MineBudget,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardConstraint {
    pub id: usize,
    pub kind: ConstraintKind,
    pub terms: Vec<BoolTerm>,
    pub bound: CountBound,
}

/// Variables and constraints reachable from each other through shared cells.
/// The budget constraint is left out: it spans the whole board and would
/// collapse everything into one component.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintComponent {
    pub variable_ids: Vec<usize>,
    pub constraint_ids: Vec<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintProblem {
    pub variables: Vec<MineVariable>,
    pub constraints: Vec<CardConstraint>,
    pub components: Vec<ConstraintComponent>,
    pub unconstrained_variable_ids: Vec<usize>,
    pub has_budget: bool,
}

/// Inconsistency detected while still assembling the system; any of these
/// means the observation set admits no assignment at all.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contradiction {
    ClueImpossible {
        cell: Coord2,
        target: i32,
        live_neighbors: usize,
    },
    ClueBoundImpossible {
        cell: Coord2,
    },
    BudgetImpossible {
        target: i32,
        live_variables: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintStats {
    pub variable_count: usize,
    pub clue_constraint_count: usize,
    pub bound_constraint_count: usize,
    pub budget_constraint_count: usize,
    pub component_count: usize,
    pub max_component_variables: usize,
    pub contradiction_count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintBuildOutput {
    pub problem: ConstraintProblem,
    /// Unread clue cells: classification targets whose indicator is already
    /// pinned false.
    pub unread_clues: Vec<Coord2>,
    pub contradictions: Vec<Contradiction>,
    pub stats: ConstraintStats,
}

impl ConstraintBuildOutput {
    /// True when no position is left for a classification run to decide.
    pub fn nothing_to_classify(&self) -> bool {
        self.problem.variables.is_empty() && self.unread_clues.is_empty()
    }
}

pub fn build_constraints(board: &Board, cache: &NeighborCache) -> ConstraintBuildOutput {
    debug_assert!(cache.matches(board));

    let mut contradictions = Vec::new();
    let mut variables = Vec::new();
    let mut unread_clues = Vec::new();
    let mut variable_ids: Array2<Option<usize>> =
        Array2::from_elem(board.size().to_nd_index(), None);
    let mut flagged_total: usize = 0;

    for (coords, mark) in board.iter_marks() {
        match mark {
            CellMark::Unknown => {
                let id = variables.len();
                variables.push(MineVariable { id, coords });
                variable_ids[coords.to_nd_index()] = Some(id);
            }
            CellMark::Flagged => flagged_total += 1,
            CellMark::ClueUnread => unread_clues.push(coords),
            CellMark::Clue(_) => {}
        }
    }

    let parity_weighted = board.variant().uses_parity_weights();
    let mut constraints: Vec<CardConstraint> = Vec::new();
    let mut clue_constraint_count = 0;
    let mut bound_constraint_count = 0;

    for (cell, mark) in board.iter_marks() {
        let read_value = match mark {
            CellMark::Clue(count) => Some(count),
            CellMark::ClueUnread => None,
            _ => continue,
        };

        // Fold the pinned indicators out of the clue relation: a flagged
        // neighbor contributes its weight, a revealed neighbor contributes
        // nothing, and only unknown neighbors stay as terms. With parity
        // weights an even-parity term enters negated, so the true-term count
        // tracks the signed sum shifted by the negated-term count.
        let mut base: i32 = 0;
        let mut negated_terms: i32 = 0;
        let mut terms = Vec::new();

        for &neighbor in cache.neighbors_of(cell) {
            let weight: i32 = if parity_weighted {
                cache.parity_of(neighbor).weight().into()
            } else {
                1
            };
            match board[neighbor] {
                CellMark::Flagged => base += weight,
                CellMark::Clue(_) | CellMark::ClueUnread => {}
                CellMark::Unknown => {
                    let var = variable_ids[neighbor.to_nd_index()]
                        .expect("unknown cell should have a variable");
                    let negated = weight < 0;
                    if negated {
                        negated_terms += 1;
                    }
                    terms.push(BoolTerm { var, negated });
                }
            }
        }

        let len = terms.len();
        let shift = negated_terms - base;

        let bound = match read_value {
            Some(count) => {
                // True-term count hitting the clue from either sign branch;
                // only the parity variant has a negative branch.
                let mut targets = vec![i32::from(count) + shift];
                if parity_weighted {
                    let negative_branch = -i32::from(count) + shift;
                    if negative_branch != targets[0] {
                        targets.push(negative_branch);
                    }
                }
                targets.retain(|&target| target >= 0 && target as usize <= len);
                targets.sort_unstable();

                match targets[..] {
                    [] => {
                        contradictions.push(Contradiction::ClueImpossible {
                            cell,
                            target: i32::from(count) + shift,
                            live_neighbors: len,
                        });
                        continue;
                    }
                    [target] => CountBound::Exactly(target as usize),
                    [low, high] => CountBound::OneOf(low as usize, high as usize),
                    _ => unreachable!("at most two sign branches"),
                }
            }
            None => {
                // Any clue value 0..=8 could sit here: only the spread of
                // reachable sums is constrained.
                let low = (-i32::from(MAX_CLUE) + shift).max(0);
                let high = (i32::from(MAX_CLUE) + shift).min(len as i32);
                if low > high {
                    contradictions.push(Contradiction::ClueBoundImpossible { cell });
                    continue;
                }
                if low == 0 && high as usize == len {
                    continue;
                }
                if low == 0 {
                    CountBound::AtMost(high as usize)
                } else {
                    CountBound::Between(low as usize, high as usize)
                }
            }
        };

        if terms.is_empty() {
            // The clue is already satisfied by its pinned neighbors alone.
            continue;
        }

        match mark {
            CellMark::Clue(_) => clue_constraint_count += 1,
            _ => bound_constraint_count += 1,
        }
        constraints.push(CardConstraint {
            id: constraints.len(),
            kind: match mark {
                CellMark::Clue(_) => ConstraintKind::Clue { cell },
                _ => ConstraintKind::ClueBound { cell },
            },
            terms,
            bound,
        });
    }

    let mut budget_constraint_count = 0;

    if let Some(budget) = board.mine_budget() {
        let target = i32::from(budget) - flagged_total as i32;
        if target < 0 || target as usize > variables.len() {
            contradictions.push(Contradiction::BudgetImpossible {
                target,
                live_variables: variables.len(),
            });
        } else if !variables.is_empty() {
            constraints.push(CardConstraint {
                id: constraints.len(),
                kind: ConstraintKind::MineBudget,
                terms: variables
                    .iter()
                    .map(|var| BoolTerm {
                        var: var.id,
                        negated: false,
                    })
                    .collect(),
                bound: CountBound::Exactly(target as usize),
            });
            budget_constraint_count = 1;
        }
    }

    let (components, unconstrained_variable_ids) =
        build_components(variables.len(), &constraints);

    let max_component_variables = components
        .iter()
        .map(|component| component.variable_ids.len())
        .max()
        .unwrap_or(0);

    let problem = ConstraintProblem {
        variables,
        constraints,
        components,
        unconstrained_variable_ids,
        has_budget: budget_constraint_count > 0,
    };

    let stats = ConstraintStats {
        variable_count: problem.variables.len(),
        clue_constraint_count,
        bound_constraint_count,
        budget_constraint_count,
        component_count: problem.components.len(),
        max_component_variables,
        contradiction_count: contradictions.len(),
    };

    ConstraintBuildOutput {
        problem,
        unread_clues,
        contradictions,
        stats,
    }
}

fn build_components(
    variable_count: usize,
    constraints: &[CardConstraint],
) -> (Vec<ConstraintComponent>, Vec<usize>) {
    let mut dsu = Dsu::new(variable_count);
    let mut touched = vec![false; variable_count];

    for constraint in constraints {
        if matches!(constraint.kind, ConstraintKind::MineBudget) {
            continue;
        }

        if let Some((first, rest)) = constraint.terms.split_first() {
            touched[first.var] = true;
            for term in rest {
                touched[term.var] = true;
                dsu.union(first.var, term.var);
            }
        }
    }

    let mut root_to_component = BTreeMap::new();
    let mut components = Vec::new();

    for var in 0..variable_count {
        if !touched[var] {
            continue;
        }

        let root = dsu.find(var);
        let component_idx = *root_to_component.entry(root).or_insert_with(|| {
            components.push(ConstraintComponent {
                variable_ids: Vec::new(),
                constraint_ids: Vec::new(),
            });
            components.len() - 1
        });

        components[component_idx].variable_ids.push(var);
    }

    for constraint in constraints {
        if matches!(constraint.kind, ConstraintKind::MineBudget) {
            continue;
        }

        let mut roots = BTreeSet::new();
        for term in &constraint.terms {
            if touched[term.var] {
                roots.insert(dsu.find(term.var));
            }
        }

        for root in roots {
            if let Some(&component_idx) = root_to_component.get(&root) {
                components[component_idx].constraint_ids.push(constraint.id);
            }
        }
    }

    for component in &mut components {
        component.variable_ids.sort_unstable();
        component.constraint_ids.sort_unstable();
        component.constraint_ids.dedup();
    }

    let mut unconstrained_variable_ids = Vec::new();
    for (var_id, was_touched) in touched.into_iter().enumerate() {
        if !was_touched {
            unconstrained_variable_ids.push(var_id);
        }
    }

    (components, unconstrained_variable_ids)
}

#[derive(Clone, Debug)]
struct Dsu {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl Dsu {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, value: usize) -> usize {
        if self.parent[value] != value {
            let root = self.find(self.parent[value]);
            self.parent[value] = root;
        }
        self.parent[value]
    }

    fn union(&mut self, left: usize, right: usize) {
        let mut left_root = self.find(left);
        let mut right_root = self.find(right);

        if left_root == right_root {
            return;
        }

        if self.rank[left_root] < self.rank[right_root] {
            core::mem::swap(&mut left_root, &mut right_root);
        }

        self.parent[right_root] = left_root;
        if self.rank[left_root] == self.rank[right_root] {
            self.rank[left_root] += 1;
        }
    }
}
