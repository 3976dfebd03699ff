use rustsat::instances::{BasicVarManager, Cnf, SatInstance};
use rustsat::types::Lit;

use super::{BoolTerm, CardConstraint, ConstraintProblem, CountBound};

/// CNF image of a constraint problem: one literal per live variable plus
/// counter clauses for every cardinality bound.
#[derive(Clone, Debug)]
pub(crate) struct EncodedSystem {
    pub(crate) cnf: Cnf,
    pub(crate) cell_lits: Vec<Lit>,
}

pub(crate) fn encode_problem(problem: &ConstraintProblem) -> EncodedSystem {
    let mut instance: SatInstance<BasicVarManager> = SatInstance::new();
    let cell_lits: Vec<Lit> = problem
        .variables
        .iter()
        .map(|_| instance.new_lit())
        .collect();

    for constraint in &problem.constraints {
        encode_constraint(&mut instance, &cell_lits, constraint);
    }

    let (cnf, _) = instance.into_cnf();
    EncodedSystem { cnf, cell_lits }
}

fn term_lit(cell_lits: &[Lit], term: BoolTerm) -> Lit {
    let lit = cell_lits[term.var];
    if term.negated { !lit } else { lit }
}

fn encode_constraint(
    instance: &mut SatInstance<BasicVarManager>,
    cell_lits: &[Lit],
    constraint: &CardConstraint,
) {
    let lits: Vec<Lit> = constraint
        .terms
        .iter()
        .map(|&term| term_lit(cell_lits, term))
        .collect();
    let n = lits.len();

    let (low, high, split) = match constraint.bound {
        CountBound::Exactly(k) => (k, k, None),
        CountBound::AtMost(k) => (0, k, None),
        CountBound::Between(low, high) => (low, high, None),
        CountBound::OneOf(low, high) => (low, high, Some((low, high))),
    };
    let high = high.min(n);
    debug_assert!(low <= high && high <= n);

    if split.is_none() {
        if low == 0 && high == n {
            return;
        }
        if high == 0 {
            for &lit in &lits {
                instance.add_unit(!lit);
            }
            return;
        }
        if low == n {
            for &lit in &lits {
                instance.add_unit(lit);
            }
            return;
        }
    }

    // ge[j - 1] is true iff at least j of the literals are true.
    let ge = unary_counter(instance, &lits, (high + 1).min(n));

    if low >= 1 {
        instance.add_unit(ge[low - 1]);
    }
    if high < n {
        instance.add_unit(!ge[high]);
    }
    if let Some((split_low, split_high)) = split {
        // No count strictly between the two branches: at most `split_low`
        // or at least `split_high` literals are true.
        instance.add_binary(!ge[split_low], ge[split_high - 1]);
    }
}

/// Sequential counter over `lits`, returning output literals for the bounds
/// `1..=kmax`: output `j - 1` holds iff at least `j` literals are true. The
/// counter is equivalence-encoded so bounds can be asserted in either
/// direction through the outputs.
fn unary_counter(
    instance: &mut SatInstance<BasicVarManager>,
    lits: &[Lit],
    kmax: usize,
) -> Vec<Lit> {
    let kmax = kmax.min(lits.len());
    let mut prev: Vec<Lit> = Vec::new();

    for (i, &x) in lits.iter().enumerate() {
        let cols = (i + 1).min(kmax);
        let mut row = Vec::with_capacity(cols);

        for k in 1..=cols {
            let s = instance.new_lit();
            // Running count registers: s ⇔ "at least k of the first i + 1
            // literals", i.e. s ⇔ prev_k ∨ (x ∧ prev_{k-1}), with prev_0
            // true and prev_j false beyond the previous row.
            let s_prev_k = prev.get(k - 1).copied();
            let s_prev_km1 = if k >= 2 {
                Some(prev[k - 2])
            } else {
                None // prev_0 is constant true
            };

            if let Some(p) = s_prev_k {
                instance.add_binary(!p, s);
            }
            match s_prev_km1 {
                None => instance.add_binary(!x, s),
                Some(q) => instance.add_clause([!x, !q, s].into_iter().collect()),
            }

            match (s_prev_k, s_prev_km1) {
                (Some(p), Some(q)) => {
                    instance.add_clause([!s, p, x].into_iter().collect());
                    instance.add_clause([!s, p, q].into_iter().collect());
                }
                (Some(p), None) => {
                    instance.add_clause([!s, p, x].into_iter().collect());
                }
                (None, Some(q)) => {
                    instance.add_binary(!s, x);
                    instance.add_binary(!s, q);
                }
                (None, None) => {
                    instance.add_binary(!s, x);
                }
            }

            row.push(s);
        }

        prev = row;
    }

    prev
}
