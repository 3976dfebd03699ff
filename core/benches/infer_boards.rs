use criterion::{criterion_group, criterion_main, Criterion};
use desminado_core::{infer, Board, Variant, CODE_UNKNOWN};

/// Budget-only board: every probe runs against the single global constraint.
fn budget_board() -> Board {
    let codes = vec![CODE_UNKNOWN; 100];
    Board::from_codes((10, 10), Variant::Standard, Some(10), &codes).unwrap()
}

/// A revealed plateau with a clue frontier against an unknown half.
fn frontier_board(variant: Variant) -> Board {
    let mut codes = vec![CODE_UNKNOWN; 81];
    for row in 0..4 {
        for col in 0..9 {
            codes[row * 9 + col] = 0;
        }
    }
    for col in 0..9 {
        codes[4 * 9 + col] = 1;
    }
    Board::from_codes((9, 9), variant, None, &codes).unwrap()
}

fn bench_infer(c: &mut Criterion) {
    let budget = budget_board();
    c.bench_function("infer_budget_only_10x10", |b| {
        b.iter(|| infer(&budget).unwrap())
    });

    let frontier = frontier_board(Variant::Standard);
    c.bench_function("infer_frontier_9x9", |b| {
        b.iter(|| infer(&frontier).unwrap())
    });

    let parity = frontier_board(Variant::ParityWeighted);
    c.bench_function("infer_frontier_parity_9x9", |b| {
        b.iter(|| infer(&parity).unwrap())
    });
}

criterion_group!(benches, bench_infer);
criterion_main!(benches);
