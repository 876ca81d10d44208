use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use crush_bot::{GreedyPolicy, Policy, SearchConfig, SearchDriver};
use crush_core::model::board::Board;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn board_for(size: usize, seed: u64) -> Board {
    let mut rng = StdRng::seed_from_u64(seed);
    match Board::random(size, size, size, 7, &mut rng) {
        Ok(board) => board.masked(),
        Err(err) => panic!("bench board {size}x{size}: {err}"),
    }
}

fn search_decision_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_decision");
    for (size, seed, depth) in [(6usize, 3u64, 3usize), (10, 7, 2), (10, 7, 3)] {
        let board = board_for(size, seed);
        let legal = board.legal_moves();
        if legal.is_empty() {
            continue;
        }
        group.bench_function(format!("minimax_{size}x{size}_d{depth}"), |b| {
            b.iter_batched(
                || SearchDriver::new(SearchConfig::new(depth, 1.7)),
                |mut driver| black_box(driver.choose_move(&board, &legal)),
                BatchSize::SmallInput,
            )
        });
    }

    let board = board_for(10, 7);
    let legal = board.legal_moves();
    group.bench_function("greedy_10x10", |b| {
        b.iter(|| black_box(GreedyPolicy::default().choose_move(&board, &legal)))
    });
    group.finish();
}

criterion_group!(benches, search_decision_bench);
criterion_main!(benches);
