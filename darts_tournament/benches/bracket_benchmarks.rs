use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use darts_tournament::{
    Bracket, GameRules, IdAllocator, KnockoutMode, Player, Score, Seeder, TournamentClass,
    bracket::{BracketBuilder, enter_result, stabilize},
    group::{Group, calculate_standings},
    rules::RoundRules,
};
use std::hint::black_box;

fn players(n: usize) -> Vec<Player> {
    (1..=n as i64)
        .map(|id| Player::new(id, &format!("player{id}")))
        .collect()
}

fn build(mode: KnockoutMode, field: &[Player]) -> Bracket {
    let rules = GameRules::knockout(mode, 2);
    let mut seeder = Seeder::with_seed(1);
    let mut ids = IdAllocator::new();
    BracketBuilder::new(&rules, &mut seeder, &mut ids)
        .build(field, &[])
        .unwrap()
}

/// Benchmark bracket construction for growing fields
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("bracket_build");
    for n in [8, 23, 64] {
        let field = players(n);
        group.bench_with_input(
            BenchmarkId::new("single_elimination", n),
            &field,
            |b, field| b.iter(|| build(KnockoutMode::SingleElimination, black_box(field))),
        );
        group.bench_with_input(
            BenchmarkId::new("double_elimination", n),
            &field,
            |b, field| b.iter(|| build(KnockoutMode::DoubleElimination, black_box(field))),
        );
    }
    group.finish();
}

/// Benchmark playing a whole bracket, one propagation per result
fn bench_play_through(c: &mut Criterion) {
    let mut group = c.benchmark_group("bracket_play_through");
    let rules = RoundRules::default();
    for n in [16, 48] {
        let bracket = build(KnockoutMode::DoubleElimination, &players(n));
        group.bench_with_input(BenchmarkId::from_parameter(format!("{n}_players")), &bracket, |b, bracket| {
            b.iter(|| {
                let mut bracket = bracket.clone();
                loop {
                    let next = bracket.playable_nodes().next().map(|node| node.id);
                    let Some(id) = next else { break };
                    enter_result(&mut bracket, id, Score::legs(3, 1), &rules).unwrap();
                }
                black_box(bracket)
            })
        });
    }
    group.finish();
}

/// Benchmark a no-op stabilization of a settled bracket
fn bench_stabilize(c: &mut Criterion) {
    let bracket = build(KnockoutMode::DoubleElimination, &players(64));
    c.bench_function("stabilize_settled_64", |b| {
        b.iter(|| {
            let mut bracket = bracket.clone();
            black_box(stabilize(&mut bracket))
        })
    });
}

/// Benchmark standings of a played 12-player group
fn bench_standings(c: &mut Criterion) {
    let mut ids = IdAllocator::new();
    let mut group = Group::new(1, "Group A").with_players(players(12));
    group.generate_matches(&mut ids, false);
    let rules = RoundRules::default();
    for m in &mut group.matches {
        m.record_result(Score::legs(3, 2), &rules).unwrap();
    }

    c.bench_function("standings_12_players", |b| {
        b.iter(|| calculate_standings(black_box(&group)))
    });
}

/// Benchmark a full class: groups, knockout and champion
fn bench_full_class(c: &mut Criterion) {
    c.bench_function("full_class_32_players", |b| {
        b.iter(|| {
            let rules = GameRules::knockout(KnockoutMode::DoubleElimination, 2);
            let mut class = TournamentClass::new("Bench", rules).unwrap().with_seed(9);
            for idx in 0..32 {
                class.register_player(&format!("player{idx}")).unwrap();
            }
            class.create_groups(8).unwrap();
            let ids: Vec<u64> = class.phases()[0]
                .groups()
                .iter()
                .flat_map(|g| g.matches.iter().map(|m| m.id))
                .collect();
            for id in ids {
                class.enter_result(id, Score::legs(3, 0)).unwrap();
            }
            class.advance().unwrap();
            loop {
                let next = class
                    .bracket()
                    .and_then(|b| b.playable_nodes().next())
                    .map(|n| n.id);
                let Some(id) = next else { break };
                class.enter_result(id, Score::legs(3, 1)).unwrap();
            }
            black_box(class.champion())
        })
    });
}

criterion_group!(construction, bench_build, bench_standings);
criterion_group!(progression, bench_play_through, bench_stabilize, bench_full_class);
criterion_main!(construction, progression);
