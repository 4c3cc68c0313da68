use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use labware_replay::SimulationSession;
use labware_replay::protocol::LogParser;
use std::time::Instant;

/// Build a realistic run log: tip, aspirate, dispense, plus instrument chatter
fn build_log(transfers: usize) -> String {
    let mut log = String::new();
    for i in 0..transfers {
        let row = (b'A' + (i % 8) as u8) as char;
        let col = i % 12 + 1;
        log.push_str(&format!(
            "Picking up tip from {row}{col} of Opentrons OT-2 96 Tip Rack 300 µL on slot 3\n\
             Aspirating 120.0 uL from A{col} of NEST 12 Well Reservoir 15 mL on slot 1\n\
             Dispensing 120.0 uL into {row}{col} of NEST 96 Deep Well Plate 2mL 360 µL on slot 5\n\
             Blowing out at {row}{col} of NEST 96 Deep Well Plate 2mL 360 µL on slot 5\n\
             Dropping tip into Trash on slot 12\n"
        ));
    }
    log
}

/// Benchmark parsing (dominated by rule matching)
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    let parser = LogParser::default();

    for transfers in [96, 960] {
        let log = build_log(transfers);
        group.bench_with_input(BenchmarkId::from_parameter(transfers), &log, |b, log| {
            b.iter(|| black_box(parser.parse(log)));
        });
    }
    group.finish();
}

/// Benchmark parse + full replay without timing
fn bench_replay(c: &mut Criterion) {
    let log = build_log(960);

    c.bench_function("replay_960_transfers", |b| {
        b.iter(|| {
            let mut session = SimulationSession::default();
            session.run(&log, Instant::now());
            black_box(session.run_to_end())
        });
    });
}

criterion_group!(benches, bench_parse, bench_replay);
criterion_main!(benches);
