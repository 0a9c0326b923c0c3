//! Benchmarks for leaderboard snapshot construction
//!
//! Tests the per-tick cost for a full 60-car grid:
//! - Leaderboard snapshot from an in-memory fixture
//! - Per-car array decoding from a raw frame buffer
//! - JSON serialization of the finished snapshot
//!
//! Platform: Cross-platform (synthetic data, CI-safe)

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use pitwall_standings::telemetry::vars;
use pitwall_standings::test_utils::SnapshotFixture;
use pitwall_standings::{FramePacket, Leaderboard, TelemetryFrame, TelemetrySnapshot, VariableSchema, VariableType};
use std::hint::black_box;
use std::sync::Arc;

const CARS: usize = 60;

fn grid_packet() -> FramePacket {
    let schema = VariableSchema::packed([
        (vars::CAR_IDX_POSITION, VariableType::Int32, CARS),
        (vars::CAR_IDX_LAP, VariableType::Int32, CARS),
        (vars::CAR_IDX_LAP_DIST_PCT, VariableType::Float32, CARS),
        (vars::CAR_IDX_LAST_LAP_TIME, VariableType::Float32, CARS),
    ]);

    let mut data = Vec::with_capacity(schema.frame_size);
    (1..=CARS as i32).for_each(|pos| data.extend_from_slice(&pos.to_le_bytes()));
    (0..CARS).for_each(|_| data.extend_from_slice(&5i32.to_le_bytes()));
    (0..CARS).for_each(|idx| data.extend_from_slice(&(idx as f32 / CARS as f32).to_le_bytes()));
    (0..CARS).for_each(|_| data.extend_from_slice(&80.0f32.to_le_bytes()));

    FramePacket::new(data, 1, 1, Arc::new(schema))
}

fn bench_snapshot(c: &mut Criterion) {
    let fixture = SnapshotFixture::field(CARS);
    let mut leaderboard = Leaderboard::default();

    let mut group = c.benchmark_group("leaderboard_snapshot");
    group.throughput(Throughput::Elements(CARS as u64));

    group.bench_function("full_grid", |b| b.iter(|| black_box(leaderboard.snapshot(black_box(&fixture)))));

    let mut pitting = fixture.clone();
    pitting.car_idx_on_pit_road = Some((0..CARS).map(|idx| idx % 4 == 0).collect());
    group.bench_function("full_grid_with_pit_traffic", |b| {
        b.iter(|| black_box(leaderboard.snapshot(black_box(&pitting))))
    });

    group.finish();
}

fn bench_frame_decoding(c: &mut Criterion) {
    let packet = grid_packet();
    let frame_bytes = packet.data.len() as u64;
    let frame = TelemetryFrame::new(Arc::new(packet), None);

    let mut group = c.benchmark_group("frame_decoding");
    group.throughput(Throughput::Bytes(frame_bytes));

    group.bench_function("car_idx_position", |b| b.iter(|| black_box(frame.car_idx_position())));
    group.bench_function("car_idx_lap_dist_pct", |b| b.iter(|| black_box(frame.car_idx_lap_dist_pct())));
    group.bench_function("missing_variable", |b| b.iter(|| black_box(frame.car_idx_best_lap_time())));

    group.finish();
}

fn bench_serialization(c: &mut Criterion) {
    let snapshot = Leaderboard::default().snapshot(&SnapshotFixture::field(CARS));

    c.bench_function("snapshot_to_json", |b| b.iter(|| black_box(snapshot.to_json())));
}

criterion_group!(benches, bench_snapshot, bench_frame_decoding, bench_serialization);
criterion_main!(benches);
