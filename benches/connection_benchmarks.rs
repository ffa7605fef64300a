//! Micro-benchmarks for connection lifecycle operations
//!
//! Measures the overhead the connection layer adds on top of SQLite:
//! - connect/disconnect cycles against an in-memory database
//! - begin/commit and begin/rollback cycles
//! - small statement round-trips through the executor
//!
//! Run with: cargo bench --bench connection_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use db_adapter::connection::{Connection, ConnectionConfig};
use db_adapter::driver::sqlite::{SqliteDriver, MEMORY_DATABASE};

fn memory_connection() -> Connection<SqliteDriver> {
    Connection::new(SqliteDriver::new(), ConnectionConfig::new(MEMORY_DATABASE))
}

// ============================================================================
// Lifecycle Benchmarks
// ============================================================================

fn lifecycle_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifecycle");

    group.bench_function("connect_disconnect", |b| {
        let mut conn = memory_connection();
        b.iter(|| {
            conn.connect().expect("connect");
            conn.disconnect().expect("disconnect");
        });
    });

    group.bench_function("connect_noop_when_connected", |b| {
        let mut conn = memory_connection();
        conn.connect().expect("connect");
        b.iter(|| {
            black_box(conn.connect().expect("connect").is_connected());
        });
    });

    group.finish();
}

// ============================================================================
// Transaction Benchmarks
// ============================================================================

fn transaction_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("transaction");

    group.bench_function("begin_commit_empty", |b| {
        let mut conn = memory_connection();
        conn.connect().expect("connect");
        b.iter(|| {
            conn.begin_transaction().expect("begin");
            conn.commit().expect("commit");
        });
    });

    group.bench_function("begin_rollback_empty", |b| {
        let mut conn = memory_connection();
        conn.connect().expect("connect");
        b.iter(|| {
            conn.begin_transaction().expect("begin");
            conn.rollback().expect("rollback");
        });
    });

    for batch in [1usize, 10, 100] {
        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(
            BenchmarkId::new("insert_batch_commit", batch),
            &batch,
            |b, &batch| {
                let mut conn = memory_connection();
                conn.connect().expect("connect");
                conn.execute("CREATE TABLE bench (id INTEGER PRIMARY KEY, v TEXT)")
                    .expect("create");
                b.iter(|| {
                    conn.begin_transaction().expect("begin");
                    for _ in 0..batch {
                        conn.execute("INSERT INTO bench (v) VALUES ('x')")
                            .expect("insert");
                    }
                    conn.commit().expect("commit");
                });
            },
        );
    }

    group.finish();
}

// ============================================================================
// Statement Benchmarks
// ============================================================================

fn statement_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement");

    group.bench_function("select_literal", |b| {
        let mut conn = memory_connection();
        conn.connect().expect("connect");
        b.iter(|| black_box(conn.execute("SELECT 'foo'").expect("select")));
    });

    group.finish();
}

criterion_group!(
    benches,
    lifecycle_benchmarks,
    transaction_benchmarks,
    statement_benchmarks
);
criterion_main!(benches);
