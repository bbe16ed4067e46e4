//! Microbenchmarks for the feed and sweep hot paths.

use criterion::{Criterion, criterion_group, criterion_main};
use kennel_watchdog::prelude::*;
use kennel_watchdog::{DogRecord, Registry};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

fn idle_watchdog() -> Watchdog {
    let config = WatchdogConfig::builder()
        .tick_interval(Duration::from_secs(3600))
        .build()
        .expect("valid config");
    Watchdog::with_termination_handler(config, Arc::new(|_dead: &ExpiredDog| {}))
        .expect("valid config")
}

fn bench_feed(c: &mut Criterion) {
    let watchdog = idle_watchdog();
    watchdog.create("bench", u32::MAX).expect("create");

    c.bench_function("feed_own_dog", |b| {
        b.iter(|| watchdog.feed().expect("dog is registered"));
    });
}

fn bench_create_delete(c: &mut Criterion) {
    let watchdog = idle_watchdog();

    c.bench_function("create_delete_cycle", |b| {
        b.iter(|| {
            watchdog
                .create(black_box("cycle"), black_box(100))
                .expect("create");
            watchdog.delete().expect("delete");
        });
    });
}

fn bench_sweep(c: &mut Criterion) {
    let mut registry = Registry::new();
    for i in 0..100u64 {
        registry.push(DogRecord::new(
            format!("dog_{i}"),
            WorkerId::from_raw(i),
            u32::MAX,
        ));
    }

    c.bench_function("sweep_100_dogs", |b| {
        b.iter(|| black_box(registry.sweep()));
    });
}

criterion_group!(benches, bench_feed, bench_create_delete, bench_sweep);
criterion_main!(benches);
