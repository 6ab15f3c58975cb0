use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::*;
use crate::ArenaError;
use crate::ArenaParams;
use crate::Error;
use crate::NodeConfig;

fn pooled_arena(
    config: &NodeConfig,
    limit: u64,
) -> PooledArena {
    PooledArena::new(ArenaParams {
        config,
        breaker: Arc::new(CircuitBreaker::new("request", limit)),
    })
    .unwrap()
}

#[test]
fn test_breaker_accounts_and_trips() {
    let breaker = CircuitBreaker::new("request", 100);
    breaker.add_estimate_bytes_and_maybe_break(60, "a").unwrap();
    assert_eq!(breaker.used(), 60);

    let err = breaker.add_estimate_bytes_and_maybe_break(50, "b").unwrap_err();
    assert!(matches!(
        err,
        Error::Arena(ArenaError::CircuitBreaking { wanted: 110, limit: 100, .. })
    ));
    // a trip reserves nothing
    assert_eq!(breaker.used(), 60);
    assert_eq!(breaker.trip_count(), 1);

    breaker.release(60);
    assert_eq!(breaker.used(), 0);
    assert_eq!(breaker.limit(), 100);
}

#[test]
fn test_block_returns_bytes_on_drop() {
    let config = NodeConfig::default();
    let arena = pooled_arena(&config, 1 << 20);

    let block = arena.allocate(1000, "test").unwrap();
    assert_eq!(block.len(), 1000);
    assert_eq!(arena.used_bytes(), 1000);

    drop(block);
    assert_eq!(arena.used_bytes(), 0);
}

#[test]
fn test_page_sized_blocks_are_recycled() {
    let mut config = NodeConfig::default();
    config.arena.page_size_bytes = 64;
    config.arena.max_pooled_pages = 1;
    let arena = pooled_arena(&config, 1 << 20);

    let a = arena.allocate(64, "a").unwrap();
    let b = arena.allocate(64, "b").unwrap();
    let odd = arena.allocate(10, "odd").unwrap();
    drop(a);
    drop(b);
    drop(odd);
    // only one page fits the pool; odd sizes are never pooled
    assert_eq!(arena.pooled_pages(), 1);

    let _c = arena.allocate(64, "c").unwrap();
    assert_eq!(arena.pooled_pages(), 0);
    assert_eq!(arena.page_size(), 64);
}

#[test]
fn test_allocation_over_limit_fails() {
    let config = NodeConfig::default();
    let arena = pooled_arena(&config, 128);

    assert!(arena.allocate(129, "too-big").is_err());
    assert_eq!(arena.used_bytes(), 0);
    assert_eq!(arena.breaker().trip_count(), 1);
}

#[test]
fn test_on_release_runs_before_block_is_returned() {
    let config = NodeConfig::default();
    let arena = pooled_arena(&config, 1 << 20);
    let released = Arc::new(AtomicBool::new(false));
    let flag = released.clone();

    let mut block = arena
        .allocate(8, "hooked")
        .unwrap()
        .on_release(move || flag.store(true, Ordering::SeqCst));
    block.as_mut_slice()[0] = 7;
    assert_eq!(block.as_slice()[0], 7);

    drop(block);
    assert!(released.load(Ordering::SeqCst));
    assert_eq!(arena.used_bytes(), 0);
}
