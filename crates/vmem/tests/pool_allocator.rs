//! Integration tests for the fixed-chunk pool

use std::collections::BTreeSet;

use nebula_vmem::arena::Arena;
use nebula_vmem::pool::{CHUNK_HEADER_SIZE, Pool, PoolChunk, PoolConfig};
use nebula_vmem::units::KB;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn test_pool_basic() {
    let arena = Arena::new(64 * KB).expect("Failed to create arena");
    let mut pool = Pool::new(&arena, 128, 16);

    let mut chunk = pool.alloc(128).expect("Allocation failed");
    chunk.fill(0x42);
    assert_eq!(chunk[0], 0x42);
    assert_eq!(chunk.len(), 128);

    pool.free(chunk, 128);
    assert_eq!(pool.available(), 16);
}

#[test]
fn test_pool_reuse() {
    let arena = Arena::new(64 * KB).unwrap();
    let mut pool = Pool::new(&arena, 64, 16);

    let first = pool.alloc(64).expect("First allocation failed");
    let addr1 = first.as_ptr().addr();
    pool.free(first, 64);

    let second = pool.alloc(64).expect("Second allocation failed");
    assert_eq!(second.as_ptr().addr(), addr1, "Pool should reuse freed chunks");
    pool.free(second, 64);
}

#[test]
fn test_pool_exhaustion_scenario() {
    let arena = Arena::new(64 * KB).unwrap();
    let mut pool = Pool::with_config(&arena, 32, 3, PoolConfig::debug()).unwrap();
    let arena_used = arena.used();

    let chunks: Vec<PoolChunk<'_>> = (0..3)
        .map(|_| pool.alloc(32).expect("chunk available"))
        .collect();
    let before = pool.stats();

    assert!(pool.alloc(32).is_none());

    let after = pool.stats();
    assert_eq!(after.in_use, before.in_use);
    assert_eq!(after.total_allocs, before.total_allocs);
    assert_eq!(after.exhausted_hits, before.exhausted_hits + 1);
    assert_eq!(arena.used(), arena_used, "exhaustion never touches the arena");

    for chunk in chunks {
        pool.free(chunk, 32);
    }
    assert_eq!(pool.available(), 3);
}

#[test]
fn test_chunks_do_not_overlap() {
    let arena = Arena::new(64 * KB).unwrap();
    let mut pool = Pool::with_config(&arena, 40, 10, PoolConfig::production()).unwrap();

    let mut chunks = Vec::new();
    for i in 0..10u8 {
        let mut chunk = pool.alloc(40).unwrap();
        chunk.fill(i);
        chunks.push(chunk);
    }
    for (i, chunk) in chunks.iter().enumerate() {
        assert!(chunk.iter().all(|&b| usize::from(b) == i), "chunk {i} was overwritten");
    }
    for chunk in chunks {
        pool.free(chunk, 40);
    }
}

#[test]
fn test_pool_is_carved_after_earlier_pushes() {
    let arena = Arena::new(64 * KB).unwrap();
    let header = arena.push(100);
    header.fill(0xAB);

    let mut pool = Pool::with_config(&arena, 24, 8, PoolConfig::production()).unwrap();
    let mut chunks = Vec::new();
    while let Some(mut chunk) = pool.alloc(24) {
        chunk.fill(0xFF);
        chunks.push(chunk);
    }

    assert_eq!(chunks.len(), 8);
    assert!(header.iter().all(|&b| b == 0xAB));
    assert_eq!(arena.used(), 100 + 8 * (24 + CHUNK_HEADER_SIZE));
}

#[test]
fn test_pool_in_subarena() {
    let arena = Arena::new(64 * KB).unwrap();
    let sub = arena.subarena(8 * KB);
    let mut pool = Pool::new(&*sub, 256, 4);

    let chunk = pool.alloc(256).unwrap();
    assert!(pool.owns(chunk.as_ptr()));
    pool.free(chunk, 256);
}

#[test]
#[should_panic(expected = "does not belong to this pool")]
fn test_free_foreign_chunk_is_fatal() {
    let arena = Arena::new(64 * KB).unwrap();
    let mut first = Pool::new(&arena, 16, 2);
    let mut second = Pool::new(&arena, 16, 2);

    let chunk = second.alloc(16).unwrap();
    first.free(chunk, 16);
}

#[test]
#[should_panic(expected = "Chunk size mismatch")]
fn test_free_size_mismatch_is_fatal() {
    let arena = Arena::new(64 * KB).unwrap();
    let mut pool = Pool::new(&arena, 16, 2);
    let chunk = pool.alloc(16).unwrap();
    pool.free(chunk, 32);
}

#[test]
fn test_zeroed_config() {
    let arena = Arena::new(64 * KB).unwrap();
    let mut pool = Pool::with_config(&arena, 16, 1, PoolConfig::zeroed()).unwrap();

    let mut chunk = pool.alloc(16).unwrap();
    chunk.fill(0x5A);
    pool.free(chunk, 16);

    let chunk = pool.alloc(16).unwrap();
    assert!(chunk.iter().all(|&b| b == 0));
}

proptest! {
    #[test]
    fn round_trip_covers_block(
        order in Just((0..12usize).collect::<Vec<_>>()).prop_shuffle(),
        chunk_size in 1usize..200,
    ) {
        let arena = Arena::new(64 * KB).unwrap();
        let mut pool = Pool::with_config(&arena, chunk_size, 12, PoolConfig::production()).unwrap();
        let stride = chunk_size + CHUNK_HEADER_SIZE;
        let block = arena.base().addr();

        let expected: BTreeSet<usize> =
            (0..12).map(|i| block + i * stride + CHUNK_HEADER_SIZE).collect();

        let mut chunks: Vec<Option<PoolChunk<'_>>> =
            (0..12).map(|_| pool.alloc(chunk_size)).collect();
        let first: BTreeSet<usize> =
            chunks.iter().flatten().map(|c| c.as_ptr().addr()).collect();
        prop_assert_eq!(&first, &expected);
        prop_assert!(pool.is_exhausted());

        for &i in &order {
            let chunk = chunks[i].take().unwrap();
            pool.free(chunk, chunk_size);
        }
        prop_assert_eq!(pool.available(), 12);

        let again: Vec<PoolChunk<'_>> =
            (0..12).map(|_| pool.alloc(chunk_size).unwrap()).collect();
        let second: BTreeSet<usize> = again.iter().map(|c| c.as_ptr().addr()).collect();
        prop_assert_eq!(second.len(), 12, "addresses are distinct");
        prop_assert_eq!(&second, &expected);
    }
}
