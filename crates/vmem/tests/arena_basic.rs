//! Integration tests for the bump arena, run against both backings

use nebula_vmem::arena::Arena;
use nebula_vmem::backing::{HeapBacking, RegionBacking, VirtualBacking};
use nebula_vmem::syscalls::page_size;
use nebula_vmem::units::{DEFAULT_ARENA_SIZE, KB};
use nebula_vmem::MemoryError;
use rstest::rstest;

fn addr(bytes: &[u8]) -> usize {
    bytes.as_ptr().addr()
}

fn fresh<B: RegionBacking>(capacity: usize) -> Arena<B> {
    Arena::with_backing(capacity).expect("Failed to create arena")
}

macro_rules! arena_tests {
    ($name:ident, $backing:ty) => {
        mod $name {
            use pretty_assertions::assert_eq;

            use super::*;

            type Backing = $backing;

            #[test]
            fn test_create_is_empty() {
                let arena = fresh::<Backing>(64 * KB);
                let stats = arena.stats();
                assert_eq!(stats.capacity, 64 * KB);
                assert_eq!(stats.used, 0);
                assert_eq!(stats.committed, 0);
                assert_eq!(stats.remaining, 64 * KB);
                assert!(arena.is_empty());
            }

            #[rstest]
            #[case(1, 1)]
            #[case(13, 200)]
            #[case(4095, 2)]
            #[case(4096, 4096)]
            #[case(4097, 10_000)]
            fn test_consecutive_pushes_are_adjacent_and_zero(#[case] s1: usize, #[case] s2: usize) {
                let arena = fresh::<Backing>(64 * KB);
                let first = arena.push(s1);
                let second = arena.push(s2);

                assert_eq!(addr(second) - addr(first), s1);
                assert!(first.iter().all(|&b| b == 0));
                assert!(second.iter().all(|&b| b == 0));

                first.fill(0xAA);
                second.fill(0x55);
                assert!(first.iter().all(|&b| b == 0xAA));
                assert_eq!(arena.used(), s1 + s2);
            }

            #[test]
            fn test_first_push_starts_at_base() {
                let arena = fresh::<Backing>(KB);
                assert_eq!(arena.push(8).as_ptr(), arena.base());
            }

            #[test]
            fn test_push_zero_is_legal() {
                let arena = fresh::<Backing>(KB);
                arena.push(16);
                let empty = arena.push(0);
                assert!(empty.is_empty());
                assert_eq!(addr(empty), arena.base().addr() + 16);
                assert_eq!(arena.used(), 16);
            }

            #[test]
            fn test_pop_by_then_push_reuses_zeroed_memory() {
                let mut arena = fresh::<Backing>(16 * KB);
                arena.push(4096).fill(0x11);
                let before = arena.current_position();

                let tail = arena.push(1024);
                let tail_addr = addr(tail);
                tail.fill(0xFF);

                arena.pop_by(1024);
                assert_eq!(arena.current_position(), before);

                let again = arena.push(1024);
                assert_eq!(addr(again), tail_addr);
                assert!(again.iter().all(|&b| b == 0));
            }

            #[test]
            fn test_pop_scenario_4096() {
                let mut arena = fresh::<Backing>(8 * KB);
                let block = arena.push(4096);
                let base = addr(block);
                block.fill(0x7E);

                arena.pop_by(1024);
                assert_eq!(arena.used(), 3072);

                let again = arena.push(1024);
                assert_eq!(addr(again), base + 3072);
                assert!(again.iter().all(|&b| b == 0));
            }

            #[test]
            fn test_pop_to_zero_fills_released_range() {
                let mut arena = fresh::<Backing>(16 * KB);
                arena.push(100).fill(1);
                let mark = arena.current_position();
                arena.push(5000).fill(2);

                arena.pop_to(mark);
                assert_eq!(arena.used(), 100);

                let reused = arena.push(5000);
                assert!(reused.iter().all(|&b| b == 0));
            }

            #[test]
            fn test_pop_to_current_is_noop() {
                let mut arena = fresh::<Backing>(KB);
                arena.push(10).fill(9);
                let here = arena.current_position();
                arena.pop_to(here);
                assert_eq!(arena.used(), 10);
            }

            #[test]
            fn test_position_of_pops_allocation_and_after() {
                let mut arena = fresh::<Backing>(KB);
                arena.push(32);
                let second = arena.push(64).as_ptr();
                arena.push(128);

                let position = arena.position_of(second).unwrap();
                assert_eq!(position.used(), 32);
                arena.pop_to(position);
                assert_eq!(arena.used(), 32);
            }

            #[test]
            fn test_clear_then_push_full_capacity() {
                let mut arena = fresh::<Backing>(32 * KB);
                arena.push(10 * KB);
                arena.push(7);
                arena.clear();

                assert_eq!(arena.used(), 0);
                let all = arena.push(arena.capacity());
                assert_eq!(all.len(), 32 * KB);
                assert_eq!(arena.remaining(), 0);
            }

            #[test]
            fn test_clear_keeps_commit_mark() {
                let mut arena = fresh::<Backing>(32 * KB);
                arena.push(20 * KB);
                let committed = arena.committed();
                arena.clear();
                assert_eq!(arena.committed(), committed);
            }

            #[test]
            fn test_try_push_reports_exhaustion() {
                let arena = fresh::<Backing>(KB);
                arena.push(1000);

                let err = arena.try_push(100).unwrap_err();
                assert!(matches!(
                    err,
                    MemoryError::ArenaExhausted {
                        requested: 100,
                        available: 24
                    }
                ));
                assert_eq!(arena.used(), 1000, "failed push leaves the arena unchanged");
                assert!(arena.try_push(usize::MAX).is_err());
            }

            #[test]
            #[should_panic(expected = "Arena exhausted")]
            fn test_push_overflow_is_fatal() {
                let arena = fresh::<Backing>(KB);
                arena.push(KB + 1);
            }

            #[test]
            fn test_try_pop_errors_leave_arena_unchanged() {
                let mut arena = fresh::<Backing>(KB);
                arena.push(10);
                assert!(matches!(
                    arena.try_pop_by(11),
                    Err(MemoryError::PopUnderflow { amount: 11, used: 10 })
                ));

                let mut other = fresh::<Backing>(KB);
                let foreign = other.current_position();
                assert!(matches!(arena.try_pop_to(foreign), Err(MemoryError::ForeignPosition)));

                let ahead = {
                    other.push(100);
                    other.current_position()
                };
                other.pop_by(100);
                assert!(matches!(other.try_pop_to(ahead), Err(MemoryError::InvalidPop { .. })));
                assert_eq!(arena.used(), 10);
            }

            #[test]
            #[should_panic(expected = "Pop underflow")]
            fn test_pop_by_underflow_is_fatal() {
                let mut arena = fresh::<Backing>(KB);
                arena.push(10);
                arena.pop_by(11);
            }

            #[test]
            fn test_destroy_releases() {
                let arena = fresh::<Backing>(64 * KB);
                arena.push(10 * KB).fill(3);
                arena.destroy().unwrap();
            }

            #[test]
            fn test_committed_never_exceeds_capacity() {
                let arena = fresh::<Backing>(3 * KB);
                arena.push(3 * KB);
                assert_eq!(arena.committed(), 3 * KB);
                assert!(arena.committed() <= arena.capacity());
            }

            #[test]
            fn test_arena_moves_to_another_thread() {
                let arena = fresh::<Backing>(KB);
                arena.push(8).fill(4);
                let used = std::thread::spawn(move || {
                    arena.push(8);
                    arena.used()
                })
                .join()
                .unwrap();
                assert_eq!(used, 16);
            }
        }
    };
}

arena_tests!(virtual_backing, VirtualBacking);
arena_tests!(heap_backing, HeapBacking);

#[test]
fn test_default_capacity() {
    let arena = Arena::with_default_capacity().unwrap();
    assert_eq!(arena.capacity(), DEFAULT_ARENA_SIZE);
    assert_eq!(DEFAULT_ARENA_SIZE, 4 * 1024 * 1024);
}

#[test]
fn test_lazy_commit_tracks_high_water_mark() {
    let mut arena = Arena::<VirtualBacking>::with_backing(16 * page_size()).unwrap();
    arena.push(10);
    assert_eq!(arena.committed(), 10);

    arena.push(3 * page_size());
    assert_eq!(arena.committed(), 10 + 3 * page_size());

    arena.pop_by(3 * page_size());
    assert_eq!(arena.committed(), 10 + 3 * page_size(), "pops never decommit");
}

#[test]
fn test_large_reservation_is_lazy() {
    // A gigabyte of address space costs nothing until touched.
    let arena = Arena::<VirtualBacking>::with_backing(1 << 30).unwrap();
    let bytes = arena.push(page_size());
    bytes.fill(0xEE);
    assert_eq!(arena.committed(), page_size());
}
