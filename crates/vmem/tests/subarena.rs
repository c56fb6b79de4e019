//! Integration tests for nested arenas

use nebula_vmem::arena::{ARENA_HEADER_SIZE, Arena};
use nebula_vmem::backing::{HeapBacking, RegionBacking, VirtualBacking};
use nebula_vmem::units::KB;
use nebula_vmem::MemoryError;
use rstest::rstest;

fn fresh<B: RegionBacking>(capacity: usize) -> Arena<B> {
    Arena::with_backing(capacity).expect("Failed to create arena")
}

fn two_carves_do_not_overlap<B: RegionBacking>() {
    let arena = fresh::<B>(4 * KB);
    let first = arena.subarena(100);
    let second = arena.subarena(100);

    assert!(first.capacity() >= 100);
    assert!(second.capacity() >= 100);

    let a = first.base().addr();
    let b = second.base().addr();
    assert!(b - a >= 100 + ARENA_HEADER_SIZE);
    assert!(a + first.capacity() <= b - ARENA_HEADER_SIZE);

    first.push(100).fill(0x11);
    second.push(100).fill(0x22);

    // SAFETY: both sub-arenas are alive and fully pushed.
    let (x, y) = unsafe {
        (
            std::slice::from_raw_parts(first.base(), 100),
            std::slice::from_raw_parts(second.base(), 100),
        )
    };
    assert!(x.iter().all(|&v| v == 0x11));
    assert!(y.iter().all(|&v| v == 0x22));
}

fn writes_stay_inside_subarena<B: RegionBacking>() {
    let arena = fresh::<B>(64 * KB);
    let before = arena.push(64);
    before.fill(0xAA);

    let sub = arena.subarena(8 * KB);
    let after = arena.push(64);
    after.fill(0xBB);

    let body = sub.push(8 * KB);
    body.fill(0xCC);
    assert!(matches!(
        sub.try_push(1),
        Err(MemoryError::ArenaExhausted { requested: 1, available: 0 })
    ));

    assert!(sub.try_subarena(0).is_err(), "a full sub-arena cannot carve");

    assert!(before.iter().all(|&b| b == 0xAA));
    assert!(after.iter().all(|&b| b == 0xBB));
    assert!(body.iter().all(|&b| b == 0xCC));
}

fn subarena_has_full_arena_semantics<B: RegionBacking>() {
    let arena = fresh::<B>(64 * KB);
    let mut sub = arena.subarena(16 * KB);
    assert_eq!(sub.used(), 0);
    assert_eq!(sub.committed(), 0);

    let mark = sub.current_position();
    sub.push(5000).fill(0x44);
    sub.pop_to(mark);
    assert!(sub.push(5000).iter().all(|&b| b == 0));

    sub.pop_by(5000);
    sub.clear();
    assert_eq!(sub.push(16 * KB).len(), 16 * KB);

    let parent_pos = arena.current_position();
    assert!(matches!(sub.try_pop_to(parent_pos), Err(MemoryError::ForeignPosition)));
}

fn parent_reclaims_carved_range<B: RegionBacking>() {
    let mut arena = fresh::<B>(64 * KB);
    arena.push(10);
    let mark = arena.current_position();

    {
        let sub = arena.subarena(20 * KB);
        sub.push(10 * KB).fill(0x99);
        let inner = sub.subarena(KB);
        inner.push(KB).fill(0x77);
    }

    arena.pop_to(mark);
    let reused = arena.push(20 * KB + ARENA_HEADER_SIZE);
    assert!(reused.iter().all(|&b| b == 0));
}

#[rstest]
#[case::virtual_backing(two_carves_do_not_overlap::<VirtualBacking> as fn())]
#[case::heap_backing(two_carves_do_not_overlap::<HeapBacking> as fn())]
fn test_two_carves_do_not_overlap(#[case] run: fn()) {
    run();
}

#[rstest]
#[case::virtual_backing(writes_stay_inside_subarena::<VirtualBacking> as fn())]
#[case::heap_backing(writes_stay_inside_subarena::<HeapBacking> as fn())]
fn test_writes_stay_inside_subarena(#[case] run: fn()) {
    run();
}

#[rstest]
#[case::virtual_backing(subarena_has_full_arena_semantics::<VirtualBacking> as fn())]
#[case::heap_backing(subarena_has_full_arena_semantics::<HeapBacking> as fn())]
fn test_subarena_has_full_arena_semantics(#[case] run: fn()) {
    run();
}

#[rstest]
#[case::virtual_backing(parent_reclaims_carved_range::<VirtualBacking> as fn())]
#[case::heap_backing(parent_reclaims_carved_range::<HeapBacking> as fn())]
fn test_parent_reclaims_carved_range(#[case] run: fn()) {
    run();
}

#[test]
fn test_carve_exhaustion() {
    let arena = fresh::<VirtualBacking>(KB);
    let err = arena.try_subarena(KB).unwrap_err();
    assert_eq!(err.code(), "MEM:ARENA:EXHAUSTED");
    assert_eq!(arena.used(), 0);
}

#[test]
#[should_panic(expected = "Arena exhausted")]
fn test_carve_overflow_is_fatal() {
    let arena = fresh::<HeapBacking>(KB);
    let _sub = arena.subarena(KB);
}

#[test]
fn test_parent_allocates_while_child_lives() {
    let arena = fresh::<VirtualBacking>(64 * KB);
    let sub = arena.subarena(KB);
    let parent_bytes = arena.push(KB);
    let child_bytes = sub.push(KB);

    parent_bytes.fill(1);
    child_bytes.fill(2);
    assert!(parent_bytes.iter().all(|&b| b == 1));
    assert!(child_bytes.iter().all(|&b| b == 2));
    assert_eq!(arena.used(), KB + ARENA_HEADER_SIZE + KB);
}
