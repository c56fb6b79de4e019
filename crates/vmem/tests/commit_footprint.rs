//! Resident memory after rewinding over large carves
//!
//! Kept to a single test per binary so the resident set is not shared with
//! other tests running in parallel.

#![cfg(all(target_os = "linux", target_pointer_width = "64"))]

use nebula_vmem::arena::Arena;
use nebula_vmem::backing::VirtualBacking;
use nebula_vmem::syscalls::page_size;
use nebula_vmem::units::{GB, MB};

fn resident_bytes() -> usize {
    let statm = std::fs::read_to_string("/proc/self/statm").expect("statm is readable");
    let pages: usize = statm
        .split_whitespace()
        .nth(1)
        .and_then(|field| field.parse().ok())
        .expect("statm has a resident field");
    pages * page_size()
}

#[test]
fn test_pop_past_gigabyte_carve_stays_unbacked() {
    let mut arena = Arena::<VirtualBacking>::with_backing(GB + MB).unwrap();
    arena.push(64).fill(1);
    let mark = arena.current_position();

    {
        let scratch = arena.subarena(GB);
        scratch.push(4096).fill(0xAB);
    }

    let before = resident_bytes();
    arena.pop_to(mark);
    let after = resident_bytes();

    assert!(
        after.saturating_sub(before) < 64 * MB,
        "pop grew the resident set from {before} to {after} bytes"
    );
    assert_eq!(arena.used(), 64);
    assert!(arena.push(4096).iter().all(|&b| b == 0));
}
