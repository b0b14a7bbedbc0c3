//! Branch-Outcome Queue Unit Tests.
//!
//! Verifies:
//! 1. Entries keep every field of the recorded outcome.
//! 2. The cursor sits one past the newest entry on insert and rewinds toward the oldest.
//! 3. Threads have independent queues and cursors.
//! 4. Cursor movement past either end is reported, not wrapped.

use o3rob_core::Boq;
use o3rob_core::common::{BoqError, PcState, ThreadId};
use o3rob_core::core::pipeline::BoqEntry;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const T0: ThreadId = ThreadId::new(0);
const T1: ThreadId = ThreadId::new(1);

fn record(boq: &mut Boq, tid: ThreadId, pc: u64) {
    boq.insert_branch_outcome(
        tid,
        &PcState::sequential(pc, 4),
        &PcState::sequential(pc + 0x80, 4),
        0,
        0,
        true,
    )
    .unwrap();
}

#[test]
fn entry_keeps_every_field() {
    let mut boq = Boq::new();
    boq.insert_branch_outcome(
        T0,
        &PcState::new(0x400, 0x404),
        &PcState::new(0x800, 0x802),
        3,
        4,
        false,
    )
    .unwrap();
    boq.decrement_head(T0).unwrap();

    assert_eq!(
        *boq.read_entry(T0).unwrap(),
        BoqEntry {
            pc: 0x400,
            next_pc: 0x404,
            branch_target_pc: 0x800,
            branch_target_next_pc: 0x802,
            target_micro_pc: 3,
            target_micro_next_pc: 4,
            direction: false,
        }
    );
}

#[test]
fn decrement_walks_back_one_entry_at_a_time() {
    let mut boq = Boq::new();
    for pc in [0x100, 0x200, 0x300] {
        record(&mut boq, T0, pc);
    }

    assert_eq!(boq.read_entry(T0), Err(BoqError::Exhausted(T0)));
    boq.decrement_head(T0).unwrap();
    assert_eq!(boq.read_entry(T0).unwrap().pc, 0x300);
    boq.decrement_head(T0).unwrap();
    assert_eq!(boq.read_entry(T0).unwrap().pc, 0x200);
    boq.decrement_head(T0).unwrap();
    assert_eq!(boq.read_entry(T0).unwrap().pc, 0x100);
    assert_eq!(boq.decrement_head(T0), Err(BoqError::Underflow(T0)));
    assert_eq!(boq.read_entry(T0).unwrap().pc, 0x100);
}

#[test]
fn insert_after_rewind_moves_cursor_past_new_entry() {
    let mut boq = Boq::new();
    record(&mut boq, T0, 0x100);
    record(&mut boq, T0, 0x200);
    boq.decrement_head(T0).unwrap();

    record(&mut boq, T0, 0x300);
    assert_eq!(boq.len(T0), 3);
    assert_eq!(boq.head_index(T0), Some(3));
    assert_eq!(boq.read_entry(T0), Err(BoqError::Exhausted(T0)));

    boq.decrement_head(T0).unwrap();
    assert_eq!(boq.read_entry(T0).unwrap().pc, 0x300);
}

#[test]
fn threads_are_independent() {
    let mut boq = Boq::new();
    record(&mut boq, T0, 0x100);
    record(&mut boq, T0, 0x200);
    record(&mut boq, T1, 0x900);

    boq.decrement_head(T0).unwrap();
    boq.decrement_head(T0).unwrap();
    assert_eq!(boq.read_entry(T0).unwrap().pc, 0x100);
    assert_eq!(boq.read_entry(T1), Err(BoqError::Exhausted(T1)));
    assert_eq!(boq.head_index(T1), Some(1));

    boq.decrement_head(T1).unwrap();
    assert_eq!(boq.read_entry(T1).unwrap().pc, 0x900);
    assert_eq!(boq.decrement_head(T1), Err(BoqError::Underflow(T1)));
    assert!(boq.is_empty(ThreadId::new(2)));
}

#[test]
fn empty_thread_reports_empty() {
    let mut boq = Boq::new();
    record(&mut boq, T1, 0x100);
    assert_eq!(boq.read_entry(T0), Err(BoqError::Empty(T0)));
    assert_eq!(boq.decrement_head(T0), Err(BoqError::Empty(T0)));
    assert_eq!(boq.advance_head(T0), Err(BoqError::Empty(T0)));
    assert_eq!(boq.head_index(T0), None);
}

proptest! {
    /// After k inserts, k decrements land on the first entry and k advances
    /// return to one past the last.
    #[test]
    fn k_rewinds_return_to_first_entry(pcs in prop::collection::vec(any::<u32>(), 1..32)) {
        let mut boq = Boq::new();
        for &pc in &pcs {
            record(&mut boq, T0, u64::from(pc));
        }
        for _ in 0..pcs.len() {
            prop_assert!(boq.decrement_head(T0).is_ok());
        }
        prop_assert_eq!(boq.head_index(T0), Some(0));
        prop_assert_eq!(boq.read_entry(T0).unwrap().pc, u64::from(pcs[0]));
        prop_assert_eq!(boq.decrement_head(T0), Err(BoqError::Underflow(T0)));

        for _ in 0..pcs.len() {
            prop_assert!(boq.advance_head(T0).is_ok());
        }
        prop_assert_eq!(boq.head_index(T0), Some(pcs.len()));
        prop_assert_eq!(boq.advance_head(T0), Err(BoqError::Overflow(T0)));
    }
}
