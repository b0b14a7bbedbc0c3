//! ROB Capacity Unit Tests.
//!
//! Verifies per-thread caps under each SMT policy, cap recomputation when the
//! active-thread set changes, and occupancy accounting.

use o3rob_core::common::{RobError, ThreadId};
use o3rob_core::config::SmtRobPolicy;
use o3rob_core::core::pipeline::rob::CapacityPolicy;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::builder::config::ConfigBuilder;
use crate::common::builder::instruction::InstructionBuilder;
use crate::common::harness::TestContext;

const T0: ThreadId = ThreadId::new(0);
const T1: ThreadId = ThreadId::new(1);

fn tids(ids: &[u8]) -> Vec<ThreadId> {
    ids.iter().copied().map(ThreadId::new).collect()
}

#[rstest]
#[case::dynamic(SmtRobPolicy::Dynamic, 48)]
#[case::partitioned(SmtRobPolicy::Partitioned, 16)]
fn initial_caps_per_policy(#[case] policy: SmtRobPolicy, #[case] expected: usize) {
    let tc = TestContext::new(&ConfigBuilder::new().entries(48).threads(3).policy(policy).build());
    for tid in tids(&[0, 1, 2]) {
        assert_eq!(tc.rob.max_entries(tid), expected, "{tid}");
    }
    assert_eq!(tc.rob.max_entries(ThreadId::new(3)), 0);
}

#[test]
fn threshold_scenario_promotes_lone_thread() {
    let config = ConfigBuilder::new().entries(16).threads(2).threshold(8).build();
    let mut tc = TestContext::new(&config);
    assert_eq!(tc.rob.policy(), CapacityPolicy::Threshold { threshold: 8 });
    assert_eq!(tc.rob.max_entries(T0), 8);
    assert_eq!(tc.rob.max_entries(T1), 8);

    tc.rob.reset_entries(&[T1]);
    assert_eq!(tc.rob.max_entries(T1), 16);

    tc.rob.reset_entries(&[T0, T1]);
    assert_eq!(tc.rob.max_entries(T0), 8);
    assert_eq!(tc.rob.max_entries(T1), 8);
}

#[rstest]
#[case(16, 4, &[0, 1, 2, 3], 4, 0)]
#[case(16, 4, &[0, 2, 3], 5, 1)]
#[case(17, 2, &[1], 17, 0)]
#[case(10, 3, &[0, 1], 5, 0)]
fn partitioned_caps_cover_capacity(
    #[case] entries: usize,
    #[case] threads: usize,
    #[case] active: &[u8],
    #[case] share: usize,
    #[case] unassigned: usize,
) {
    let config = ConfigBuilder::new()
        .entries(entries)
        .threads(threads)
        .policy(SmtRobPolicy::Partitioned)
        .build();
    let mut tc = TestContext::new(&config);
    let active = tids(active);
    tc.rob.reset_entries(&active);

    let mut total = 0;
    for t in 0..threads {
        let tid = ThreadId::new(t as u8);
        let cap = tc.rob.max_entries(tid);
        if active.contains(&tid) {
            assert_eq!(cap, share, "{tid}");
        } else {
            assert_eq!(cap, 0, "{tid}");
        }
        total += cap;
    }
    assert_eq!(tc.rob.unassigned_entries(), unassigned);
    assert_eq!(total + tc.rob.unassigned_entries(), entries);
}

#[test]
fn dynamic_ignores_active_set() {
    let mut tc = TestContext::new(&ConfigBuilder::new().entries(32).threads(2).build());
    tc.rob.reset_entries(&[T1]);
    assert_eq!(tc.rob.max_entries(T0), 32);
    assert_eq!(tc.rob.max_entries(T1), 32);
}

#[test]
fn entry_amount_reports_partition_share() {
    let partitioned = TestContext::new(
        &ConfigBuilder::new()
            .entries(64)
            .threads(2)
            .policy(SmtRobPolicy::Partitioned)
            .build(),
    );
    assert_eq!(partitioned.rob.entry_amount(4), 16);

    let dynamic = TestContext::new(&ConfigBuilder::new().entries(64).build());
    assert_eq!(dynamic.rob.entry_amount(4), 0);
}

#[test]
fn occupancy_counters_agree_across_threads() {
    let mut tc = TestContext::new(&ConfigBuilder::new().entries(8).threads(2).build());
    let _ = tc.dispatch_n(T0, 3);
    let _ = tc.dispatch_n(T1, 2);

    assert_eq!(tc.rob.count_insts_for(T0), 3);
    assert_eq!(tc.rob.count_insts_for(T1), 2);
    assert_eq!(tc.rob.count_insts(), 5);
    assert_eq!(tc.rob.num_insts_in_rob(), 5);
    assert_eq!(tc.rob.num_free_entries(), 3);
    assert!(!tc.rob.is_empty_for(T1));
    assert!(tc.rob.is_empty_for(ThreadId::new(5)));
}

#[test]
fn per_thread_free_entries_saturate_at_cap() {
    let config = ConfigBuilder::new().entries(8).threads(2).threshold(2).build();
    let mut tc = TestContext::new(&config);
    assert_eq!(tc.rob.num_free_entries_for(T0), 2);

    // The driver owns the cap check; the ROB only enforces total capacity.
    let _ = tc.dispatch_n(T0, 3);
    assert_eq!(tc.rob.num_free_entries_for(T0), 0);
    assert_eq!(tc.rob.num_free_entries_for(T1), 2);
}

#[test]
fn full_rob_rejects_any_thread() {
    let mut tc = TestContext::new(&ConfigBuilder::new().entries(3).threads(2).build());
    let _ = tc.dispatch_n(T0, 2);
    let _ = tc.dispatch(T1);
    assert!(tc.rob.is_full());

    let extra = InstructionBuilder::new(100)
        .thread(T1)
        .build();
    assert_eq!(tc.rob.insert(extra), Err(RobError::Full { capacity: 3 }));
}

#[test]
fn unconfigured_thread_is_rejected() {
    let mut tc = TestContext::new(&ConfigBuilder::new().entries(4).threads(2).build());
    let stray = InstructionBuilder::new(1)
        .thread(ThreadId::new(2))
        .build();
    assert_eq!(
        tc.rob.insert(stray),
        Err(RobError::InvalidThread(ThreadId::new(2)))
    );
}
