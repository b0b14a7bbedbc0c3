use std::collections::HashSet;

use o3rob_core::Rob;
use o3rob_core::common::{PcState, RobError, SeqNum, ThreadId};
use o3rob_core::config::Config;
use o3rob_core::core::pipeline::{DynInst, DynInstPtr, Instruction, RobDriver, SquashStep};
use tracing_subscriber::EnvFilter;

use super::builder::instruction::{BASE_PC, INST_SIZE, InstructionBuilder};

/// Installs a test-friendly tracing subscriber once per process.
///
/// Set `RUST_LOG=o3rob_core=trace` to see ROB activity in failing tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Driver that records every retired instruction.
#[derive(Debug, Default)]
pub struct RecordingDriver {
    /// Sequence numbers handed back by `retire_head`, in order.
    pub retired: Vec<SeqNum>,
    /// Threads reported as exiting.
    pub exiting: HashSet<ThreadId>,
}

impl RobDriver<Instruction> for RecordingDriver {
    fn remove_front_inst(&mut self, inst: DynInstPtr<Instruction>) {
        self.retired.push(inst.seq_num());
    }

    fn is_thread_exiting(&self, tid: ThreadId) -> bool {
        self.exiting.contains(&tid)
    }
}

/// A ROB plus everything a test needs to drive it.
///
/// Sequence numbers come from one counter shared by all threads, the way a
/// CPU hands them out at fetch.
#[derive(Debug)]
pub struct TestContext {
    /// ROB under test.
    pub rob: Rob<Instruction>,
    /// Driver passed to retire and squash.
    pub driver: RecordingDriver,
    /// Every configured thread.
    pub active: Vec<ThreadId>,
    next_seq: u64,
}

impl TestContext {
    /// Builds the ROB; panics on an invalid configuration.
    pub fn new(config: &Config) -> Self {
        init_tracing();
        let rob = Rob::new(config).expect("test configuration must be valid");
        let active = (0..config.general.num_threads)
            .map(|t| ThreadId::new(t as u8))
            .collect();
        Self {
            rob,
            driver: RecordingDriver::default(),
            active,
            next_seq: 1,
        }
    }

    fn next_builder(&mut self, tid: ThreadId) -> InstructionBuilder {
        let seq = self.next_seq;
        self.next_seq += 1;
        InstructionBuilder::new(seq).thread(tid)
    }

    /// Dispatches a non-control instruction into the ROB.
    pub fn dispatch(&mut self, tid: ThreadId) -> DynInstPtr<Instruction> {
        let inst = self.next_builder(tid).build();
        self.rob
            .insert(inst.clone())
            .expect("dispatch into a ROB with free entries");
        inst
    }

    /// Dispatches a control instruction into the ROB.
    pub fn dispatch_branch(&mut self, tid: ThreadId) -> DynInstPtr<Instruction> {
        let inst = self.next_builder(tid).branch_to(BASE_PC).build();
        self.rob
            .insert(inst.clone())
            .expect("dispatch into a ROB with free entries");
        inst
    }

    /// Dispatches `n` instructions for `tid`.
    pub fn dispatch_n(&mut self, tid: ThreadId, n: usize) -> Vec<DynInstPtr<Instruction>> {
        (0..n).map(|_| self.dispatch(tid)).collect()
    }

    /// Records a branch outcome in the BOQ, as fetch would.
    pub fn record_outcome(&mut self, tid: ThreadId, pc: u64, taken: bool) {
        let target = if taken { pc + 0x100 } else { pc + INST_SIZE };
        self.rob
            .boq_mut()
            .expect("branch hints enabled")
            .insert_branch_outcome(
                tid,
                &PcState::sequential(pc, INST_SIZE),
                &PcState::sequential(target, INST_SIZE),
                0,
                0,
                taken,
            )
            .expect("valid BOQ thread");
    }

    /// Starts a squash through the recording driver.
    pub fn squash(&mut self, sn: u64, tid: ThreadId) -> Result<SquashStep, RobError> {
        self.rob.squash(SeqNum::new(sn), tid, &self.driver)
    }

    /// Runs one squash step through the recording driver.
    pub fn do_squash(&mut self, tid: ThreadId) -> Result<SquashStep, RobError> {
        self.rob.do_squash(tid, &self.driver)
    }

    /// Squashes to completion; returns the number of calls it took.
    pub fn squash_to_done(&mut self, sn: u64, tid: ThreadId) -> usize {
        let mut calls = 1;
        let mut step = self.squash(sn, tid).expect("squash starts");
        while step == SquashStep::Continue {
            step = self.do_squash(tid).expect("squash step");
            calls += 1;
        }
        calls
    }

    /// Retires the head of `tid` through the recording driver.
    pub fn retire(&mut self, tid: ThreadId) -> Result<DynInstPtr<Instruction>, RobError> {
        self.rob.retire_head(tid, &mut self.driver)
    }

    /// Sequence numbers of `tid`'s instructions, oldest first.
    pub fn seqs(&self, tid: ThreadId) -> Vec<u64> {
        self.rob.thread_insts(tid).map(|i| i.seq_num().val()).collect()
    }
}
