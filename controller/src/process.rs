//! Process-wide state shared by every transaction.

use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info};

/// Kind of process hosting the management model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessType {
    /// A standalone server.
    #[default]
    Server,
    /// A server managed by a host controller.
    ManagedServer,
    /// A host controller. Its runtime is not a server runtime.
    HostController,
}

impl ProcessType {
    /// Returns true when the process runs server workloads and can therefore
    /// be put into a reload-required state.
    pub fn is_server(&self) -> bool {
        matches!(self, ProcessType::Server | ProcessType::ManagedServer)
    }
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessType::Server => "server",
            ProcessType::ManagedServer => "managed-server",
            ProcessType::HostController => "host-controller",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Default)]
struct ReloadFlag {
    /// Raised by a committed transaction. Only a completed reload clears it.
    committed: bool,
    /// Ids of in-flight transactions that raised the flag.
    raisers: BTreeSet<u64>,
}

impl ReloadFlag {
    fn is_set(&self) -> bool {
        self.committed || !self.raisers.is_empty()
    }
}

/// Process state: its type and the reload-required flag.
#[derive(Debug, Default)]
pub struct ProcessState {
    process_type: ProcessType,
    reload: Mutex<ReloadFlag>,
}

impl ProcessState {
    pub fn new(process_type: ProcessType) -> Self {
        Self {
            process_type,
            reload: Mutex::new(ReloadFlag::default()),
        }
    }

    pub fn process_type(&self) -> ProcessType {
        self.process_type
    }

    pub fn is_reload_required(&self) -> bool {
        self.reload.lock().is_set()
    }

    /// Raise the flag on behalf of transaction `txn`.
    pub fn require_reload(&self, txn: u64) {
        let mut flag = self.reload.lock();
        let was_set = flag.is_set();
        flag.raisers.insert(txn);
        if !was_set {
            info!(txn, "process requires reload");
        }
    }

    /// Withdraw the raise of transaction `txn`. The flag stays set while a
    /// committed or another in-flight raise remains. Returns true if `txn`
    /// had raised it.
    pub fn revert_reload(&self, txn: u64) -> bool {
        let mut flag = self.reload.lock();
        let removed = flag.raisers.remove(&txn);
        if removed && !flag.is_set() {
            debug!(txn, "reload requirement reverted");
        }
        removed
    }

    /// Make the raise of transaction `txn` permanent.
    pub fn commit_reload(&self, txn: u64) {
        let mut flag = self.reload.lock();
        if flag.raisers.remove(&txn) {
            flag.committed = true;
        }
    }

    /// Clear the committed flag, as a completed reload would. Raises of
    /// transactions still in flight are kept.
    pub fn reload_completed(&self) {
        self.reload.lock().committed = false;
    }
}

/// One transaction's raise of the reload flag.
#[derive(Debug)]
pub(crate) struct ReloadTracker {
    txn: u64,
    raised: bool,
}

impl ReloadTracker {
    pub(crate) fn new(txn: u64) -> Self {
        Self { txn, raised: false }
    }

    pub(crate) fn raise(&mut self, process: &ProcessState) {
        process.require_reload(self.txn);
        self.raised = true;
    }

    /// Undo this transaction's raise. Idempotent.
    pub(crate) fn revert(&mut self, process: &ProcessState) {
        if std::mem::take(&mut self.raised) {
            process.revert_reload(self.txn);
        }
    }

    /// Keep this transaction's raise after it commits.
    pub(crate) fn commit(&mut self, process: &ProcessState) {
        if std::mem::take(&mut self.raised) {
            process.commit_reload(self.txn);
        }
    }

    #[cfg(test)]
    pub(crate) fn raised(&self) -> bool {
        self.raised
    }
}
