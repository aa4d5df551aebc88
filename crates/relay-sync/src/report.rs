//! Sync pass reporting types.
//!
//! Every completed pass produces a [`PassReport`] describing what happened to
//! the queue, for logging and for the orchestrator's event stream.

use relay_core::Domain;

/// Why a pass ended the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// The queue was empty; nothing to do.
    EmptyQueue,

    /// Connectivity was not positively Connected when the pass started.
    Offline,

    /// Every queued record was accepted by the remote.
    Drained,

    /// At least one record exhausted its attempts and was retained.
    PartiallyDrained,

    /// The queue payload could not be decoded; the pass cleared it and
    /// moved on rather than wedging the domain.
    CorruptReset,
}

/// Summary of one sync pass over one domain queue.
#[derive(Debug, Clone)]
pub struct PassReport {
    pub domain: Domain,
    pub outcome: PassOutcome,

    /// Records accepted by the remote during this pass.
    pub synced: usize,

    /// Records that exhausted their attempts and were written back.
    pub retained: usize,

    /// Total gateway calls made, counting retries.
    pub gateway_calls: usize,
}

impl PassReport {
    pub(crate) fn skipped(domain: Domain, outcome: PassOutcome) -> Self {
        PassReport {
            domain,
            outcome,
            synced: 0,
            retained: 0,
            gateway_calls: 0,
        }
    }
}
