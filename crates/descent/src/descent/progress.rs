//! Progress reporting.

use tracing::{debug, trace};

/// Event emitted by `DescentSystem::compute`. Not a stable format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressEvent {
    LevelStarted {
        dim: usize,
        nr_faces: usize,
    },
    BlockDone {
        dim: usize,
        block: usize,
        nr_faces: usize,
        nr_children: usize,
    },
    IsoReduced {
        dim: usize,
        live_before: usize,
        merged: usize,
        oracle_calls: usize,
    },
    Finished {
        descent_steps: u64,
        nr_simplicial: u64,
    },
}

/// Receiver of progress events; called from the orchestrating thread only.
pub trait ProgressSink: Send + Sync {
    fn report(&self, event: &ProgressEvent);
}

/// Default sink: forwards to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&self, event: &ProgressEvent) {
        match *event {
            ProgressEvent::LevelStarted { dim, nr_faces } => {
                debug!(dim, nr_faces, "descent level");
            }
            ProgressEvent::BlockDone {
                dim,
                block,
                nr_faces,
                nr_children,
            } => {
                trace!(dim, block, nr_faces, nr_children, "block done");
            }
            ProgressEvent::IsoReduced {
                dim,
                live_before,
                merged,
                oracle_calls,
            } => {
                debug!(dim, live_before, merged, oracle_calls, "isomorphism reduction");
            }
            ProgressEvent::Finished {
                descent_steps,
                nr_simplicial,
            } => {
                debug!(descent_steps, nr_simplicial, "descent finished");
            }
        }
    }
}
