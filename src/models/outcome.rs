use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::error::RelayError;

/// Terminal state of one delivery after it went through the processor.
#[derive(Debug)]
pub enum ProcessingOutcome {
    Forwarded,
    Ignored { event_type: String },
    Failed(RelayError),
}

/// Broker response for a settled delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckDecision {
    Ack,
    Reject { requeue: bool },
}

impl ProcessingOutcome {
    /// Forwarded and filtered messages are removed from the queue. Every
    /// failure is rejected without requeue so the broker dead-letters it.
    pub fn ack_decision(&self) -> AckDecision {
        match self {
            ProcessingOutcome::Forwarded | ProcessingOutcome::Ignored { .. } => AckDecision::Ack,
            ProcessingOutcome::Failed(_) => AckDecision::Reject { requeue: false },
        }
    }
}

impl Display for AckDecision {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AckDecision::Ack => write!(f, "ack"),
            AckDecision::Reject { requeue: true } => write!(f, "reject(requeue)"),
            AckDecision::Reject { requeue: false } => write!(f, "reject"),
        }
    }
}
