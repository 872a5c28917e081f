//! Member pruning: whitelist filtering, concurrent removal, and outcomes

pub mod coordinator;
pub mod outcome;
pub mod whitelist;

pub use coordinator::RemovalCoordinator;
pub use outcome::{GroupFailure, PruneReport, RemovalOutcome, RemovalResult};
pub use whitelist::{partition, Partition, Whitelist};
