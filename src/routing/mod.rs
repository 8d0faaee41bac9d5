//! Record routing
//!
//! Valid messages are either visitor ratings or assistance requests. The
//! router turns a flushed batch into one ordered sequence per kind, ready
//! for the two destination tables.

mod records;
mod router;

pub use records::{AssistanceRequestRecord, ExhibitionId, VoteRecord};
pub use router::{classify_and_split, RoutedBatch};
