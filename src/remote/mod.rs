//! Remote operator boundary: sender filtering, the inbound queue and the
//! transactional command processor.

pub mod allow_list;
pub mod channels;
pub mod processor;

pub use allow_list::AllowList;
pub use channels::InboundQueue;
pub use processor::{CommandOutcome, CommandProcessor};
