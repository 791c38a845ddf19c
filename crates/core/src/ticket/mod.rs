//! Ticket space: identifier generation, storage, expiration and selection.

mod error;
mod expire;
mod id;
mod select;
mod sequence;
mod space;

pub use error::TicketError;
pub use expire::{spawn_expiration_task, SweepReport, DEFAULT_TTL, EXPIRE_INTERVAL, MIN_TTL};
pub use id::{TicketId, TICKET_ID_LEN, TICKET_STR_LEN};
pub use select::MAX_SCAN_ENTRIES;
pub use sequence::{SequenceState, Sequencer, SEQUENCE_CEILING};
pub use space::TicketSpace;
