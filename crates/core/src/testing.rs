//! Test helpers shared by unit and integration tests.

use std::fs::File;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};

use crate::ticket::TicketId;

/// Sets the modification time of `path` to `age` before now.
///
/// Works for files and directories.
pub fn backdate(path: &Path, age: Duration) -> io::Result<()> {
    let modified = SystemTime::now()
        .checked_sub(age)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "age before epoch"))?;
    File::open(path)?.set_modified(modified)
}

/// Decodes the sequence field of a canonical ticket string.
pub fn decode_sequence(ticket: &str) -> Option<u32> {
    ticket.parse::<TicketId>().ok().map(|id| id.sequence())
}
