//! Choosing the next ticket to process.
//!
//! Selection neither removes nor locks the entry. Concurrent workers may pick
//! the same ticket, so processing must tolerate at-least-once delivery and
//! callers remove the entry once they are done with it.

use std::fs::{self, DirEntry};
use std::path::PathBuf;

use rand::rngs::OsRng;
use rand::RngCore;
use tracing::debug;

use super::{TicketError, TicketSpace};

/// Upper bound on directory entries read per selection.
pub const MAX_SCAN_ENTRIES: usize = 1000;

impl TicketSpace {
    /// Returns the path of a ticket to process next, or `None` when the
    /// directory is empty or unreadable.
    ///
    /// With `random` false this is the first entry in directory enumeration
    /// order, which is not creation order. With `random` true the entry is
    /// drawn uniformly from one bounded listing.
    pub fn next(&self, random: bool) -> Option<PathBuf> {
        self.try_next(random)
            .map_err(|e| debug!(error = %e, "Ticket selection failed"))
            .ok()
            .flatten()
    }

    /// Like [`next`](Self::next) but distinguishes a scan failure from an
    /// empty directory.
    pub fn try_next(&self, random: bool) -> Result<Option<PathBuf>, TicketError> {
        let entries = fs::read_dir(self.path())
            .and_then(|dir| {
                dir.take(MAX_SCAN_ENTRIES)
                    .collect::<Result<Vec<DirEntry>, _>>()
            })
            .map_err(|source| TicketError::Scan {
                path: self.path().to_path_buf(),
                source,
            })?;

        if entries.is_empty() {
            return Ok(None);
        }

        let index = if random {
            (OsRng.next_u64() % entries.len() as u64) as usize
        } else {
            0
        };

        Ok(Some(self.path().join(entries[index].file_name())))
    }
}
