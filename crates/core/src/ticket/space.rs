//! Ticket space: a directory of ticketed entries plus its sequence and TTL state.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use crate::config::SpaceConfig;
use crate::metrics;

use super::{SequenceState, Sequencer, TicketError, TicketId};

/// A directory holding one file per ticket.
///
/// Identifier generation and the storage operations take `&self` and may be
/// called from any number of threads. The fast-path methods (`writer`,
/// `save`, `load`, `remove`, ...) report failure as `false`/`None`; each has
/// a `try_` variant returning the underlying [`TicketError`].
#[derive(Debug)]
pub struct TicketSpace {
    path: PathBuf,
    /// Zero means unset; resolved lazily on the first sweep.
    pub(super) ttl: RwLock<Duration>,
    sequencer: Sequencer,
}

impl TicketSpace {
    /// Binds a ticket space to `path`, creating the directory if needed.
    ///
    /// Never fails. If the directory cannot be created the failure is logged
    /// and later operations on the space fail instead.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let space = Self::unchecked(path.into());
        if let Err(e) = space.ensure_dir() {
            warn!(path = %space.path.display(), error = %e, "Ticket space is unusable");
        }
        space
    }

    /// Like [`new`](Self::new) but returns the directory creation failure.
    pub fn try_new(path: impl Into<PathBuf>) -> Result<Self, TicketError> {
        let space = Self::unchecked(path.into());
        space.ensure_dir()?;
        Ok(space)
    }

    /// Builds a space from configuration, applying the TTL and sequencing switch.
    pub fn from_config(config: &SpaceConfig) -> Self {
        let space = Self::new(&config.path);
        if let Some(ttl) = config.ttl() {
            space.set_ttl(ttl);
        }
        if config.sequencing {
            space.enable_sequencing();
        }
        space
    }

    fn unchecked(path: PathBuf) -> Self {
        Self {
            path,
            ttl: RwLock::new(Duration::ZERO),
            sequencer: Sequencer::new(),
        }
    }

    pub(super) fn ensure_dir(&self) -> Result<(), TicketError> {
        fs::create_dir_all(&self.path).map_err(|source| TicketError::Setup {
            path: self.path.clone(),
            source,
        })
    }

    /// The directory backing this space.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Switches identifier generation to the sequential layout.
    ///
    /// Only the first call has an effect.
    pub fn enable_sequencing(&self) -> &Self {
        if self.sequencer.enable() {
            debug!(path = %self.path.display(), "Sequencing enabled");
        }
        self
    }

    pub fn is_sequencing(&self) -> bool {
        self.sequencer.is_enabled()
    }

    pub fn sequence_state(&self) -> SequenceState {
        self.sequencer.state()
    }

    /// Generates a new ticket identifier in canonical string form.
    ///
    /// Safe to call concurrently. Collisions are not checked here.
    pub fn generate(&self) -> String {
        self.generate_id().to_string()
    }

    /// Generates a new ticket identifier.
    pub fn generate_id(&self) -> TicketId {
        match self.sequencer.next_value() {
            Some(sequence) => {
                metrics::TICKETS_GENERATED
                    .with_label_values(&["sequential"])
                    .inc();
                TicketId::sequential(sequence, unix_now())
            }
            None => {
                metrics::TICKETS_GENERATED
                    .with_label_values(&["random"])
                    .inc();
                TicketId::random()
            }
        }
    }

    /// Resolves a ticket to its file path, keeping only the base name so the
    /// result always lies directly inside the space directory.
    pub fn ticket_path(&self, ticket: &str) -> Result<PathBuf, TicketError> {
        let name = Path::new(ticket)
            .file_name()
            .ok_or_else(|| TicketError::InvalidTicket(ticket.to_string()))?;
        Ok(self.path.join(name))
    }

    /// Creates (or truncates) the ticketed file for writing.
    pub fn writer(&self, ticket: &str) -> Option<File> {
        self.try_writer(ticket)
            .map_err(|e| debug!(ticket, error = %e, "Ticket writer unavailable"))
            .ok()
    }

    pub fn try_writer(&self, ticket: &str) -> Result<File, TicketError> {
        let path = self.ticket_path(ticket)?;
        File::create(&path).map_err(|source| TicketError::Create { path, source })
    }

    /// Opens the ticketed file for reading.
    pub fn reader(&self, ticket: &str) -> Option<File> {
        self.try_reader(ticket)
            .map_err(|e| debug!(ticket, error = %e, "Ticket reader unavailable"))
            .ok()
    }

    pub fn try_reader(&self, ticket: &str) -> Result<File, TicketError> {
        let path = self.ticket_path(ticket)?;
        File::open(&path).map_err(|source| TicketError::Open { path, source })
    }

    /// Stores the bytes of `reader` under `ticket`, generating a ticket when
    /// none is given.
    ///
    /// The ticket is returned even on failure so the caller can retry.
    pub fn save<R: Read>(&self, ticket: Option<&str>, reader: R) -> (String, bool) {
        let ticket = match ticket {
            Some(t) => t.to_string(),
            None => self.generate(),
        };

        let ok = match self.try_save(&ticket, reader) {
            Ok(_) => true,
            Err(e) => {
                debug!(ticket = %ticket, error = %e, "Save failed");
                false
            }
        };

        (ticket, ok)
    }

    /// Stores the bytes of `reader` under `ticket`, returning the byte count.
    pub fn try_save<R: Read>(&self, ticket: &str, mut reader: R) -> Result<u64, TicketError> {
        let result = self.ticket_path(ticket).and_then(|path| {
            let mut file = File::create(&path).map_err(|source| TicketError::Create {
                path: path.clone(),
                source,
            })?;
            io::copy(&mut reader, &mut file)
                .and_then(|n| file.flush().map(|_| n))
                .map_err(|source| TicketError::Copy { path, source })
        });
        record_storage("save", result.is_ok());
        result
    }

    /// Copies the ticketed file into `writer`.
    pub fn load<W: Write>(&self, ticket: &str, writer: W) -> bool {
        match self.try_load(ticket, writer) {
            Ok(_) => true,
            Err(e) => {
                debug!(ticket, error = %e, "Load failed");
                false
            }
        }
    }

    /// Copies the ticketed file into `writer`, returning the byte count.
    pub fn try_load<W: Write>(&self, ticket: &str, mut writer: W) -> Result<u64, TicketError> {
        let result = self.ticket_path(ticket).and_then(|path| {
            let mut file = File::open(&path).map_err(|source| TicketError::Open {
                path: path.clone(),
                source,
            })?;
            io::copy(&mut file, &mut writer).map_err(|source| TicketError::Copy { path, source })
        });
        record_storage("load", result.is_ok());
        result
    }

    /// Deletes the ticketed file.
    pub fn remove(&self, ticket: &str) -> bool {
        match self.try_remove(ticket) {
            Ok(()) => true,
            Err(e) => {
                debug!(ticket, error = %e, "Remove failed");
                false
            }
        }
    }

    pub fn try_remove(&self, ticket: &str) -> Result<(), TicketError> {
        let result = self.ticket_path(ticket).and_then(|path| {
            fs::remove_file(&path).map_err(|source| TicketError::Remove { path, source })
        });
        record_storage("remove", result.is_ok());
        result
    }
}

fn record_storage(op: &str, ok: bool) {
    let result = if ok { "ok" } else { "error" };
    metrics::STORAGE_OPERATIONS
        .with_label_values(&[op, result])
        .inc();
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
