//! Rolling file target for one channel.
//!
//! Channels must never wait on disk, so each target is implemented as:
//! - a bounded queue (the sink's only buffering; producers block when it is full)
//! - a dedicated thread with buffered appends and periodic flush
//!
//! The active file is archived to `<name>.<yyyyMMdd>.<seq>.log` when the UTC day
//! changes or when it reaches the configured size. If the active file is
//! removed from outside, the writer notices on its next flush and starts a
//! new one.

use super::LogRecord;
use crate::constants::{
    ARCHIVE_DATE_FORMAT, DEFAULT_FLUSH_INTERVAL_MS, LOG_FILE_EXTENSION, MIN_FILE_BYTES,
    WRITER_ACK_TIMEOUT_SECS,
};
use crate::error::{LogError, Result};
use crate::retry::RetryPolicy;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::{Mutex, RwLock};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{sync_channel, Receiver, RecvTimeoutError, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct TargetConfig {
    pub path: PathBuf,
    /// Archive when the UTC day changes
    pub daily: bool,
    /// Archive when the active file reaches this size (0 = unbounded)
    pub max_bytes: u64,
    /// Archives kept per channel (0 = keep all)
    pub max_archives: usize,
    pub flush_interval: Duration,
    pub queue_capacity: usize,
}

enum Command {
    Record(LogRecord),
    Flush(SyncSender<()>),
    /// Close the handle and delete the active file in one step
    Delete(RetryPolicy, SyncSender<Result<bool>>),
}

/// Durable destination of one registered channel
///
/// Owned by the registry; channels hold an `Arc` to it. Once closed it
/// drops every submitted record.
pub struct FileTarget {
    name: String,
    path: PathBuf,
    tx: RwLock<Option<SyncSender<Command>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl FileTarget {
    /// Start the writer thread for a target
    ///
    /// The file itself is opened on the first record.
    pub fn spawn(name: &str, cfg: TargetConfig) -> Result<Arc<Self>> {
        let (tx, rx) = sync_channel::<Command>(cfg.queue_capacity.max(1));
        let path = cfg.path.clone();
        let flush_interval = if cfg.flush_interval.is_zero() {
            Duration::from_millis(DEFAULT_FLUSH_INTERVAL_MS)
        } else {
            cfg.flush_interval
        };
        let file = RollingFile::new(cfg);
        let thread_name = name.to_string();

        let handle = thread::Builder::new()
            .name(format!("observer-log-{}", name))
            .spawn(move || run_writer(&thread_name, rx, file, flush_interval))
            .map_err(|e| LogError::Spawn {
                channel: name.to_string(),
                source: e,
            })?;

        Ok(Arc::new(Self {
            name: name.to_string(),
            path,
            tx: RwLock::new(Some(tx)),
            worker: Mutex::new(Some(handle)),
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.tx.read().is_none()
    }

    /// Queue a record; returns false when the target is closed
    pub fn submit(&self, record: LogRecord) -> bool {
        match self.tx.read().as_ref() {
            Some(tx) => tx.send(Command::Record(record)).is_ok(),
            None => false,
        }
    }

    /// Write out everything queued so far and wait for the writer to confirm
    pub fn flush(&self) -> bool {
        self.request(Command::Flush)
    }

    /// Delete the active file
    ///
    /// Runs on the writer thread, so no queued record can recreate the file
    /// between closing the handle and removing it. The next record starts a
    /// new file.
    pub fn delete_file(&self, retry: &RetryPolicy) -> Result<bool> {
        let tx = match self.tx.read().as_ref() {
            Some(tx) => tx.clone(),
            // Closed: nothing holds the file any more.
            None => return retry.delete_file(&self.path),
        };
        let (ack_tx, ack_rx) = sync_channel::<Result<bool>>(1);
        if tx.send(Command::Delete(retry.clone(), ack_tx)).is_err() {
            return retry.delete_file(&self.path);
        }
        drop(tx);
        match ack_rx.recv() {
            Ok(result) => result,
            Err(_) => retry.delete_file(&self.path),
        }
    }

    /// Drain the queue, stop the writer thread and reject further records
    ///
    /// Idempotent.
    pub fn close(&self) {
        // Dropping the only sender lets the writer drain and exit.
        let tx = self.tx.write().take();
        if tx.is_none() {
            return;
        }
        drop(tx);

        if let Some(handle) = self.worker.lock().take() {
            if handle.join().is_err() {
                warn!(channel = %self.name, "log writer thread panicked");
            }
        }
    }

    fn request(&self, make: fn(SyncSender<()>) -> Command) -> bool {
        let tx = match self.tx.read().as_ref() {
            Some(tx) => tx.clone(),
            None => return false,
        };
        let (ack_tx, ack_rx) = sync_channel::<()>(1);
        if tx.send(make(ack_tx)).is_err() {
            return false;
        }
        drop(tx);
        ack_rx
            .recv_timeout(Duration::from_secs(WRITER_ACK_TIMEOUT_SECS))
            .is_ok()
    }
}

impl Drop for FileTarget {
    fn drop(&mut self) {
        self.close();
    }
}

fn run_writer(
    name: &str,
    rx: Receiver<Command>,
    mut file: RollingFile,
    flush_interval: Duration,
) {
    let mut dirty = false;
    let mut failing = false;
    let mut last_flush = Instant::now();

    loop {
        match rx.recv_timeout(flush_interval) {
            Ok(Command::Record(record)) => {
                match file.append(&record) {
                    Ok(()) => {
                        dirty = true;
                        failing = false;
                    }
                    Err(e) => {
                        // Warn once per outage, not once per record.
                        if !failing {
                            warn!(channel = %name, error = %e, "dropping log records");
                            failing = true;
                        }
                    }
                }

                if dirty && last_flush.elapsed() >= flush_interval {
                    let _ = file.flush();
                    dirty = false;
                    last_flush = Instant::now();
                }
            }
            Ok(Command::Flush(ack)) => {
                if let Err(e) = file.flush() {
                    warn!(channel = %name, error = %e, "log flush failed");
                }
                dirty = false;
                last_flush = Instant::now();
                let _ = ack.send(());
            }
            Ok(Command::Delete(retry, ack)) => {
                file.release();
                dirty = false;
                let _ = ack.send(retry.delete_file(&file.cfg.path));
            }
            Err(RecvTimeoutError::Timeout) => {
                if dirty {
                    let _ = file.flush();
                    dirty = false;
                    last_flush = Instant::now();
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                let _ = file.flush();
                break;
            }
        }
    }

    debug!(channel = %name, "log writer stopped");
}

// =============================================================================
// Active file + archives
// =============================================================================

struct RollingFile {
    cfg: TargetConfig,
    writer: Option<BufWriter<File>>,
    size: u64,
    /// UTC day of the content in the active file (None while empty)
    day: Option<NaiveDate>,
}

impl RollingFile {
    fn new(mut cfg: TargetConfig) -> Self {
        if cfg.max_bytes > 0 && cfg.max_bytes < MIN_FILE_BYTES {
            cfg.max_bytes = MIN_FILE_BYTES;
        }
        Self {
            cfg,
            writer: None,
            size: 0,
            day: None,
        }
    }

    fn append(&mut self, record: &LogRecord) -> io::Result<()> {
        if self.writer.is_none() {
            self.open()?;
        }
        self.roll_if_needed(record.day());

        if self.writer.is_none() {
            self.open()?;
        }

        let line = record.format_line();
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| io::Error::other("log file not open"))?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;

        self.size = self.size.saturating_add(line.len() as u64 + 1);
        self.day.get_or_insert(record.day());
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.reopen_if_removed()?;
        match self.writer.as_mut() {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }

    /// Move buffered lines to a fresh file when the active one was unlinked
    fn reopen_if_removed(&mut self) -> io::Result<()> {
        if self.writer.is_none() || self.cfg.path.exists() {
            return Ok(());
        }
        let pending = match self.writer.take().map(BufWriter::into_parts) {
            Some((_, Ok(buf))) => buf,
            _ => Vec::new(),
        };
        debug!(path = %self.cfg.path.display(), "log file removed, reopening");

        self.open()?;
        if let Some(writer) = self.writer.as_mut() {
            writer.write_all(&pending)?;
            self.size = self.size.saturating_add(pending.len() as u64);
        }
        Ok(())
    }

    fn release(&mut self) {
        let _ = self.flush();
        self.writer = None;
    }

    fn open(&mut self) -> io::Result<()> {
        if let Some(parent) = self.cfg.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.cfg.path)?;
        let meta = file.metadata()?;
        self.size = meta.len();
        self.day = if self.size > 0 {
            meta.modified()
                .ok()
                .map(|t| DateTime::<Utc>::from(t).date_naive())
        } else {
            None
        };
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }

    fn roll_if_needed(&mut self, day: NaiveDate) {
        // Records may arrive slightly out of order around midnight.
        let day_changed = self.cfg.daily && self.day.is_some_and(|d| d < day);
        let too_big = self.cfg.max_bytes > 0 && self.size >= self.cfg.max_bytes;
        if !(day_changed || too_big) {
            return;
        }

        if let Err(e) = self.archive(day) {
            warn!(path = %self.cfg.path.display(), error = %e, "log archive failed");
            // Keep appending to the active file; retry on the next day change
            // or after another `max_bytes` of lines.
            self.day = Some(day);
            self.size = 0;
        }
    }

    fn archive(&mut self, today: NaiveDate) -> io::Result<()> {
        self.release();

        let day = self.day.unwrap_or(today);
        let archive = next_archive_path(&self.cfg.path, day);
        let result = fs::rename(&self.cfg.path, &archive);
        self.open()?;
        result?;

        debug!(archive = %archive.display(), "log file archived");
        if self.cfg.max_archives > 0 {
            prune_archives(&self.cfg.path, self.cfg.max_archives)?;
        }
        Ok(())
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "observer".to_string())
}

/// First free `<stem>.<yyyyMMdd>.<seq>.log` next to the active file
fn next_archive_path(path: &Path, day: NaiveDate) -> PathBuf {
    let stem = file_stem(path);
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let date = day.format(ARCHIVE_DATE_FORMAT).to_string();

    let mut seq = 0u32;
    loop {
        let candidate = dir.join(format!("{}.{}.{}.{}", stem, date, seq, LOG_FILE_EXTENSION));
        if !candidate.exists() {
            return candidate;
        }
        seq += 1;
    }
}

/// Parse `<stem>.<yyyyMMdd>.<seq>.log` into a sortable key
fn archive_key(stem: &str, file_name: &str) -> Option<(u32, u32)> {
    let rest = file_name.strip_prefix(stem)?.strip_prefix('.')?;
    let rest = rest.strip_suffix(LOG_FILE_EXTENSION)?.strip_suffix('.')?;
    let (date, seq) = rest.split_once('.')?;
    if date.len() != 8 {
        return None;
    }
    Some((date.parse().ok()?, seq.parse().ok()?))
}

/// Remove the oldest archives beyond `keep`
fn prune_archives(path: &Path, keep: usize) -> io::Result<()> {
    let stem = file_stem(path);
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut archives: Vec<((u32, u32), PathBuf)> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().to_string();
            archive_key(&stem, &name).map(|key| (key, e.path()))
        })
        .collect();

    if archives.len() <= keep {
        return Ok(());
    }
    archives.sort_by_key(|(key, _)| *key);
    let excess = archives.len() - keep;
    for (_, old) in archives.into_iter().take(excess) {
        let _ = fs::remove_file(old);
    }
    Ok(())
}
