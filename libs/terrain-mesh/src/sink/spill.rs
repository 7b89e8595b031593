//! Chunked spill-file sink.
//!
//! Records are buffered and flushed to the spill file every `chunk`
//! records, so peak memory is bounded by the chunk size rather than the
//! mesh size.
//!
//! When a prefix is needed at the end, the file written so far is renamed
//! to `<path>.body`, the prefix is written into a fresh `<path>`, the body
//! is copied behind it and `<path>.body` is removed.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use config::constants::SPILL_BODY_SUFFIX;

use super::{PrefixFn, Sink, TileOutput};
use crate::error::MeshError;

/// Sink backed by a file on disk.
#[derive(Debug)]
pub struct SpillSink {
    path: PathBuf,
    file: File,
    buffer: Vec<u8>,
    chunk: usize,
    pending: usize,
    records: u64,
    flushes: u64,
}

impl SpillSink {
    /// Creates (truncates) the spill file.
    pub fn create(path: impl Into<PathBuf>, chunk: usize) -> Result<Self, MeshError> {
        let path = path.into();
        if chunk == 0 {
            return Err(MeshError::config("spill chunk size must be positive"));
        }
        let file = File::create(&path)?;
        debug!(path = %path.display(), chunk, "Created spill file");
        Ok(Self {
            path,
            file,
            buffer: Vec::new(),
            chunk,
            pending: 0,
            records: 0,
            flushes: 0,
        })
    }

    /// Path of the spill file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush_chunk(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        self.file.write_all(&self.buffer)?;
        self.flushes += 1;
        trace!(bytes = self.buffer.len(), records = self.records, "Flushed spill chunk");
        self.buffer.clear();
        self.pending = 0;
        Ok(())
    }

    fn body_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".");
        name.push(SPILL_BODY_SUFFIX);
        PathBuf::from(name)
    }

    fn complete(mut self, prefix: Option<PrefixFn<'_>>, suffix: &[u8]) -> io::Result<PathBuf> {
        self.flush_chunk()?;
        let body = self.body_path();
        let SpillSink {
            path,
            mut file,
            records,
            flushes,
            ..
        } = self;
        match prefix {
            None => {
                file.write_all(suffix)?;
                file.flush()?;
            }
            Some(prefix) => {
                file.flush()?;
                drop(file);
                fs::rename(&path, &body)?;
                let mut out = BufWriter::new(File::create(&path)?);
                prefix(&mut out)?;
                io::copy(&mut File::open(&body)?, &mut out)?;
                out.write_all(suffix)?;
                out.flush()?;
                fs::remove_file(&body)?;
            }
        }
        debug!(path = %path.display(), records, flushes, "Finished spill file");
        Ok(path)
    }
}

impl Sink for SpillSink {
    fn write_raw(&mut self, bytes: &[u8]) -> Result<(), MeshError> {
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    fn write_record(&mut self, record: &[u8]) -> Result<(), MeshError> {
        self.buffer.extend_from_slice(record);
        self.records += 1;
        self.pending += 1;
        if self.pending >= self.chunk {
            self.flush_chunk()?;
        }
        Ok(())
    }

    fn records(&self) -> u64 {
        self.records
    }

    fn bytes_pending(&self) -> usize {
        self.buffer.len()
    }

    fn finish(self, prefix: Option<PrefixFn<'_>>, suffix: &[u8]) -> Result<TileOutput, MeshError> {
        if self.records == 0 {
            self.discard();
            return Ok(TileOutput::Empty);
        }
        let path = self.path.clone();
        let body = self.body_path();
        match self.complete(prefix, suffix) {
            Ok(path) => Ok(TileOutput::File(path)),
            Err(e) => {
                remove_quietly(&body);
                remove_quietly(&path);
                Err(e.into())
            }
        }
    }

    fn discard(self) {
        let SpillSink { path, file, .. } = self;
        drop(file);
        remove_quietly(&path);
    }
}

fn remove_quietly(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Could not remove spill file"),
    }
}
