//! In-memory sink.

use super::{PrefixFn, Sink, TileOutput};
use crate::error::MeshError;

/// Keeps the whole body in a `Vec<u8>`.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    body: Vec<u8>,
    records: u64,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sink for MemorySink {
    fn write_raw(&mut self, bytes: &[u8]) -> Result<(), MeshError> {
        self.body.extend_from_slice(bytes);
        Ok(())
    }

    fn write_record(&mut self, record: &[u8]) -> Result<(), MeshError> {
        self.body.extend_from_slice(record);
        self.records += 1;
        Ok(())
    }

    fn records(&self) -> u64 {
        self.records
    }

    fn bytes_pending(&self) -> usize {
        self.body.len()
    }

    fn finish(self, prefix: Option<PrefixFn<'_>>, suffix: &[u8]) -> Result<TileOutput, MeshError> {
        if self.records == 0 {
            return Ok(TileOutput::Empty);
        }
        let mut out = Vec::new();
        if let Some(prefix) = prefix {
            prefix(&mut out)?;
        }
        out.reserve(self.body.len() + suffix.len());
        out.extend_from_slice(&self.body);
        out.extend_from_slice(suffix);
        Ok(TileOutput::Buffer(out))
    }

    fn discard(self) {}
}
