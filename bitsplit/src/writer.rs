use std::fs;
use std::path::{Path, PathBuf};

use bitstream_feeder::{Chunk, ChunkSink, ConsumeError};

/**
    Sink that numbers incoming chunks and optionally writes each one to
    its own file in an output directory.
*/
#[derive(Debug)]
pub struct ChunkWriter {
    dir: Option<PathBuf>,
    written: u64,
    bytes: u64,
    largest: usize,
}

impl ChunkWriter {
    pub fn new(dir: Option<PathBuf>) -> std::io::Result<Self> {
        if let Some(dir) = &dir {
            fs::create_dir_all(dir)?;
        }
        Ok(Self {
            dir,
            written: 0,
            bytes: 0,
            largest: 0,
        })
    }

    pub fn chunks(&self) -> u64 {
        self.written
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn largest(&self) -> usize {
        self.largest
    }
}

/**
    File name for chunk number `index` inside `dir`.
*/
pub fn chunk_path(dir: &Path, index: u64) -> PathBuf {
    dir.join(format!("chunk_{index:05}.bin"))
}

impl ChunkSink for ChunkWriter {
    fn consume(&mut self, chunk: Chunk<'_>) -> Result<(), ConsumeError> {
        if let Some(dir) = &self.dir {
            let path = chunk_path(dir, self.written);
            fs::write(&path, chunk.data()).map_err(|e| {
                ConsumeError::with_source(format!("failed to write {}", path.display()), e)
            })?;
            tracing::trace!(path = %path.display(), len = chunk.len(), "wrote chunk");
        }

        self.written += 1;
        self.bytes += chunk.len() as u64;
        self.largest = self.largest.max(chunk.len());
        Ok(())
    }
}
