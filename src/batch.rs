//! Packing loaded files into size-bounded batch requests.

use std::path::PathBuf;

use crate::loader::LoadedFile;

/// A group of files sent to the backend in a single call.
///
/// File order is the only link between a file and its entry in the
/// provider's response, so it must never be rearranged.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    files: Vec<LoadedFile>,
    total_bytes: u64,
}

impl Batch {
    /// A batch holding exactly one file.
    pub fn single(file: LoadedFile) -> Self {
        let mut batch = Self::default();
        batch.push(file);
        batch
    }

    fn push(&mut self, file: LoadedFile) {
        self.total_bytes += file.len();
        self.files.push(file);
    }

    pub fn files(&self) -> &[LoadedFile] {
        &self.files
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

/// Incremental packer.
///
/// Files are appended in arrival order. When the next file would push the
/// running total past `max_bytes`, the current batch is sealed and handed
/// back, and the file starts a new one. A single file larger than the
/// budget still gets a batch of its own.
#[derive(Debug)]
pub struct Packer {
    max_bytes: u64,
    current: Batch,
}

impl Packer {
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            current: Batch::default(),
        }
    }

    /// Add a file, returning the sealed batch if this file overflowed it.
    pub fn push(&mut self, file: LoadedFile) -> Option<Batch> {
        let sealed = if !self.current.is_empty()
            && self.current.total_bytes + file.len() > self.max_bytes
        {
            Some(std::mem::take(&mut self.current))
        } else {
            None
        };
        self.current.push(file);
        sealed
    }

    /// Seal whatever is left. `None` when nothing was pushed since the last seal.
    pub fn finish(&mut self) -> Option<Batch> {
        if self.current.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.current))
        }
    }
}

/// Pack a whole sequence of files at once.
pub fn pack(files: impl IntoIterator<Item = LoadedFile>, max_bytes: u64) -> Vec<Batch> {
    let mut packer = Packer::new(max_bytes);
    let mut batches: Vec<Batch> = files.into_iter().filter_map(|f| packer.push(f)).collect();
    batches.extend(packer.finish());
    batches
}
