use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Content checksums for uploaded files.
///
/// The dedup engine only compares checksum strings; callers use this to
/// produce them before building a `NewFileInput`.
pub struct ChecksumService;

impl ChecksumService {
    pub fn new() -> Self {
        Self
    }

    /// BLAKE3 of the file content, lowercase hex.
    pub fn compute_checksum(&self, file_path: &Path) -> Result<String, HashError> {
        let io_error = |source| HashError::Io {
            path: file_path.display().to_string(),
            source,
        };

        let file = File::open(file_path).map_err(io_error)?;
        let mut reader = BufReader::new(file);
        let mut hasher = blake3::Hasher::new();
        let mut buffer = [0; 8192];

        loop {
            let bytes_read = reader.read(&mut buffer).map_err(io_error)?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(hasher.finalize().to_hex().to_string())
    }

    pub fn compute_checksum_bytes(&self, content: &[u8]) -> String {
        blake3::hash(content).to_hex().to_string()
    }

    /// Checksums for many files in parallel, in input order.
    pub fn compute_checksums_batch(&self, file_paths: &[&Path]) -> Vec<Result<String, HashError>> {
        use rayon::prelude::*;

        file_paths
            .par_iter()
            .map(|path| self.compute_checksum(path))
            .collect()
    }

    pub fn verify_identical_content(&self, file1: &Path, file2: &Path) -> Result<bool, HashError> {
        Ok(self.compute_checksum(file1)? == self.compute_checksum(file2)?)
    }
}

impl Default for ChecksumService {
    fn default() -> Self {
        Self::new()
    }
}
