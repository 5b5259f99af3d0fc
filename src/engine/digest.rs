//! Content digests: selectable algorithm, streaming I/O, lowercase hex out.

use clap::ValueEnum;
use memmap2::Mmap;
use sha2::{Digest, Sha256, Sha512};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::CksumError;
use crate::utils::config::HashingConsts;

/// Content hash algorithm, selectable per run. The database format does not
/// record which algorithm produced a digest, so switching algorithms over a
/// live database makes verify fail deterministically until the next update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Algorithm {
    #[default]
    Sha256,
    Sha512,
    Blake3,
}

enum Hasher {
    Sha256(Sha256),
    Sha512(Box<Sha512>),
    Blake3(Box<blake3::Hasher>),
}

impl Hasher {
    fn new(algo: Algorithm) -> Self {
        match algo {
            Algorithm::Sha256 => Self::Sha256(Sha256::new()),
            Algorithm::Sha512 => Self::Sha512(Box::new(Sha512::new())),
            Algorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
            Self::Blake3(h) => {
                h.update(data);
            }
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            Self::Sha256(h) => hex::encode(h.finalize()),
            Self::Sha512(h) => hex::encode(h.finalize()),
            Self::Blake3(h) => h.finalize().to_hex().to_string(),
        }
    }
}

/// Hash `path`'s content and return the lowercase hex digest. Memory-mapped I/O
/// for files above the threshold, chunked reading otherwise.
pub fn digest_file(path: &Path, algo: Algorithm) -> Result<String, CksumError> {
    let file = File::open(path).map_err(|e| CksumError::unreadable(path, e))?;
    let size = file
        .metadata()
        .map_err(|e| CksumError::unreadable(path, e))?
        .len();
    let mut hasher = Hasher::new(algo);

    if size > HashingConsts::MMAP_THRESHOLD {
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| CksumError::unreadable(path, e))?;
        hasher.update(&mmap);
    } else {
        let mut reader = std::io::BufReader::with_capacity(HashingConsts::READ_CHUNK_SIZE, file);
        let mut buffer = vec![0u8; HashingConsts::READ_CHUNK_SIZE];
        loop {
            let n = reader
                .read(&mut buffer)
                .map_err(|e| CksumError::unreadable(path, e))?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
    }

    Ok(hasher.finalize_hex())
}
