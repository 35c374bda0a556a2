//! # Copier Module
//!
//! The filesystem copy primitive: bytes plus metadata.
//!
//! Permissions and access/modification times are carried over so the
//! destination sorts and displays like the original. The copy never
//! overwrites an existing file, and a failed copy leaves nothing behind in
//! the destination. The bytes are fingerprinted as they are written, so the
//! returned hash describes exactly what landed in the destination.

use crate::core::hasher::{ContentHash, ContentHasher};
use crate::error::CopyError;
use filetime::{set_file_times, FileTime};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;

/// What a successful copy wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedFile {
    /// Bytes written
    pub bytes: u64,
    /// Fingerprint of the written bytes
    pub hash: ContentHash,
}

/// Copy `from` to `to`, preserving permissions and timestamps.
///
/// Fails with [`CopyError::AlreadyExists`] if the destination already has an
/// entry under that name, including one the filesystem considers equal by
/// case folding. On any other failure a partially written `to` is removed
/// before the error is returned.
pub fn copy_with_metadata(
    from: &Path,
    to: &Path,
    hasher: &dyn ContentHasher,
) -> Result<CopiedFile, CopyError> {
    let copy_failed = |source| CopyError::CopyFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    let mut reader = File::open(from).map_err(copy_failed)?;
    let metadata = reader.metadata().map_err(copy_failed)?;

    let mut writer = match OpenOptions::new().write(true).create_new(true).open(to) {
        Ok(writer) => writer,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(CopyError::AlreadyExists {
                path: to.to_path_buf(),
            });
        }
        Err(e) => return Err(copy_failed(e)),
    };

    let result = copy_contents(&mut reader, &mut writer, &metadata, to, hasher);
    drop(writer);

    match result {
        Ok(copied) => Ok(copied),
        Err(source) => {
            if let Err(e) = fs::remove_file(to) {
                tracing::warn!(path = %to.display(), error = %e, "Failed to remove partial copy");
            }
            Err(copy_failed(source))
        }
    }
}

fn copy_contents(
    reader: &mut File,
    writer: &mut File,
    metadata: &fs::Metadata,
    to: &Path,
    hasher: &dyn ContentHasher,
) -> io::Result<CopiedFile> {
    let mut tee = TeeReader {
        source: &mut *reader,
        sink: &mut *writer,
        bytes: 0,
    };
    let hash = hasher.hash_reader(&mut tee)?;
    let bytes = tee.bytes;

    writer.sync_all()?;
    fs::set_permissions(to, metadata.permissions())?;
    set_file_times(
        to,
        FileTime::from_last_access_time(metadata),
        FileTime::from_last_modification_time(metadata),
    )?;
    Ok(CopiedFile { bytes, hash })
}

/// Reader that writes everything it yields into `sink`
struct TeeReader<'a> {
    source: &'a mut File,
    sink: &'a mut File,
    bytes: u64,
}

impl Read for TeeReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.source.read(buf)?;
        self.sink.write_all(&buf[..read])?;
        self.bytes += read as u64;
        Ok(read)
    }
}
