//! Streaming copy for the first phase of a relocation.
//!
//! - Writes to a newly created destination file (O_EXCL semantics; never clobbers).
//! - Buffered I/O to keep syscall count low on large logs.
//! - Fsyncs the destination before returning so the second phase (removing
//!   the original) only runs once the copy is durable.
//!
//! Snapshot semantics: the source is read once from start to EOF. Callers hold
//! the log file lock, so no append can land mid-copy.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

const BUF_SIZE: usize = 256 * 1024;

/// Copy `src` -> `dst`, failing with `AlreadyExists` if `dst` is present.
/// Returns the number of bytes written.
pub(crate) fn copy_new(src: &Path, dst: &Path) -> io::Result<u64> {
    let src_f = File::open(src)?;
    let dst_f = OpenOptions::new().write(true).create_new(true).open(dst)?;

    let mut reader = BufReader::with_capacity(BUF_SIZE, src_f);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, dst_f);
    let copied = (|| -> io::Result<u64> {
        let bytes = io::copy(&mut reader, &mut writer)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(bytes)
    })();

    match copied {
        Ok(bytes) => {
            if let Some(parent) = dst.parent() {
                let _ = super::util::fsync_dir(parent);
            }
            Ok(bytes)
        }
        Err(e) => {
            // We created dst, so a half-written copy is ours to remove.
            drop(writer);
            let _ = std::fs::remove_file(dst);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write as _;
    use tempfile::tempdir;

    #[test]
    fn copy_small_file_ok() {
        let dir = tempdir().unwrap();
        let src_path = dir.path().join("src.txt");
        let dst_path = dir.path().join("dst.txt");

        let data = b"hello world";
        fs::write(&src_path, data).unwrap();

        let n = copy_new(&src_path, &dst_path).unwrap();
        assert_eq!(n, data.len() as u64);
        assert_eq!(fs::read(&dst_path).unwrap(), data);
    }

    #[test]
    fn fails_if_dest_exists() {
        let dir = tempdir().unwrap();
        let src_path = dir.path().join("src");
        let dst_path = dir.path().join("dst");
        fs::write(&src_path, b"data").unwrap();
        let mut f = File::create(&dst_path).unwrap();
        f.write_all(b"x").unwrap();
        drop(f);

        let err = copy_new(&src_path, &dst_path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        // Existing destination untouched
        assert_eq!(fs::read(&dst_path).unwrap(), b"x");
    }

    #[test]
    fn missing_source_leaves_no_destination() {
        let dir = tempdir().unwrap();
        let dst_path = dir.path().join("dst");
        let err = copy_new(&dir.path().join("nope"), &dst_path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!dst_path.exists());
    }

    #[test]
    fn copy_crosses_buffer_boundary() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("big.log");
        let dst = dir.path().join("big.out");

        let size = 2 * BUF_SIZE + 123;
        let data: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
        fs::write(&src, &data).unwrap();

        let n = copy_new(&src, &dst).unwrap();
        assert_eq!(n as usize, size);
        assert_eq!(fs::read(&dst).unwrap(), data);
    }
}
