use std::fs::{self, File, OpenOptions};
use std::io::{self, Cursor, Write};
use std::path::Path;

use tempfile::TempPath;

use crate::uploaded_file::Contents;

/// Where one uploaded field's bytes physically live.
#[derive(Debug)]
pub(crate) enum Backing {
    /// A growable in-process buffer; the cursor doubles as the write and
    /// read handle.
    Memory(Cursor<Vec<u8>>),

    /// Bytes spooled into a uniquely named file on disk. The handle is
    /// opened lazily on first contents access; `finish` drops it, and the
    /// next access opens a fresh one positioned at the start of the file.
    TempFile { path: TempPath, handle: Option<File> },
}

impl Backing {
    pub(crate) fn memory() -> Backing {
        Backing::Memory(Cursor::new(Vec::new()))
    }

    pub(crate) fn temp_file(path: TempPath) -> Backing {
        Backing::TempFile { path, handle: None }
    }

    /// The number of bytes currently held, queried live from the backing
    /// store rather than a cached counter. For the temp-file variant this
    /// stats the file on disk, so it stays accurate while a writer holds
    /// the handle.
    pub(crate) fn len(&self) -> crate::Result<u64> {
        match self {
            Backing::Memory(buf) => Ok(buf.get_ref().len() as u64),
            Backing::TempFile { path, .. } => fs::metadata(&**path).map(|meta| meta.len()).map_err(|cause| {
                crate::Error::TempFileStatFailed {
                    path: path.to_path_buf(),
                    cause,
                }
            }),
        }
    }

    /// The stream handle for the store, shared by the write and read
    /// phases.
    pub(crate) fn contents(&mut self) -> crate::Result<&mut dyn Contents> {
        match self {
            Backing::Memory(buf) => Ok(buf),
            Backing::TempFile { path, handle } => {
                let file = match handle.take() {
                    Some(file) => file,
                    None => OpenOptions::new()
                        .read(true)
                        .write(true)
                        .create(true)
                        .open(&**path)
                        .map_err(|cause| crate::Error::TempFileOpenFailed {
                            path: path.to_path_buf(),
                            cause,
                        })?,
                };

                Ok(handle.insert(file))
            }
        }
    }

    /// Seals the write phase: rewinds the in-memory cursor to offset zero,
    /// or flushes and drops the temp file handle so the next contents
    /// access reopens at the start.
    pub(crate) fn finish(&mut self) -> io::Result<()> {
        match self {
            Backing::Memory(buf) => {
                buf.set_position(0);
                Ok(())
            }
            Backing::TempFile { handle, .. } => {
                if let Some(mut file) = handle.take() {
                    file.flush()?;
                }
                Ok(())
            }
        }
    }

    /// The path of the backing temp file, if there is one.
    pub(crate) fn temp_path(&self) -> Option<&Path> {
        match self {
            Backing::Memory(_) => None,
            Backing::TempFile { path, .. } => Some(path),
        }
    }

    /// Releases everything the store owns. Runs on cleanup paths, so
    /// failures are logged and swallowed rather than propagated.
    pub(crate) fn release(self) {
        match self {
            Backing::Memory(_) => {}
            Backing::TempFile { path, handle } => {
                // The handle has to go first: Windows refuses to remove a
                // file that is still open.
                drop(handle);

                if let Err(_cause) = path.close() {
                    #[cfg(feature = "log")]
                    log::warn!("failed to remove upload temp file: {}", _cause);
                }
            }
        }
    }
}
