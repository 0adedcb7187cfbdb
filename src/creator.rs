use std::path::{Path, PathBuf};

use crate::backing::Backing;
use crate::constants;
use crate::uploaded_file::UploadedFile;

/// A capability for allocating the backing storage of one uploaded field.
///
/// The multipart parser is handed one of these and calls
/// [`create`](UploadedFileCreator::create) whenever a file field starts, so
/// upload-size policy can pick memory or disk backing without the parser
/// knowing which it got. The trait is object-safe; a parser typically holds
/// a `Box<dyn UploadedFileCreator>`.
pub trait UploadedFileCreator {
    /// Produces a fresh [`UploadedFile`] for the field `name`, carrying the
    /// caller-supplied `file_ref` and the client's declared `length`, if
    /// any.
    fn create(&self, name: &str, file_ref: &str, length: Option<u64>) -> crate::Result<UploadedFile>;
}

/// Creates uploads backed by a uniquely named temporary file on disk.
///
/// Allocating the file is an observable side effect of
/// [`create`](UploadedFileCreator::create); it fails with
/// [`Error::TempFileCreateFailed`](crate::Error::TempFileCreateFailed) when
/// the platform can't provide one (permissions, disk exhaustion).
pub struct TempFileCreator {
    dir: Option<PathBuf>,
}

impl TempFileCreator {
    /// Spools uploads into the platform's default temp directory.
    pub fn new() -> TempFileCreator {
        TempFileCreator { dir: None }
    }

    /// Spools uploads into `dir` instead of the platform's default temp
    /// directory. The directory must already exist.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> TempFileCreator {
        TempFileCreator {
            dir: Some(dir.as_ref().to_path_buf()),
        }
    }
}

impl Default for TempFileCreator {
    fn default() -> Self {
        TempFileCreator::new()
    }
}

impl UploadedFileCreator for TempFileCreator {
    fn create(&self, name: &str, file_ref: &str, length: Option<u64>) -> crate::Result<UploadedFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(constants::TEMP_FILE_PREFIX);

        let file = match self.dir {
            Some(ref dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|cause| crate::Error::TempFileCreateFailed {
            field_name: name.to_owned(),
            cause,
        })?;

        // Only the path is kept; the entity opens its own handle lazily on
        // the first contents access.
        let path = file.into_temp_path();

        Ok(UploadedFile::new(name, file_ref, length, Backing::temp_file(path)))
    }
}

/// Creates uploads backed by a growable in-process buffer.
///
/// Has no external side effect and does not fail under normal conditions.
pub struct InMemoryCreator;

impl UploadedFileCreator for InMemoryCreator {
    fn create(&self, name: &str, file_ref: &str, length: Option<u64>) -> crate::Result<UploadedFile> {
        Ok(UploadedFile::new(name, file_ref, length, Backing::memory()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_file_creator_allocates_on_disk() {
        let upload = TempFileCreator::new().create("doc", "report.pdf", None).unwrap();

        let path = upload.temp_file_path().unwrap();
        assert!(path.is_absolute());
        assert!(path.exists());

        let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(file_name.starts_with(constants::TEMP_FILE_PREFIX));
    }

    #[test]
    fn test_temp_file_creator_in_dir() {
        let dir = tempfile::tempdir().unwrap();

        let upload = TempFileCreator::in_dir(dir.path())
            .create("doc", "report.pdf", None)
            .unwrap();

        let path = upload.temp_file_path().unwrap();
        assert_eq!(path.parent(), Some(dir.path()));
        assert!(path.exists());
    }

    #[test]
    fn test_temp_file_creator_missing_dir() {
        let creator = TempFileCreator::in_dir("/definitely/not/a/real/dir");

        let err = creator.create("doc", "report.pdf", None).unwrap_err();
        assert!(matches!(err, crate::Error::TempFileCreateFailed { .. }));
    }

    #[test]
    fn test_in_memory_creator_has_no_temp_file() {
        let upload = InMemoryCreator.create("doc", "report.pdf", None).unwrap();

        assert_eq!(
            upload.temp_file_path().unwrap_err(),
            crate::Error::NotTempFileBacked {
                field_name: "doc".to_owned()
            }
        );
    }
}
