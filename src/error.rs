use std::fmt::{self, Debug, Display, Formatter};
use std::io;
use std::path::PathBuf;

use derive_more::Display;

/// A set of errors that can occur while storing an uploaded field's bytes
/// and in other operations.
#[derive(Display)]
#[non_exhaustive]
pub enum Error {
    /// The temp file path was requested for a field held in process memory.
    ///
    /// This signals a contract violation by the caller (using the wrong
    /// variant's capability), not a runtime fault.
    #[display(fmt = "field '{}' is not backed by a temp file", field_name)]
    NotTempFileBacked { field_name: String },

    /// The platform couldn't allocate a temporary file for the field.
    #[display(fmt = "failed to allocate a temp file for field '{}': {}", field_name, cause)]
    TempFileCreateFailed { field_name: String, cause: io::Error },

    /// Failed to open a read-write handle to the backing temp file.
    #[display(fmt = "failed to open temp file {}: {}", "path.display()", cause)]
    TempFileOpenFailed { path: PathBuf, cause: io::Error },

    /// Failed to query the backing temp file's size on disk.
    #[display(fmt = "failed to stat temp file {}: {}", "path.display()", cause)]
    TempFileStatFailed { path: PathBuf, cause: io::Error },

    /// Failed to seal the field's write phase.
    #[display(fmt = "failed to finish field '{}': {}", field_name, cause)]
    FinishFailed { field_name: String, cause: io::Error },

    /// Failed to read the field's buffered contents back.
    #[display(fmt = "failed to read contents of field '{}': {}", field_name, cause)]
    ContentsReadFailed { field_name: String, cause: io::Error },

    /// The field's storage was accessed after
    /// [`dispose`](crate::UploadedFile::dispose) released it.
    #[display(fmt = "field '{}' accessed after its storage was released", field_name)]
    AlreadyDisposed { field_name: String },

    /// Failed to decode the field contents as `JSON` in the
    /// [`json`](crate::UploadedFile::json) method.
    #[cfg(feature = "json")]
    #[cfg_attr(nightly, doc(cfg(feature = "json")))]
    #[display(fmt = "failed to decode field contents as JSON: {}", _0)]
    DecodeJson(serde_json::Error),
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl std::error::Error for Error {}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string().eq(&other.to_string())
    }
}

impl Eq for Error {}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        io::Error::new(io::ErrorKind::Other, err)
    }
}
