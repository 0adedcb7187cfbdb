#![cfg_attr(nightly, feature(doc_cfg))]

//! Transient backing storage for `multipart/form-data` file uploads.
//!
//! While a multipart request is being parsed, every file field needs
//! somewhere to accumulate its bytes before the handler decides what to do
//! with them. This crate decouples where those bytes live (process memory or
//! a temporary file on disk) from how they are consumed (a single
//! stream-like handle), so upload-size policy can pick a backing store
//! without the parsing or consuming code changing.
//!
//! A [`UploadedFileCreator`] produces an [`UploadedFile`] when a file field
//! starts; the parser writes the field's bytes through
//! [`contents`](UploadedFile::contents) as they arrive and calls
//! [`finish`](UploadedFile::finish) to seal the write phase. The consumer
//! then reads the bytes back through the same handle and finally calls
//! [`dispose`](UploadedFile::dispose) to release the buffer or remove the
//! temporary file. Dropping the entity disposes it too.
//!
//! # Examples
//!
//! ```
//! use std::io::Write;
//! use upload_spool::{InMemoryCreator, UploadedFileCreator};
//!
//! # fn run() {
//! let mut upload = InMemoryCreator
//!     .create("avatar", "client/avatar.png", Some(4))
//!     .unwrap();
//!
//! upload.contents().unwrap().write_all(b"data").unwrap();
//! upload.finish().unwrap();
//!
//! assert_eq!(upload.current_len().unwrap(), 4);
//! assert_eq!(upload.bytes().unwrap(), "data");
//!
//! upload.dispose();
//! # }
//! # run();
//! ```
//!
//! Swapping [`InMemoryCreator`] for a [`TempFileCreator`] spools the same
//! bytes through a uniquely named file on disk instead, with no other change
//! to the calling code.

pub use creator::{InMemoryCreator, TempFileCreator, UploadedFileCreator};
pub use error::Error;
pub use uploaded_file::{Contents, UploadedFile};

mod backing;
mod constants;
mod creator;
mod error;
mod uploaded_file;

/// A Result type often returned from methods that can have `upload-spool`
/// errors.
pub type Result<T> = std::result::Result<T, Error>;
