use std::borrow::Cow;
use std::io::{self, Read, Seek, Write};
use std::path::Path;

use bytes::Bytes;
use encoding_rs::{Encoding, UTF_8};
use mime::Mime;
#[cfg(feature = "json")]
use serde::de::DeserializeOwned;
#[cfg(feature = "json")]
use serde_json;

use crate::backing::Backing;
use crate::constants;

/// The stream-like handle through which an upload's bytes are written while
/// the field arrives and read back afterwards.
pub trait Contents: Read + Write + Seek {}

impl<T: Read + Write + Seek + ?Sized> Contents for T {}

/// One uploaded field's buffered bytes and metadata.
///
/// An `UploadedFile` is produced by an
/// [`UploadedFileCreator`](crate::UploadedFileCreator) when a file field
/// starts. Its lifecycle has two phases separated by
/// [`finish`](UploadedFile::finish): during the write phase the multipart
/// parser appends the field's bytes through
/// [`contents`](UploadedFile::contents); afterwards the consumer reads them
/// back through the same handle. [`dispose`](UploadedFile::dispose) (or
/// dropping the value) releases the backing buffer or removes the temporary
/// file.
///
/// The entity exclusively owns its backing store. It makes no promises
/// under concurrent access; exactly one owner writes and later reads it.
#[derive(Debug)]
pub struct UploadedFile {
    name: String,
    file_ref: String,
    length: Option<u64>,
    content_type: Option<Mime>,
    backing: Option<Backing>,
}

impl UploadedFile {
    pub(crate) fn new(name: &str, file_ref: &str, length: Option<u64>, backing: Backing) -> UploadedFile {
        UploadedFile {
            name: name.to_owned(),
            file_ref: file_ref.to_owned(),
            length,
            content_type: None,
            backing: Some(backing),
        }
    }

    /// The form field name the upload arrived under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The caller-supplied reference for the upload, usually the client's
    /// original file name.
    pub fn file_ref(&self) -> &str {
        &self.file_ref
    }

    /// The length declared by the client, if any.
    ///
    /// Advisory only; the client may omit it or lie about it. Nothing
    /// reconciles it with [`current_len`](UploadedFile::current_len), which
    /// counts the bytes actually stored.
    pub fn length(&self) -> Option<u64> {
        self.length
    }

    /// The declared MIME type of the upload, if one has been set.
    pub fn content_type(&self) -> Option<&Mime> {
        self.content_type.as_ref()
    }

    /// Sets the declared MIME type of the upload.
    pub fn set_content_type(&mut self, content_type: Mime) {
        self.content_type = Some(content_type);
    }

    /// Whether [`dispose`](UploadedFile::dispose) has already released the
    /// backing storage.
    pub fn is_disposed(&self) -> bool {
        self.backing.is_none()
    }

    /// The number of bytes buffered so far.
    ///
    /// Recomputed from the live backing store on every call, never cached.
    /// For the temp-file variant this queries the current size of the file
    /// on disk, so it is accurate even while the field is still being
    /// written.
    pub fn current_len(&self) -> crate::Result<u64> {
        self.backing_ref()?.len()
    }

    /// The stream handle carrying the upload's bytes, shared by the write
    /// and read phases.
    ///
    /// The in-memory variant always returns the same buffer handle. The
    /// temp-file variant opens a read-write handle (open-or-create) lazily
    /// on first access and reuses it until [`finish`](UploadedFile::finish)
    /// or [`dispose`](UploadedFile::dispose) closes it; accessing the
    /// contents again after `finish` opens a fresh handle positioned at the
    /// start of the file.
    pub fn contents(&mut self) -> crate::Result<&mut dyn Contents> {
        self.backing_mut()?.contents()
    }

    /// The absolute path of the backing temporary file.
    ///
    /// Fails with [`Error::NotTempFileBacked`](crate::Error::NotTempFileBacked)
    /// on an in-memory upload.
    pub fn temp_file_path(&self) -> crate::Result<&Path> {
        match self.backing_ref()?.temp_path() {
            Some(path) => Ok(path),
            None => Err(crate::Error::NotTempFileBacked {
                field_name: self.name.clone(),
            }),
        }
    }

    /// Seals the write phase and prepares the upload for reading.
    ///
    /// Call this at most once, after the last byte has been written;
    /// calling it before any bytes have been written is legal and yields an
    /// empty readable stream. The in-memory variant rewinds its buffer to
    /// offset zero; the temp-file variant flushes and closes its handle, so
    /// the next [`contents`](UploadedFile::contents) access reopens the
    /// file at the start.
    pub fn finish(&mut self) -> crate::Result<()> {
        let field_name = self.name.clone();

        match self.backing {
            Some(ref mut backing) => backing
                .finish()
                .map_err(|cause| crate::Error::FinishFailed { field_name, cause }),
            None => Err(crate::Error::AlreadyDisposed { field_name }),
        }
    }

    /// Releases all resources owned by the upload: the in-memory buffer is
    /// freed, or the temp file handle is closed and the file removed from
    /// disk.
    ///
    /// Idempotent and infallible: failures while removing the temp file
    /// are logged and swallowed, since disposal runs on cleanup paths.
    /// After disposal the other operations fail with
    /// [`Error::AlreadyDisposed`](crate::Error::AlreadyDisposed). Dropping
    /// an undisposed `UploadedFile` disposes it.
    pub fn dispose(&mut self) {
        if let Some(backing) = self.backing.take() {
            backing.release();
        }
    }

    /// Reads the remaining contents into a [`Bytes`] buffer.
    ///
    /// Call after [`finish`](UploadedFile::finish) to get the whole field
    /// back.
    pub fn bytes(&mut self) -> crate::Result<Bytes> {
        let field_name = self.name.clone();

        let mut buf = Vec::new();
        self.contents()?
            .read_to_end(&mut buf)
            .map_err(|cause| crate::Error::ContentsReadFailed { field_name, cause })?;

        Ok(Bytes::from(buf))
    }

    /// Reads the remaining contents as text, decoded as UTF-8 unless the
    /// declared content type carries a `charset` parameter.
    pub fn text(&mut self) -> crate::Result<String> {
        self.text_with_charset(constants::DEFAULT_TEXT_ENCODING)
    }

    /// Reads the remaining contents as text, decoded with the `charset`
    /// parameter of the declared content type, falling back to
    /// `default_encoding`.
    pub fn text_with_charset(&mut self, default_encoding: &str) -> crate::Result<String> {
        let encoding_name = self
            .content_type()
            .and_then(|mime| mime.get_param(mime::CHARSET))
            .map(|charset| charset.as_str())
            .unwrap_or(default_encoding);

        let encoding = Encoding::for_label(encoding_name.as_bytes()).unwrap_or(UTF_8);

        let bytes = self.bytes()?;

        let (text, _, _) = encoding.decode(&bytes);

        match text {
            Cow::Owned(s) => Ok(s),
            Cow::Borrowed(s) => Ok(String::from(s)),
        }
    }

    /// Reads the remaining contents and decodes them as JSON.
    ///
    /// # Optional
    ///
    /// This requires the optional `json` feature to be enabled.
    #[cfg(feature = "json")]
    #[cfg_attr(nightly, doc(cfg(feature = "json")))]
    pub fn json<T: DeserializeOwned>(&mut self) -> crate::Result<T> {
        let bytes = self.bytes()?;
        serde_json::from_slice(&bytes).map_err(crate::Error::DecodeJson)
    }

    fn backing_ref(&self) -> crate::Result<&Backing> {
        match self.backing {
            Some(ref backing) => Ok(backing),
            None => Err(crate::Error::AlreadyDisposed {
                field_name: self.name.clone(),
            }),
        }
    }

    fn backing_mut(&mut self) -> crate::Result<&mut Backing> {
        match self.backing {
            Some(ref mut backing) => Ok(backing),
            None => Err(crate::Error::AlreadyDisposed {
                field_name: self.name.clone(),
            }),
        }
    }
}

/// Delegates to the [`contents`](UploadedFile::contents) handle, so a
/// finished upload can be fed straight into [`io::copy`].
impl Read for UploadedFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.contents()?.read(buf)
    }
}

/// Delegates to the [`contents`](UploadedFile::contents) handle, so the
/// parser can write incoming chunks without touching the handle itself.
impl Write for UploadedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.contents()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.contents()?.flush()
    }
}

impl Drop for UploadedFile {
    fn drop(&mut self) {
        self.dispose();
    }
}
