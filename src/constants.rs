pub(crate) const TEMP_FILE_PREFIX: &'static str = "upload-";
pub(crate) const DEFAULT_TEXT_ENCODING: &'static str = "utf-8";
