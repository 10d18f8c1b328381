use crate::utils::error::Result;
use std::path::Path;

/// Whole-file access used by the converter.
pub trait Storage {
    fn read_file(&self, path: &Path) -> Result<Vec<u8>>;

    /// Replaces `path` with `data`. Implementations must not leave a partial
    /// file behind when this fails.
    fn write_file(&self, path: &Path, data: &[u8]) -> Result<()>;
}
