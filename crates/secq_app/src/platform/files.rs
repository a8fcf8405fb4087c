use std::path::{Path, PathBuf};

use anyhow::Context;
use secq_core::{CandidateFile, FileKind, PDF_MIME_TYPE};

/// Turns command line paths into upload candidates.
///
/// The MIME type is derived from the extension, the way a browser file picker does.
pub fn candidates(paths: &[PathBuf]) -> anyhow::Result<Vec<CandidateFile>> {
    paths.iter().map(|path| candidate(path)).collect()
}

pub fn candidate(path: &Path) -> anyhow::Result<CandidateFile> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("{} has no usable file name", path.display()))?;
    Ok(CandidateFile::new(name, guess_mime_type(name), path))
}

fn guess_mime_type(name: &str) -> Option<String> {
    (FileKind::from_name(name) == FileKind::Pdf).then(|| PDF_MIME_TYPE.to_string())
}
