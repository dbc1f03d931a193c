use std::panic;
use std::path::Path;

use tracing::warn;

use super::ExtractionError;

/// Extracts the text layer of a PDF.
///
/// `pdf-extract` panics on some malformed inputs; those panics are caught and
/// reported as ordinary extraction failures.
pub(super) fn extract_text(path: &Path) -> Result<String, ExtractionError> {
    match panic::catch_unwind(|| pdf_extract::extract_text(path)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ExtractionError::Pdf(e.to_string())),
        Err(_) => {
            warn!("pdf-extract panicked on {}", path.display());
            Err(ExtractionError::Pdf("malformed PDF".to_string()))
        }
    }
}
