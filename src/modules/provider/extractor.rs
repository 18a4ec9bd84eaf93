/// Document text extraction.
///
/// Extraction is CPU-bound, so it runs on the blocking thread pool behind a
/// small fixed number of permits instead of suspending the cooperative
/// scheduler.
use crate::shared::errors::{AppError, AppResult};
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Arc;
use tokio::sync::Semaphore;

const EXTRACTION_WORKERS: usize = 4;

/// Blocking bytes -> plain text conversion. May fail on corrupt input; the
/// summarization stage maps failure to a sentinel result.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, data: &[u8]) -> AppResult<String>;
}

/// Extractor backed by the `pdftotext` binary, fed over stdin.
pub struct PdftotextExtractor;

impl TextExtractor for PdftotextExtractor {
    fn extract(&self, data: &[u8]) -> AppResult<String> {
        let mut child = Command::new("pdftotext")
            .args(["-q", "-", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Failed to launch pdftotext: {}", e))
            })?;

        child
            .stdin
            .as_mut()
            .ok_or_else(|| AppError::InternalError("pdftotext stdin unavailable".to_string()))?
            .write_all(data)
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Failed to feed pdftotext: {}", e))
            })?;

        let output = child.wait_with_output().map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to run pdftotext: {}", e))
        })?;

        if !output.status.success() {
            return Err(AppError::ExternalServiceError(format!(
                "pdftotext exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Fixed-size worker pool dispatching extraction onto blocking threads.
pub struct ExtractionPool {
    extractor: Arc<dyn TextExtractor>,
    permits: Arc<Semaphore>,
}

impl ExtractionPool {
    pub fn new(extractor: Arc<dyn TextExtractor>) -> Self {
        Self {
            extractor,
            permits: Arc::new(Semaphore::new(EXTRACTION_WORKERS)),
        }
    }

    pub async fn extract(&self, data: Vec<u8>) -> AppResult<String> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| AppError::InternalError("Extraction pool closed".to_string()))?;

        let extractor = Arc::clone(&self.extractor);
        tokio::task::spawn_blocking(move || extractor.extract(&data))
            .await
            .map_err(|e| AppError::InternalError(format!("Extraction task panicked: {}", e)))?
    }
}
