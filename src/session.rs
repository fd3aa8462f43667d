use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::metadata::{CaptureTimestamp, extract_capture_timestamp};
use crate::watermark::{WatermarkError, Watermarker};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No image selected")]
    MissingSelection,

    #[error("No timestamp entered")]
    EmptyTimestamp,

    #[error("Failed to read {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Watermark(#[from] WatermarkError),
}

impl SessionError {
    /// Input problems the user can fix, as opposed to failures while rendering.
    pub fn is_user_input(&self) -> bool {
        matches!(self, SessionError::MissingSelection | SessionError::EmptyTimestamp)
    }
}

/// Where the prefilled timestamp came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampOrigin {
    Metadata,
    Clock,
}

/// Interactive state: the selected image and the editable timestamp text.
pub struct Session {
    watermarker: Watermarker,
    selected: Option<PathBuf>,
    timestamp: String,
}

impl Session {
    pub fn new(watermarker: Watermarker) -> Self {
        Self {
            watermarker,
            selected: None,
            timestamp: String::new(),
        }
    }

    /// Select an image, replacing any previous selection, and prefill the
    /// timestamp from its metadata or the current time.
    pub fn select(&mut self, path: impl Into<PathBuf>) -> Result<TimestampOrigin, SessionError> {
        let path = path.into();
        let data = std::fs::read(&path).map_err(|source| SessionError::ReadError {
            path: path.clone(),
            source,
        })?;

        let (timestamp, origin) = match extract_capture_timestamp(&data, &path) {
            Some(ts) => (ts, TimestampOrigin::Metadata),
            None => (CaptureTimestamp::now(), TimestampOrigin::Clock),
        };
        info!("Selected {} ({:?} timestamp {})", path.display(), origin, timestamp);

        self.timestamp = timestamp.into_string();
        self.selected = Some(path);
        Ok(origin)
    }

    pub fn selected(&self) -> Option<&Path> {
        self.selected.as_deref()
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn set_timestamp(&mut self, text: impl Into<String>) {
        self.timestamp = text.into();
    }

    /// Render the current selection with the current timestamp text.
    pub fn render(&self) -> Result<PathBuf, SessionError> {
        let Some(path) = self.selected.as_deref() else {
            warn!("Render requested with no image selected");
            return Err(SessionError::MissingSelection);
        };
        if self.timestamp.is_empty() {
            warn!("Render requested with an empty timestamp");
            return Err(SessionError::EmptyTimestamp);
        }

        Ok(self.watermarker.render(path, &self.timestamp)?)
    }
}
