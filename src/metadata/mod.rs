// Capture timestamp extraction - picks a metadata encoding from the file
// extension and looks up DateTimeOriginal in it
use chrono::Local;
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, trace};

/// Canonical text form of a capture timestamp: `YYYY-MM-DD HH:MM:SS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureTimestamp(String);

impl CaptureTimestamp {
    pub const FORMAT: &'static str = "%Y-%m-%d %H:%M:%S";

    /// Convert an Exif `YYYY:MM:DD HH:MM:SS` value by turning the first two
    /// colons into hyphens. The rest of the text is kept as is.
    pub fn from_exif(raw: &str) -> Self {
        Self(raw.replacen(':', "-", 2))
    }

    /// The current local wall-clock time.
    pub fn now() -> Self {
        Self(Local::now().format(Self::FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CaptureTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Exif parse error: {0}")]
    TagTable(String),

    #[error("HEIF Exif error: {0}")]
    Exif(#[from] exif::Error),

    #[error("DateTimeOriginal has unexpected type: {0}")]
    UnexpectedValue(String),

    #[error("DateTimeOriginal is not valid text: {0}")]
    InvalidText(#[from] std::str::Utf8Error),
}

/// How capture metadata is stored for a given file type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataEncoding {
    /// Exif tag table in a JPEG APP1 segment
    Jpeg,
    /// Exif item blob inside a HEIF container
    Heif,
}

impl MetadataEncoding {
    /// Select the encoding from the file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "heic" | "heif" => Some(Self::Heif),
            _ => None,
        }
    }

    /// Look up the original capture time. `Ok(None)` means the metadata was
    /// readable but had no capture time.
    pub fn read_capture_time(&self, data: &[u8]) -> Result<Option<String>, MetadataError> {
        match self {
            Self::Jpeg => read_jpeg_capture_time(data),
            Self::Heif => read_heif_capture_time(data),
        }
    }
}

/// Find the embedded capture timestamp of a loaded image file.
///
/// Never fails: unreadable or missing metadata is logged and reported as
/// `None` so the caller can fall back to the current time.
pub fn extract_capture_timestamp(data: &[u8], path: &Path) -> Option<CaptureTimestamp> {
    let encoding = MetadataEncoding::from_path(path)?;

    match encoding.read_capture_time(data) {
        Ok(Some(raw)) => {
            let timestamp = CaptureTimestamp::from_exif(&raw);
            debug!("Found capture time in {}: {}", path.display(), timestamp);
            Some(timestamp)
        }
        Ok(None) => {
            debug!("No DateTimeOriginal in {}", path.display());
            None
        }
        Err(e) => {
            debug!("Failed to read {:?} metadata of {}: {}", encoding, path.display(), e);
            None
        }
    }
}

fn read_jpeg_capture_time(data: &[u8]) -> Result<Option<String>, MetadataError> {
    let exif = rexif::parse_buffer(data).map_err(|e| MetadataError::TagTable(e.to_string()))?;

    let Some(entry) = exif
        .entries
        .iter()
        .find(|e| e.tag == rexif::ExifTag::DateTimeOriginal)
    else {
        return Ok(None);
    };

    let raw = match &entry.value {
        rexif::TagValue::Ascii(s) => s.as_str(),
        _ => &entry.value_more_readable[..],
    };
    trace!("Raw DateTimeOriginal: {:?}", raw);

    Ok(clean_value(raw))
}

fn read_heif_capture_time(data: &[u8]) -> Result<Option<String>, MetadataError> {
    let exif = exif::Reader::new().read_from_container(&mut Cursor::new(data))?;

    let Some(field) = exif.get_field(exif::Tag::DateTimeOriginal, exif::In::PRIMARY) else {
        return Ok(None);
    };

    let bytes = match &field.value {
        exif::Value::Ascii(values) => match values.first() {
            Some(bytes) => bytes,
            None => return Ok(None),
        },
        other => return Err(MetadataError::UnexpectedValue(format!("{:?}", other))),
    };

    let text = std::str::from_utf8(bytes)?;
    Ok(clean_value(text))
}

fn clean_value(raw: &str) -> Option<String> {
    let value = raw.trim_end_matches('\0').trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
