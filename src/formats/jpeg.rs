use image::{ImageEncoder, RgbImage, codecs::jpeg::JpegEncoder};
use std::path::Path;
use tracing::debug;

use crate::watermark::WatermarkError;

const ICC_MARKER: &[u8] = b"ICC_PROFILE\0";

/// Extract the ICC profile from JPEG data, joining multi-segment profiles in
/// sequence order.
pub fn extract_icc_profile(data: &[u8]) -> Option<Vec<u8>> {
    if !data.starts_with(&[0xFF, 0xD8]) {
        return None;
    }

    let mut chunks: Vec<(u8, &[u8])> = Vec::new();
    let mut pos = 2;

    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            break;
        }
        let marker = data[pos + 1];
        // Fill bytes before a marker
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // Start of scan: no more metadata segments
        if marker == 0xDA || marker == 0xD9 {
            break;
        }

        let segment_length = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        let segment_end = pos + 2 + segment_length;
        if segment_length < 2 || segment_end > data.len() {
            break;
        }

        // APP2 segments carry ICC_PROFILE chunks: marker, sequence number, count
        let segment = &data[pos + 4..segment_end];
        if marker == 0xE2 && segment.len() > ICC_MARKER.len() + 2 && segment.starts_with(ICC_MARKER)
        {
            let sequence = segment[ICC_MARKER.len()];
            chunks.push((sequence, &segment[ICC_MARKER.len() + 2..]));
        }

        pos = segment_end;
    }

    if chunks.is_empty() {
        return None;
    }

    chunks.sort_by_key(|(sequence, _)| *sequence);
    let profile: Vec<u8> = chunks.into_iter().flat_map(|(_, c)| c.iter().copied()).collect();
    debug!("Found ICC profile in JPEG: {} bytes", profile.len());
    Some(profile)
}

/// Save an RGB image as JPEG, embedding the ICC profile when given.
pub fn save(
    image: &RgbImage,
    path: &Path,
    quality: u8,
    icc_profile: Option<&[u8]>,
) -> Result<(), WatermarkError> {
    let output = std::io::BufWriter::new(std::fs::File::create(path)?);
    let mut encoder = JpegEncoder::new_with_quality(output, quality);

    if let Some(profile_data) = icc_profile {
        match encoder.set_icc_profile(profile_data.to_vec()) {
            Ok(()) => debug!("JPEG written with ICC profile: {} bytes", profile_data.len()),
            Err(e) => debug!("JPEG encoder rejected ICC profile ({}), writing without it", e),
        }
    }

    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgb8,
    )?;

    Ok(())
}
