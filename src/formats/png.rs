use flate2::read::ZlibDecoder;
use image::{ImageEncoder, RgbImage, codecs::png::PngEncoder};
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::watermark::WatermarkError;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Extract the ICC profile from the iCCP chunk of PNG data.
pub fn extract_icc_profile(data: &[u8]) -> Option<Vec<u8>> {
    if !data.starts_with(PNG_SIGNATURE) {
        return None;
    }

    let mut pos = PNG_SIGNATURE.len();

    while pos + 12 <= data.len() {
        let chunk_length =
            u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]) as usize;
        let chunk_type = &data[pos + 4..pos + 8];
        let chunk_data_start = pos + 8;
        let chunk_data_end = chunk_data_start.checked_add(chunk_length)?;
        if chunk_data_end > data.len() {
            return None;
        }

        if chunk_type == b"iCCP" {
            return decode_iccp(&data[chunk_data_start..chunk_data_end]);
        }
        // Profiles must precede image data
        if chunk_type == b"IDAT" || chunk_type == b"IEND" {
            return None;
        }

        // length + type + data + CRC
        pos = chunk_data_end + 4;
    }

    None
}

/// iCCP layout: null-terminated profile name, compression method (0 = zlib),
/// compressed profile.
fn decode_iccp(chunk_data: &[u8]) -> Option<Vec<u8>> {
    let null_pos = chunk_data.iter().position(|&b| b == 0)?;
    if null_pos + 2 > chunk_data.len() || chunk_data[null_pos + 1] != 0 {
        return None;
    }

    let mut decoder = ZlibDecoder::new(&chunk_data[null_pos + 2..]);
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed).ok()?;

    debug!("Found ICC profile in PNG: {} bytes (decompressed)", decompressed.len());
    Some(decompressed)
}

/// Save an RGB image as PNG, embedding the ICC profile when given.
pub fn save(image: &RgbImage, path: &Path, icc_profile: Option<&[u8]>) -> Result<(), WatermarkError> {
    let output = std::io::BufWriter::new(std::fs::File::create(path)?);
    let mut encoder = PngEncoder::new(output);

    if let Some(profile_data) = icc_profile {
        match encoder.set_icc_profile(profile_data.to_vec()) {
            Ok(()) => debug!("PNG written with ICC profile: {} bytes", profile_data.len()),
            Err(e) => debug!("PNG encoder rejected ICC profile ({}), writing without it", e),
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
