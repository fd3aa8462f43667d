// Fixture builders shared by the integration tests
#![allow(dead_code)]

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageEncoder, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Little-endian TIFF with IFD0 -> Exif IFD -> DateTimeOriginal.
pub fn tiff_with_capture_time(value: &str) -> Vec<u8> {
    assert!(value.len() + 1 > 4, "short values would be stored inline");

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II*\0");
    tiff.extend_from_slice(&8u32.to_le_bytes());

    // IFD0 at 8: ExifIFDPointer
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x8769u16.to_le_bytes());
    tiff.extend_from_slice(&4u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&26u32.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());

    // Exif IFD at 26: DateTimeOriginal, string at 44
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x9003u16.to_le_bytes());
    tiff.extend_from_slice(&2u16.to_le_bytes());
    tiff.extend_from_slice(&(value.len() as u32 + 1).to_le_bytes());
    tiff.extend_from_slice(&44u32.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());

    assert_eq!(tiff.len(), 44);
    tiff.extend_from_slice(value.as_bytes());
    tiff.push(0);
    tiff
}

/// Little-endian TIFF whose only tag is Orientation.
pub fn tiff_without_capture_time() -> Vec<u8> {
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II*\0");
    tiff.extend_from_slice(&8u32.to_le_bytes());

    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x0112u16.to_le_bytes());
    tiff.extend_from_slice(&3u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0u16.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff
}

pub fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

pub fn encode_jpeg(image: &RgbImage, icc: Option<&[u8]>) -> Vec<u8> {
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, 90);
    if let Some(profile) = icc {
        encoder.set_icc_profile(profile.to_vec()).unwrap();
    }
    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
    out
}

pub fn encode_gray_jpeg(width: u32, height: u32, icc: &[u8]) -> Vec<u8> {
    let pixels: Vec<u8> = (0..width * height).map(|i| (i % 256) as u8).collect();
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, 90);
    encoder.set_icc_profile(icc.to_vec()).unwrap();
    encoder
        .write_image(&pixels, width, height, image::ExtendedColorType::L8)
        .unwrap();
    out
}

pub fn encode_png(image: &RgbImage) -> Vec<u8> {
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(image.clone())
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

/// A JPEG with an APP1 Exif segment spliced in after SOI.
pub fn jpeg_with_exif(width: u32, height: u32, tiff: &[u8]) -> Vec<u8> {
    let encoded = encode_jpeg(&gradient(width, height), None);

    let mut jpeg = vec![0xFF, 0xD8];
    jpeg.extend_from_slice(&[0xFF, 0xE1]);
    jpeg.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(tiff);
    jpeg.extend_from_slice(&encoded[2..]);
    jpeg
}

fn full_box(kind: &[u8; 4], version: u8, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&((12 + body.len()) as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(&[version, 0, 0, 0]);
    out.extend_from_slice(body);
    out
}

fn plain_box(kind: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&((8 + body.len()) as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(body);
    out
}

/// A HEIF container holding only an Exif item; there is no image item, so
/// it carries metadata but cannot be decoded.
pub fn heif_with_exif(tiff: &[u8]) -> Vec<u8> {
    let mut ftyp_body = Vec::new();
    ftyp_body.extend_from_slice(b"heic");
    ftyp_body.extend_from_slice(&0u32.to_be_bytes());
    ftyp_body.extend_from_slice(b"mif1");
    ftyp_body.extend_from_slice(b"heic");
    let ftyp = plain_box(b"ftyp", &ftyp_body);

    let mut payload = Vec::new();
    payload.extend_from_slice(&6u32.to_be_bytes());
    payload.extend_from_slice(b"Exif\0\0");
    payload.extend_from_slice(tiff);

    let mut infe_body = Vec::new();
    infe_body.extend_from_slice(&1u16.to_be_bytes());
    infe_body.extend_from_slice(&0u16.to_be_bytes());
    infe_body.extend_from_slice(b"Exif");
    infe_body.push(0);
    let infe = full_box(b"infe", 2, &infe_body);

    let mut iinf_body = Vec::new();
    iinf_body.extend_from_slice(&1u16.to_be_bytes());
    iinf_body.extend_from_slice(&infe);
    let iinf = full_box(b"iinf", 0, &iinf_body);

    // The extent offset depends on the meta size, which does not depend on
    // the offset value, so build iloc with a placeholder first
    let iloc_for = |offset: u32| {
        let mut body = Vec::new();
        body.push(0x44);
        body.push(0x00);
        body.extend_from_slice(&1u16.to_be_bytes());
        body.extend_from_slice(&1u16.to_be_bytes());
        body.extend_from_slice(&0u16.to_be_bytes());
        body.extend_from_slice(&1u16.to_be_bytes());
        body.extend_from_slice(&offset.to_be_bytes());
        body.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        full_box(b"iloc", 0, &body)
    };
    let meta_for = |iloc: Vec<u8>| {
        let mut children = iinf.clone();
        children.extend_from_slice(&iloc);
        full_box(b"meta", 0, &children)
    };

    let meta_len = meta_for(iloc_for(0)).len();
    let offset = (ftyp.len() + meta_len + 8) as u32;
    let meta = meta_for(iloc_for(offset));

    let mut file = ftyp;
    file.extend_from_slice(&meta);
    file.extend_from_slice(&plain_box(b"mdat", &payload));
    file
}

/// Like `heif_with_exif`, but the Exif item is stored inside the `meta` box
/// (`idat`, construction method 1) instead of `mdat`.
pub fn heif_with_exif_in_idat(tiff: &[u8]) -> Vec<u8> {
    let mut ftyp_body = Vec::new();
    ftyp_body.extend_from_slice(b"heic");
    ftyp_body.extend_from_slice(&0u32.to_be_bytes());
    ftyp_body.extend_from_slice(b"mif1");
    ftyp_body.extend_from_slice(b"heic");
    let ftyp = plain_box(b"ftyp", &ftyp_body);

    let mut payload = Vec::new();
    payload.extend_from_slice(&6u32.to_be_bytes());
    payload.extend_from_slice(b"Exif\0\0");
    payload.extend_from_slice(tiff);

    let mut infe_body = Vec::new();
    infe_body.extend_from_slice(&7u16.to_be_bytes());
    infe_body.extend_from_slice(&0u16.to_be_bytes());
    infe_body.extend_from_slice(b"Exif");
    infe_body.push(0);
    let infe = full_box(b"infe", 2, &infe_body);

    let mut iinf_body = Vec::new();
    iinf_body.extend_from_slice(&1u16.to_be_bytes());
    iinf_body.extend_from_slice(&infe);
    let iinf = full_box(b"iinf", 0, &iinf_body);

    let mut iloc_body = Vec::new();
    iloc_body.push(0x44);
    iloc_body.push(0x00);
    iloc_body.extend_from_slice(&1u16.to_be_bytes());
    iloc_body.extend_from_slice(&7u16.to_be_bytes());
    // reserved bits, then construction method 1
    iloc_body.extend_from_slice(&1u16.to_be_bytes());
    iloc_body.extend_from_slice(&0u16.to_be_bytes());
    iloc_body.extend_from_slice(&1u16.to_be_bytes());
    iloc_body.extend_from_slice(&0u32.to_be_bytes());
    iloc_body.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    let iloc = full_box(b"iloc", 1, &iloc_body);

    let mut children = iinf;
    children.extend_from_slice(&iloc);
    children.extend_from_slice(&plain_box(b"idat", &payload));
    let meta = full_box(b"meta", 0, &children);

    let mut file = ftyp;
    file.extend_from_slice(&meta);
    file
}

pub fn write_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path
}

/// Minimal stand-in ICC profile with the given header colour space.
pub fn fake_icc_profile(color_space: &[u8; 4]) -> Vec<u8> {
    let mut profile = vec![0u8; 300];
    profile[16..20].copy_from_slice(color_space);
    profile[36..40].copy_from_slice(b"acsp");
    for (i, b) in profile.iter_mut().enumerate().skip(128) {
        *b = (i % 251) as u8;
    }
    profile
}
