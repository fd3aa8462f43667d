pub mod jpeg;
pub mod png;

const HEIF_BRANDS: [&[u8; 4]; 8] = [
    b"heic", b"heix", b"heim", b"heis", b"hevc", b"hevx", b"mif1", b"msf1",
];

/// Pull an embedded ICC profile out of JPEG or PNG source data.
pub fn extract_icc_profile(data: &[u8]) -> Option<Vec<u8>> {
    jpeg::extract_icc_profile(data).or_else(|| png::extract_icc_profile(data))
}

/// Whether an ICC profile describes RGB data (header colour space `RGB `).
/// Output is always RGB, so gray or CMYK profiles must not be embedded.
pub fn is_rgb_profile(profile: &[u8]) -> bool {
    profile.get(16..20) == Some(b"RGB ".as_slice())
}

/// Whether the data starts with an `ftyp` box naming a HEIF brand, as major
/// or compatible brand.
pub fn is_heif(data: &[u8]) -> bool {
    if data.len() < 16 || &data[4..8] != b"ftyp" {
        return false;
    }
    let size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if size < 16 || size > data.len() {
        return false;
    }

    // major brand, minor version, then compatible brands
    let major = &data[8..12];
    std::iter::once(major)
        .chain(data[16..size].chunks_exact(4))
        .any(|brand| HEIF_BRANDS.iter().any(|b| brand == &b[..]))
}
