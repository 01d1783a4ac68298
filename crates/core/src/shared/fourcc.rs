/// Decodes a little-endian four-character code, e.g. `0x47504A4D` → `"MJPG"`.
pub fn fourcc_to_string(code: u32) -> String {
    code.to_le_bytes().iter().map(|&b| b as char).collect()
}

/// Packs a four-character code string. Returns `None` unless the string is
/// exactly four ASCII characters.
pub fn fourcc_from_str(code: &str) -> Option<u32> {
    let bytes: [u8; 4] = code.as_bytes().try_into().ok()?;
    if !bytes.iter().all(u8::is_ascii) {
        return None;
    }
    Some(u32::from_le_bytes(bytes))
}
