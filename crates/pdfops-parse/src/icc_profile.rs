//! ICC profile header decoding.

use pdfops_core::IccProfile;

const HEADER_LEN: usize = 128;

fn signature(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim_end().to_string()
}

/// Read the fixed 128-byte header of an ICC profile.
///
/// Returns `None` for short data or when the `acsp` file signature at
/// offset 36 is missing.
pub fn parse_icc_header(bytes: &[u8]) -> Option<IccProfile> {
    let header = bytes.get(..HEADER_LEN)?;
    if &header[36..40] != b"acsp" {
        return None;
    }

    let size = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    // Byte 8 is the major version, the high nibble of byte 9 the minor.
    let version = (header[8], header[9] >> 4);
    let device_class = signature(&header[12..16]);
    let color_space = signature(&header[16..20]);
    let num_components = match color_space.as_str() {
        "GRAY" => Some(1),
        "RGB" | "Lab" | "XYZ" | "Luv" | "YCbr" | "Yxy" | "HSV" | "HLS" | "CMY" => Some(3),
        "CMYK" => Some(4),
        s if s.len() == 4 && s.ends_with("CLR") => {
            // "2CLR" .. "FCLR"
            u32::from_str_radix(&s[..1], 16).ok()
        }
        _ => None,
    };

    Some(IccProfile {
        size,
        version,
        device_class,
        color_space,
        num_components,
    })
}
