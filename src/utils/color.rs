//! Hex color parsing for the named color table

use crate::error::{ConvertError, Result};

/// Parse a `#RRGGBB` string into an RGB triple
pub fn parse_hex(text: &str) -> Result<[u8; 3]> {
    let invalid = || ConvertError::InvalidColor(text.to_string());

    let digits = text.strip_prefix('#').ok_or_else(invalid)?;
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let value = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;
    Ok([
        (value >> 16) as u8,
        (value >> 8 & 0xff) as u8,
        (value & 0xff) as u8,
    ])
}

/// Format an RGB triple as an uppercase `#RRGGBB` string
pub fn format_hex(rgb: [u8; 3]) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#FF0A10").unwrap(), [255, 10, 16]);
        assert_eq!(parse_hex("#ff0a10").unwrap(), [255, 10, 16]);
        assert_eq!(parse_hex("#000000").unwrap(), [0, 0, 0]);
    }

    #[test]
    fn test_parse_hex_invalid() {
        for text in ["FF0A10", "#FF0A1", "#FF0A100", "#GG0000", "", "#"] {
            assert!(parse_hex(text).is_err(), "{text:?} should not parse");
        }
    }

    #[test]
    fn test_format_roundtrip() {
        assert_eq!(format_hex([255, 10, 16]), "#FF0A10");
        assert_eq!(parse_hex(&format_hex([1, 2, 3])).unwrap(), [1, 2, 3]);
    }
}
