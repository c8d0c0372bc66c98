//! Color parsing utilities
//!
//! Accepts hex notation (`#RRGGBB`, `#RGB`), comma-separated channel triples
//! (`255,128,0`) and the basic W3C color keywords.

use crate::error::{EffectError, Result};
use crate::types::Color;

/// Basic W3C color keywords plus a few common extended names
const NAMED_COLORS: &[(&str, Color)] = &[
    ("black", Color::new(0, 0, 0)),
    ("silver", Color::new(192, 192, 192)),
    ("gray", Color::new(128, 128, 128)),
    ("grey", Color::new(128, 128, 128)),
    ("white", Color::new(255, 255, 255)),
    ("maroon", Color::new(128, 0, 0)),
    ("red", Color::new(255, 0, 0)),
    ("purple", Color::new(128, 0, 128)),
    ("fuchsia", Color::new(255, 0, 255)),
    ("magenta", Color::new(255, 0, 255)),
    ("green", Color::new(0, 128, 0)),
    ("lime", Color::new(0, 255, 0)),
    ("olive", Color::new(128, 128, 0)),
    ("yellow", Color::new(255, 255, 0)),
    ("navy", Color::new(0, 0, 128)),
    ("blue", Color::new(0, 0, 255)),
    ("teal", Color::new(0, 128, 128)),
    ("aqua", Color::new(0, 255, 255)),
    ("cyan", Color::new(0, 255, 255)),
    ("orange", Color::new(255, 165, 0)),
    ("pink", Color::new(255, 192, 203)),
    ("gold", Color::new(255, 215, 0)),
    ("brown", Color::new(165, 42, 42)),
];

/// Utility for parsing colors from user input
pub struct ColorParser;

impl ColorParser {
    /// Parse any supported color notation
    ///
    /// # Examples
    /// ```rust
    /// use socialfx::{utils::ColorParser, Color};
    ///
    /// assert_eq!(ColorParser::parse("yellow").unwrap(), Color::YELLOW);
    /// assert_eq!(ColorParser::parse("#f00").unwrap(), Color::RED);
    /// assert_eq!(ColorParser::parse("0, 0, 255").unwrap(), Color::BLUE);
    /// ```
    ///
    /// # Errors
    /// - Unknown color name or malformed notation
    pub fn parse(input: &str) -> Result<Color> {
        let trimmed = input.trim();
        if trimmed.starts_with('#') {
            return Self::parse_hex(trimmed);
        }
        if trimmed.contains(',') {
            return Self::parse_triple(trimmed);
        }
        if let Some(color) = Self::parse_name(trimmed) {
            return Ok(color);
        }
        if Self::is_valid_hex(trimmed) {
            return Self::parse_hex(trimmed);
        }
        Err(EffectError::invalid_parameter(format!(
            "Unknown color '{trimmed}' (use a W3C color name, #RRGGBB or r,g,b)"
        )))
    }

    /// Parse a hex color, with or without the `#` prefix
    ///
    /// # Errors
    /// - Wrong length or non-hex digits
    pub fn parse_hex(hex: &str) -> Result<Color> {
        let hex = hex.trim_start_matches('#');
        if !Self::is_valid_hex(hex) {
            return Err(EffectError::invalid_parameter(format!(
                "Color '{hex}' must be in #RRGGBB or #RGB format"
            )));
        }

        let digits: Vec<u8> = hex
            .chars()
            .filter_map(|c| c.to_digit(16))
            .map(|d| d as u8)
            .collect();

        match digits.as_slice() {
            [r1, r2, g1, g2, b1, b2] => Ok(Color::new(r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2)),
            [r, g, b] => Ok(Color::new(r * 17, g * 17, b * 17)),
            _ => Err(EffectError::invalid_parameter(
                "Color must be in #RRGGBB or #RGB format",
            )),
        }
    }

    /// Parse an `r,g,b` channel triple
    ///
    /// # Errors
    /// - Not exactly three components, or a component outside `0..=255`
    pub fn parse_triple(input: &str) -> Result<Color> {
        let channels = input
            .split(',')
            .map(|part| {
                part.trim().parse::<u8>().map_err(|_| {
                    EffectError::invalid_parameter(format!(
                        "Color channel '{}' must be an integer in 0..=255",
                        part.trim()
                    ))
                })
            })
            .collect::<Result<Vec<u8>>>()?;

        match channels.as_slice() {
            &[r, g, b] => Ok(Color::new(r, g, b)),
            other => Err(EffectError::invalid_parameter(format!(
                "Color triple needs 3 channels, got {}",
                other.len()
            ))),
        }
    }

    /// Look up a color keyword, case-insensitively
    #[must_use]
    pub fn parse_name(name: &str) -> Option<Color> {
        let name = name.trim().to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(keyword, _)| *keyword == name)
            .map(|(_, color)| *color)
    }

    /// Validate hex color format without parsing
    #[must_use]
    pub fn is_valid_hex(hex: &str) -> bool {
        let hex = hex.trim_start_matches('#');
        (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6_digit() {
        assert_eq!(ColorParser::parse_hex("#ffffff").unwrap(), Color::WHITE);
        assert_eq!(ColorParser::parse_hex("#ff0080").unwrap(), Color::new(255, 0, 128));
        assert_eq!(ColorParser::parse_hex("0000ff").unwrap(), Color::BLUE);
    }

    #[test]
    fn test_parse_hex_3_digit() {
        assert_eq!(ColorParser::parse_hex("#fff").unwrap(), Color::WHITE);
        assert_eq!(ColorParser::parse_hex("#f00").unwrap(), Color::RED);
    }

    #[test]
    fn test_invalid_hex() {
        assert!(ColorParser::parse_hex("#ff").is_err());
        assert!(ColorParser::parse_hex("#gggggg").is_err());
        assert!(!ColorParser::is_valid_hex("#12345"));
    }

    #[test]
    fn test_names_follow_w3c() {
        assert_eq!(ColorParser::parse("Yellow").unwrap(), Color::YELLOW);
        assert_eq!(ColorParser::parse("green").unwrap(), Color::new(0, 128, 0));
        assert_eq!(ColorParser::parse("lime").unwrap(), Color::new(0, 255, 0));
        assert!(ColorParser::parse("blurple").is_err());
    }

    #[test]
    fn test_triples() {
        assert_eq!(ColorParser::parse("10, 20,30").unwrap(), Color::new(10, 20, 30));
        assert!(ColorParser::parse("10,20").is_err());
        assert!(ColorParser::parse("10,20,300").is_err());
    }

    #[test]
    fn test_bare_hex_falls_back_after_names() {
        // "add" is not a color name, so it is read as #aadddd
        assert_eq!(ColorParser::parse("add").unwrap(), Color::new(0xaa, 0xdd, 0xdd));
    }
}
