//! G-code number formatting
//!
//! Motion coordinates and arc offsets are written with three decimals,
//! extrusion amounts with five. Feed rates, spindle speeds and temperatures
//! are whole numbers.

/// Format a coordinate or arc centre offset (`53.000`).
pub fn format_coord(value: f64) -> String {
    strip_negative_zero(format!("{:.3}", value))
}

/// Format an extrusion amount (`1.23456`).
pub fn format_extrusion(value: f64) -> String {
    strip_negative_zero(format!("{:.5}", value))
}

/// Format a feed rate in mm/min (`800`).
pub fn format_feed(value: f64) -> String {
    strip_negative_zero(format!("{:.0}", value))
}

/// Format a spindle speed or temperature (`12000`).
pub fn format_whole(value: f64) -> String {
    strip_negative_zero(format!("{:.0}", value))
}

/// Tiny negative values round to `-0.000`; print those as plain zero.
fn strip_negative_zero(text: String) -> String {
    let is_zero = text
        .strip_prefix('-')
        .is_some_and(|rest| rest.chars().all(|c| c == '0' || c == '.'));
    if is_zero {
        text[1..].to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_coord() {
        assert_eq!(format_coord(53.0), "53.000");
        assert_eq!(format_coord(-28.12345), "-28.123");
        assert_eq!(format_coord(-0.0000001), "0.000");
        assert_eq!(format_coord(-0.0004), "0.000");
    }

    #[test]
    fn test_format_extrusion() {
        assert_eq!(format_extrusion(1.234567), "1.23457");
        assert_eq!(format_extrusion(0.0), "0.00000");
    }

    #[test]
    fn test_format_feed_and_whole() {
        assert_eq!(format_feed(800.0), "800");
        assert_eq!(format_feed(2999.6), "3000");
        assert_eq!(format_whole(12000.0), "12000");
    }
}
