//! Lenient parsing of KML `<coordinates>` text.
//!
//! A malformed component never aborts extraction: it becomes `NaN` and the
//! remaining components and tuples are still read.

use crate::model::{LatLon, Position};

/// Parses the longest leading decimal number of `text`, ignoring leading
/// whitespace. Returns `NaN` when no digits are found.
///
/// `"10.5"` → `10.5`, `"  -3e2m"` → `-300.0`, `"abc"` → `NaN`.
pub fn parse_lenient(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return f64::NAN;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}

/// Parses one `lon,lat[,alt]` tuple. A missing altitude is 0; a missing
/// latitude is `NaN`.
pub fn parse_position(text: &str) -> Position {
    let mut parts = text.trim().split(',');
    let lon = parts.next().map(parse_lenient).unwrap_or(f64::NAN);
    let lat = parts.next().map(parse_lenient).unwrap_or(f64::NAN);
    let alt = parts.next().map(parse_lenient).unwrap_or(0.0);
    Position { lat, lon, alt }
}

/// Parses whitespace-separated `lon,lat[,alt]` tuples, keeping document order.
/// Altitudes are dropped.
pub fn parse_path(text: &str) -> Vec<LatLon> {
    text.split_whitespace()
        .map(|tuple| {
            let p = parse_position(tuple);
            LatLon {
                lat: p.lat,
                lon: p.lon,
            }
        })
        .collect()
}
