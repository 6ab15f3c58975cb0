//! Parsers for the human-readable byte sizes and time values accepted by
//! dynamic settings, e.g. `512kb` or `30s`.

use std::time::Duration;

const BYTE_UNITS: [(&str, u64); 6] = [
    ("pb", 1 << 50),
    ("tb", 1 << 40),
    ("gb", 1 << 30),
    ("mb", 1 << 20),
    ("kb", 1 << 10),
    ("b", 1),
];

// `ms` must be tried before `s` and `m`.
const TIME_UNITS: [(&str, u64); 5] = [
    ("ms", 1),
    ("s", 1_000),
    ("m", 60_000),
    ("h", 3_600_000),
    ("d", 86_400_000),
];

/// Parses `10b`, `512kb`, `1mb`, ... into a byte count. A bare number is
/// read as bytes.
pub fn parse_byte_size(raw: &str) -> std::result::Result<u64, String> {
    let value = raw.trim().to_ascii_lowercase();
    if value.is_empty() {
        return Err("empty byte size".to_string());
    }
    if let Ok(bytes) = value.parse::<u64>() {
        return Ok(bytes);
    }

    for (suffix, multiplier) in BYTE_UNITS {
        if let Some(number) = value.strip_suffix(suffix) {
            let number: u64 = number
                .trim()
                .parse()
                .map_err(|e| format!("invalid number in [{raw}]: {e}"))?;
            return number
                .checked_mul(multiplier)
                .ok_or_else(|| format!("byte size [{raw}] overflows"));
        }
    }
    Err(format!("unknown byte size unit in [{raw}]"))
}

/// Parses `100ms`, `30s`, `5m`, `1h`, `1d` into a [`Duration`].
pub fn parse_time_value(raw: &str) -> std::result::Result<Duration, String> {
    let value = raw.trim().to_ascii_lowercase();
    if value.is_empty() {
        return Err("empty time value".to_string());
    }

    for (suffix, millis) in TIME_UNITS {
        if let Some(number) = value.strip_suffix(suffix) {
            if let Ok(number) = number.trim().parse::<u64>() {
                return number
                    .checked_mul(millis)
                    .map(Duration::from_millis)
                    .ok_or_else(|| format!("time value [{raw}] overflows"));
            }
        }
    }
    Err(format!(
        "failed to parse [{raw}], expected a number with a unit of ms, s, m, h or d"
    ))
}

pub fn format_byte_size(bytes: u64) -> String {
    format!("{bytes}b")
}

pub fn format_time_value(duration: Duration) -> String {
    format!("{}ms", duration.as_millis())
}
