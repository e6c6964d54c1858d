pub const UNITS: [&str; 9] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB", "ZiB", "YiB"];
const K8S_UNITS: [&str; 7] = ["B", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei"];

/// Parses the leading decimal digits of `raw`, like the console does for
/// size strings coming from the API; anything unparsable counts as zero.
pub fn nice_bytes(raw: &str, k8s_units: bool) -> String {
    let digits: String = raw
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    nice_bytes_int(digits.parse().unwrap_or(0), k8s_units)
}

/// 1024-based size with one decimal, e.g. `2.0 KiB`.
pub fn nice_bytes_int(bytes: u64, k8s_units: bool) -> String {
    let mut value = bytes as f64;
    let mut unit = 0usize;
    while value >= 1024.0 {
        value /= 1024.0;
        unit += 1;
    }
    let label = if k8s_units {
        K8S_UNITS[unit.min(K8S_UNITS.len() - 1)]
    } else {
        UNITS[unit.min(UNITS.len() - 1)]
    };
    format!("{value:.1} {label}")
}

/// `92400` -> `1 day and 1 hour and 40 minutes`.
pub fn nice_time_from_seconds(seconds: u64) -> String {
    let parts = [
        (seconds / (3600 * 24), "day"),
        ((seconds % (3600 * 24)) / 3600, "hour"),
        ((seconds % 3600) / 60, "minute"),
        (seconds % 60, "second"),
    ];

    parts
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| {
            let plural = if *value == 1 { "" } else { "s" };
            format!("{value} {unit}{plural}")
        })
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Nanoseconds as seconds rounded to four decimals, e.g. `0.0015 s`.
pub fn ns_to_seconds(nanoseconds: f64) -> String {
    let seconds = nanoseconds * 0.000_000_001;
    let rounded = ((seconds + f64::EPSILON) * 10_000.0).round() / 10_000.0;
    format!("{rounded} s")
}

/// Thousands separators, e.g. `1,234,567`.
pub fn pretty_number(value: Option<u64>) -> String {
    let Some(value) = value else {
        return "0".to_string();
    };
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Short magnitude, e.g. `1.5K`, `2M`, `3.2B`.
pub fn representation_number(value: Option<u64>) -> String {
    let Some(value) = value else {
        return "0".to_string();
    };

    let (scaled, unit) = match value {
        1_000..=999_999 => (value as f64 / 1_000.0, "K"),
        1_000_000..=999_999_999 => (value as f64 / 1_000_000.0, "M"),
        v if v >= 1_000_000_000 => (value as f64 / 1_000_000_000.0, "B"),
        _ => return value.to_string(),
    };

    let mut text = format!("{scaled:.1}");
    if let Some(stripped) = text.strip_suffix(".0") {
        text = stripped.to_string();
    }
    format!("{text}{unit}")
}
