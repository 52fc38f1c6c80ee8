/// Unit multipliers accepted in `<digits> <unit>` report values.
pub fn unit_multiplier(unit: &str) -> Option<u64> {
    match unit {
        "B"  => Some(1),
        "KB" => Some(1 << 10),
        "MB" => Some(1 << 20),
        "GB" => Some(1 << 30),
        _    => None,
    }
}

/// Format a raw byte count the way report values are rendered: "512.00MB".
///
/// Divides by 1024 while the value is at least 1024, stepping through
/// "", K, M, G and falling back to T. Two decimals, standard rounding.
pub fn fmt_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in ["", "K", "M", "G"] {
        if value.abs() < 1024.0 {
            return format!("{:.2}{}B", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.2}TB", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_each_unit_tier() {
        assert_eq!(fmt_bytes(512), "512.00B");
        assert_eq!(fmt_bytes(2048), "2.00KB");
        assert_eq!(fmt_bytes(512 * 1024 * 1024), "512.00MB");
        assert_eq!(fmt_bytes(1 << 30), "1.00GB");
    }

    #[test]
    fn falls_back_to_terabytes() {
        assert_eq!(fmt_bytes(3 * (1u64 << 40)), "3.00TB");
        assert_eq!(fmt_bytes(1u64 << 50), "1024.00TB");
    }

    #[test]
    fn rounds_instead_of_truncating() {
        // 1.999 KiB
        assert_eq!(fmt_bytes(2047), "2.00KB");
    }

    #[test]
    fn knows_report_units() {
        assert_eq!(unit_multiplier("MB"), Some(1_048_576));
        assert_eq!(unit_multiplier("TB"), None);
        assert_eq!(unit_multiplier("mb"), None);
    }
}
