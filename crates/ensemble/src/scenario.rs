//! Scenario label handling.

/// Compact code for a scenario label, used in output names.
///
/// Keeps ASCII letters and digits only: `"4.5"` becomes `"45"`.
pub fn rcp_code(label: &str) -> String {
    label.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_decimal_point() {
        assert_eq!(rcp_code("2.6"), "26");
        assert_eq!(rcp_code("4.5"), "45");
        assert_eq!(rcp_code("8.5"), "85");
    }

    #[test]
    fn plain_codes_unchanged() {
        assert_eq!(rcp_code("45"), "45");
        assert_eq!(rcp_code(" 6.0 "), "60");
    }
}
