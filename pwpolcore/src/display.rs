use chrono::DateTime;

/// Render a unix timestamp as a calendar date, the way policy timestamps
/// are presented to administrators; absent or unrepresentable values
/// render as an empty string.
pub fn format_timestamp(ts: Option<i64>) -> String {
    ts.and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::format_timestamp;

    #[test]
    fn smoke() {
        assert_eq!(format_timestamp(Some(1234567890)), "2009-02-13");
        assert_eq!(format_timestamp(None), "");
        assert_eq!(format_timestamp(Some(i64::MAX)), "");
    }
}
