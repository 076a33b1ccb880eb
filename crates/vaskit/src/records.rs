//! Lenient CSV reading for tool output.

/// Parse `raw` as CSV rows of varying width.
///
/// Blank lines are skipped by the reader. Records that fail to parse are
/// logged and skipped.
pub fn read(raw: &str, skip_header: bool) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(skip_header)
        .flexible(true)
        .from_reader(raw.as_bytes());

    reader
        .records()
        .filter_map(|record| match record {
            Ok(record) => Some(record.iter().map(str::to_string).collect()),
            Err(e) => {
                log::warn!("skipping unreadable CSV record: {e}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_flexible_rows() {
        let rows = read("a,b\n\n\"c,d\",e,f\n", false);
        assert_eq!(rows, [vec!["a", "b"], vec!["c,d", "e", "f"]]);
    }

    #[test]
    fn test_read_skips_header() {
        let rows = read("h1,h2\nx,y\n", true);
        assert_eq!(rows, [vec!["x", "y"]]);
        assert!(read("h1,h2\n", true).is_empty());
    }
}
