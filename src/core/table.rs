// ipsift - core/table.rs
//
// Table inference: raw lines -> delimiter inference -> row tokenizer ->
// column classifier. Core layer: works on borrowed text, never touches the
// filesystem.

use crate::core::classify::{self, classify_column};
use crate::core::delimiter::{infer_delimiter, split_fields};
use crate::core::model::InferredTable;
use crate::util::constants;

/// True for group-separator lines (`-----...`).
pub fn is_group_separator(line: &str) -> bool {
    line.starts_with(constants::GROUP_SEPARATOR_PREFIX)
}

/// Normalise raw input into inference lines: trimmed, non-empty, and without
/// group-separator lines.
pub fn raw_lines(content: &str) -> Vec<&str> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !is_group_separator(l))
        .collect()
}

/// Split one line on `delimiter` into fields.
///
/// Fields are trimmed and empty fields dropped. Any field that is exactly
/// `address:port` is expanded in place into two adjacent fields.
pub fn tokenize_line(line: &str, delimiter: &str) -> Vec<String> {
    let mut fields = Vec::new();
    for field in split_fields(line, delimiter) {
        match classify::split_ip_port(field) {
            Some((address, port)) => {
                fields.push(address.to_string());
                fields.push(port.to_string());
            }
            None => fields.push(field.to_string()),
        }
    }
    fields
}

/// Infer a fixed-width, column-tagged table from raw lines.
///
/// Lines are normalised with the same rules as [`raw_lines`] first, so
/// callers may pass unfiltered input. Returns `None` when no consistent
/// delimiter exists; callers fall back to record extraction in that case.
pub fn infer_table<S: AsRef<str>>(lines: &[S]) -> Option<InferredTable> {
    let lines: Vec<&str> = lines
        .iter()
        .map(|l| l.as_ref().trim())
        .filter(|l| !l.is_empty() && !is_group_separator(l))
        .collect();

    if lines.is_empty() {
        return None;
    }

    let candidate = infer_delimiter(&lines)?;
    let delimiter = candidate.delimiter;
    let field_count = candidate.field_count.unwrap_or_default();

    let mut rows: Vec<Vec<String>> = lines
        .iter()
        .map(|line| tokenize_line(line, delimiter))
        .filter(|row| !row.is_empty())
        .collect();

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut rows {
        row.resize(width, String::new());
    }

    let columns = (0..width)
        .map(|i| classify_column(rows.iter().map(|row| row[i].as_str())))
        .collect();

    let table = InferredTable {
        delimiter,
        field_count,
        rows,
        columns,
    };

    tracing::debug!(
        delimiter = ?delimiter,
        rows = table.rows.len(),
        columns = table.column_count(),
        tags = ?table.columns,
        "Table inferred"
    );

    Some(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::ColumnType;

    #[test]
    fn test_infer_simple_comma_table() {
        let table = infer_table(&["1.2.3.4,80", "5.6.7.8,443"]).unwrap();
        assert_eq!(table.delimiter, ",");
        assert_eq!(table.field_count, 2);
        assert_eq!(
            table.rows,
            vec![
                vec!["1.2.3.4".to_string(), "80".to_string()],
                vec!["5.6.7.8".to_string(), "443".to_string()],
            ]
        );
        assert_eq!(table.columns, vec![ColumnType::IpOnly, ColumnType::Port]);
    }

    #[test]
    fn test_ip_port_field_is_sub_split() {
        let table = infer_table(&["9.9.9.9:22\tHK\tfast", "8.8.8.8:53\tUS\tdns"]).unwrap();
        assert_eq!(table.delimiter, "\t");
        assert_eq!(table.field_count, 3);
        assert_eq!(table.rows[0], vec!["9.9.9.9", "22", "HK", "fast"]);
        assert_eq!(
            table.columns,
            vec![
                ColumnType::IpOnly,
                ColumnType::Port,
                ColumnType::Text,
                ColumnType::Text
            ]
        );
    }

    #[test]
    fn test_rows_padded_to_widest() {
        // Only the first row has a splittable ip:port, so it is one wider.
        let table = infer_table(&["1.1.1.1:80|a", "host|b"]).unwrap();
        assert_eq!(table.delimiter, "|");
        assert_eq!(table.column_count(), 3);
        assert!(table.rows.iter().all(|r| r.len() == 3));
        assert_eq!(table.rows[1], vec!["host", "b", ""]);
    }

    #[test]
    fn test_group_separators_and_blank_lines_ignored() {
        let table = infer_table(&["----- sheet1 -----", "", "  1.2.3.4,80  ", "5.6.7.8,443"]).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.delimiter, ",");
    }

    #[test]
    fn test_no_structure_returns_none() {
        assert!(infer_table(&["justoneword", "another"]).is_none());
        assert!(infer_table::<&str>(&[]).is_none());
        assert!(infer_table(&["-----", "   "]).is_none());
    }

    #[test]
    fn test_raw_lines_normalises_input() {
        let lines = raw_lines("  a \n\n----- x -----\nb\r\n");
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn test_tokenize_line_keeps_non_matching_fields() {
        assert_eq!(
            tokenize_line("1.2.3.4:8080 , note:x", ","),
            vec!["1.2.3.4", "8080", "note:x"]
        );
    }
}
