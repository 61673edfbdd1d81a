// ipsift - core/tabular.rs
//
// Row sources (named columns + string rows) and quick-mode extraction over
// them. CSV content is read with the `csv` crate; pipe-delimited text tables
// and inferred tables are converted into the same shape.

use crate::core::classify::{self, classify_column};
use crate::core::dedup::RecordSet;
use crate::core::mixed;
use crate::core::model::{ColumnType, ExtractMode, InferredTable};
use crate::util::constants;
use crate::util::error::SourceError;

/// Ordered column names plus rows of string cells.
///
/// Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowSource {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RowSource {
    /// Build a source, padding or truncating rows to the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(String::as_str).unwrap_or(""))
    }

    /// Classify every column from its sample values.
    pub fn column_types(&self) -> Vec<ColumnType> {
        (0..self.column_count())
            .map(|i| classify_column(self.column_values(i)))
            .collect()
    }
}

impl From<&InferredTable> for RowSource {
    fn from(table: &InferredTable) -> Self {
        let headers = (0..table.column_count()).map(|i| table.header(i)).collect();
        Self::new(headers, table.rows.clone())
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse CSV content with a header row. Cells are trimmed; ragged rows are
/// accepted and normalised to the header width.
pub fn parse_csv(content: &str) -> Result<RowSource, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| SourceError::Csv { source: e })?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(SourceError::NoColumns);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| SourceError::Csv { source: e })?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RowSource::new(headers, rows))
}

/// Parse a `|`-delimited text table.
///
/// The first line with more than one non-empty part becomes the header;
/// later lines are rows only when they have exactly as many parts.
pub fn parse_pipe_table(content: &str) -> Option<RowSource> {
    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for line in content.lines().filter(|l| l.contains('|')) {
        let parts: Vec<String> = line
            .split('|')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        match &headers {
            None if parts.len() > 1 => headers = Some(parts),
            Some(h) if parts.len() == h.len() => rows.push(parts),
            _ => {}
        }
    }

    match headers {
        Some(headers) if !rows.is_empty() => Some(RowSource::new(headers, rows)),
        _ => None,
    }
}

/// True when the header row looks like data (an address, `address:port` or
/// a port), meaning the content has no header row at all.
pub fn has_data_header(source: &RowSource) -> bool {
    source
        .headers
        .iter()
        .any(|h| classify::is_ip_port(h) || classify::is_ip(h) || classify::is_port(h))
}

/// Read tabular content: CSV first, then the pipe-table form when CSV
/// fails or produces a single column.
pub fn load_tabular(content: &str) -> Result<RowSource, SourceError> {
    match parse_csv(content) {
        Ok(source) if source.column_count() > 1 => Ok(source),
        Ok(source) => match parse_pipe_table(content) {
            Some(piped) => {
                tracing::debug!(columns = piped.column_count(), "Using pipe-table layout");
                Ok(piped)
            }
            None => Ok(source),
        },
        Err(e) => match parse_pipe_table(content) {
            Some(piped) => {
                tracing::debug!(error = %e, "CSV parse failed; using pipe-table layout");
                Ok(piped)
            }
            None => Err(e),
        },
    }
}

// =============================================================================
// Column selection and extraction
// =============================================================================

fn header_has_keyword(header: &str, keywords: &[&str]) -> bool {
    let lowered = header.to_lowercase();
    keywords.iter().any(|k| lowered.contains(k))
}

/// The columns quick extraction reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRoles {
    pub address: usize,
    pub address_type: ColumnType,
    pub port: Option<usize>,
}

/// Locate the address column and, if any, the port column.
///
/// Address: the first column whose sample holds addresses, else the first
/// column with an address-like header. Port: the first column with a
/// port-like header, else the first other column classified as PORT.
pub fn detect_columns(source: &RowSource) -> Option<ColumnRoles> {
    let types = source.column_types();

    let address = types
        .iter()
        .position(ColumnType::holds_address)
        .or_else(|| {
            source
                .headers
                .iter()
                .position(|h| header_has_keyword(h, constants::ADDRESS_HEADER_KEYWORDS))
        })?;

    let port = source
        .headers
        .iter()
        .enumerate()
        .find(|(i, h)| *i != address && header_has_keyword(h, constants::PORT_HEADER_KEYWORDS))
        .map(|(i, _)| i)
        .or_else(|| {
            types
                .iter()
                .enumerate()
                .find(|(i, t)| *i != address && **t == ColumnType::Port)
                .map(|(i, _)| i)
        });

    let roles = ColumnRoles {
        address,
        address_type: types[address],
        port,
    };
    tracing::debug!(
        address = %source.headers[address],
        address_type = %roles.address_type,
        port = ?port.map(|p| &source.headers[p]),
        "Columns detected"
    );
    Some(roles)
}

/// Turn one row into a record according to the address column's type.
fn extract_row(
    row: &[String],
    roles: &ColumnRoles,
    mode: ExtractMode,
    default_port: Option<&str>,
) -> Option<String> {
    let value = row.get(roles.address)?.trim();
    if value.is_empty() {
        return None;
    }

    match roles.address_type {
        ColumnType::IpPort => match classify::split_ip_port(value) {
            Some((address, port)) => mode.render(address, Some(port), None),
            None => mixed::extract_mixed(value, mode, default_port),
        },
        ColumnType::Mixed => mixed::extract_mixed(value, mode, default_port),
        ColumnType::IpOnly => {
            if !mode.requires_port() {
                return mode.render(value, None, None);
            }
            let port_cell = roles
                .port
                .and_then(|p| row.get(p))
                .map(|p| p.trim())
                .filter(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));
            let port = port_cell.or(default_port);
            if port.is_none() {
                tracing::trace!(address = value, "Row has no port and no default port; dropped");
            }
            mode.render(value, Some(port?), None)
        }
        ColumnType::Port | ColumnType::Text => Some(value.to_string()),
    }
}

/// Quick extraction over a row source into the given record set.
///
/// Returns the number of rows that produced no record.
pub fn extract_rows(
    source: &RowSource,
    mode: ExtractMode,
    default_port: Option<&str>,
    records: &mut RecordSet,
) -> usize {
    let Some(roles) = detect_columns(source) else {
        tracing::warn!("Could not detect an address column");
        return source.rows.len();
    };

    let mut skipped = 0;
    for row in &source.rows {
        match extract_row(row, &roles, mode, default_port) {
            Some(record) => {
                records.insert(record);
            }
            None => skipped += 1,
        }
    }
    skipped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &RowSource, mode: ExtractMode, port: Option<&str>) -> Vec<String> {
        let mut set = RecordSet::new();
        extract_rows(source, mode, port, &mut set);
        set.into_sorted()
    }

    #[test]
    fn test_parse_csv_trims_and_pads() {
        let source = parse_csv("ip, port ,name\n1.2.3.4, 80 ,a\n5.6.7.8,443\n").unwrap();
        assert_eq!(source.headers, vec!["ip", "port", "name"]);
        assert_eq!(source.rows[0], vec!["1.2.3.4", "80", "a"]);
        assert_eq!(source.rows[1], vec!["5.6.7.8", "443", ""]);
    }

    #[test]
    fn test_pipe_table_fallback() {
        let content = "| host | port |\n| 1.1.1.1 | 53 |\n| 8.8.8.8 | 53 | extra |\n| 9.9.9.9 | 22 |\n";
        let source = load_tabular(content).unwrap();
        assert_eq!(source.headers, vec!["host", "port"]);
        // The three-part line does not match the header width.
        assert_eq!(source.rows.len(), 2);
        assert_eq!(source.rows[1], vec!["9.9.9.9", "22"]);
    }

    #[test]
    fn test_detect_columns_by_content_then_header() {
        let source = RowSource::new(
            vec!["name".into(), "addr".into(), "p".into()],
            vec![vec!["a".into(), "1.2.3.4".into(), "80".into()]],
        );
        let roles = detect_columns(&source).unwrap();
        assert_eq!(roles.address, 1);
        assert_eq!(roles.address_type, ColumnType::IpOnly);
        // No port header, so the PORT-typed column is used.
        assert_eq!(roles.port, Some(2));

        let by_header = RowSource::new(
            vec!["Host".into(), "Port".into()],
            vec![vec!["example.com".into(), "8443".into()]],
        );
        let roles = detect_columns(&by_header).unwrap();
        assert_eq!(roles.address, 0);
        assert_eq!(roles.address_type, ColumnType::Text);
        assert_eq!(roles.port, Some(1));
    }

    #[test]
    fn test_ip_only_column_uses_port_column_then_default() {
        let source = parse_csv("ip,port\n1.1.1.1,53\n2.2.2.2,\n3.3.3.3,abc\n").unwrap();
        assert_eq!(
            extract(&source, ExtractMode::IpSpacePort, None),
            vec!["1.1.1.1 53"]
        );
        assert_eq!(
            extract(&source, ExtractMode::IpPortRemark, Some("443")),
            vec!["1.1.1.1:53", "2.2.2.2:443", "3.3.3.3:443"]
        );
        assert_eq!(
            extract(&source, ExtractMode::IpOnly, None),
            vec!["1.1.1.1", "2.2.2.2", "3.3.3.3"]
        );
    }

    #[test]
    fn test_ip_port_and_mixed_columns() {
        let source = parse_csv("endpoint\n1.1.1.1:80\n1.1.1.1:80\n2.2.2.2:22\n").unwrap();
        assert_eq!(
            extract(&source, ExtractMode::IpSpacePort, None),
            vec!["1.1.1.1 80", "2.2.2.2 22"]
        );

        let mixed = parse_csv("note\nnode 9.9.9.9 fast\nnode 8.8.8.8:53\n").unwrap();
        assert_eq!(
            extract(&mixed, ExtractMode::IpPortRemark, None),
            vec!["8.8.8.8:53"]
        );
        assert_eq!(
            extract(&mixed, ExtractMode::IpPortRemark, Some("443")),
            vec!["8.8.8.8:53", "9.9.9.9:443"]
        );
    }

    #[test]
    fn test_ip_port_column_malformed_cells_use_mixed_rules() {
        let source = parse_csv("endpoint\n1.1.1.1:80\nbad:\n1.1.1.1:80:90\n").unwrap();
        let mut set = RecordSet::new();
        let skipped = extract_rows(&source, ExtractMode::IpSpacePort, None, &mut set);
        assert_eq!(set.into_sorted(), vec!["1.1.1.1 80"]);
        assert_eq!(skipped, 1);

        let source = parse_csv("endpoint\n2.2.2.2:22\nbad:\nnote 3.3.3.3 x\n").unwrap();
        assert_eq!(
            extract(&source, ExtractMode::IpSpacePort, Some("443")),
            vec!["2.2.2.2 22", "3.3.3.3 443"]
        );
    }

    #[test]
    fn test_data_header_detection() {
        let headerless = parse_csv("1.2.3.4,80\n5.6.7.8,443\n").unwrap();
        assert!(has_data_header(&headerless));
        let endpoints = parse_csv("9.9.9.9:22,HK\n").unwrap();
        assert!(has_data_header(&endpoints));
        let named = parse_csv("ip,port\n1.2.3.4,80\n").unwrap();
        assert!(!has_data_header(&named));
    }

    #[test]
    fn test_text_address_column_emitted_verbatim() {
        let source = parse_csv("host\nexample.com\n\nother.net\n").unwrap();
        assert_eq!(
            extract(&source, ExtractMode::IpSpacePort, None),
            vec!["example.com", "other.net"]
        );
    }

    #[test]
    fn test_no_address_column() {
        let source = parse_csv("name,score\na,1\n").unwrap();
        assert!(detect_columns(&source).is_none());
        let mut set = RecordSet::new();
        assert_eq!(extract_rows(&source, ExtractMode::IpOnly, None, &mut set), 1);
        assert!(set.is_empty());
    }

    #[test]
    fn test_from_inferred_table() {
        let table = crate::core::table::infer_table(&["1.2.3.4,80", "5.6.7.8,443"]).unwrap();
        let source = RowSource::from(&table);
        assert_eq!(source.headers, vec!["column 1 (IP_ONLY)", "column 2 (PORT)"]);
        assert_eq!(
            extract(&source, ExtractMode::IpPortRemark, None),
            vec!["1.2.3.4:80", "5.6.7.8:443"]
        );
    }
}
