//! Parse product catalog exports (CSV, TSV, semicolon CSV) into `(gtin, name)` rows.
//!
//! Exports come from spreadsheets and POS systems, so:
//!   - the delimiter varies and is sniffed from the first line
//!   - a header row is optional; when present it picks the GTIN and name columns
//!   - GTIN cells may carry spaces, dashes or a leading apostrophe

use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::io;
use std::path::Path;

use crate::types::{CatalogOptions, CatalogRow, IngestReport, MIN_GTIN_DIGITS};

const GTIN_HEADERS: &[&str] = &["gtin", "ean", "barcode", "upc", "code"];
const NAME_HEADERS: &[&str] = &["name", "product", "description", "title"];

fn digit_count(s: &str) -> usize {
    s.chars().filter(|c| c.is_ascii_digit()).count()
}

/// Pick the delimiter that shows up on the first line: tab, then `;`, then `,`.
pub fn detect_delimiter(text: &str) -> u8 {
    let first = text.lines().next().unwrap_or("");
    let tabs = first.matches('\t').count();
    let semis = first.matches(';').count();
    let commas = first.matches(',').count();

    if tabs > 0 {
        b'\t'
    } else if semis > commas {
        b';'
    } else {
        b','
    }
}

fn find_column(header: &csv::StringRecord, names: &[&str], skip: Option<usize>) -> Option<usize> {
    header.iter().enumerate().find_map(|(i, cell)| {
        if Some(i) == skip {
            return None;
        }
        let cell = cell.trim().to_lowercase();
        names.iter().any(|n| cell.contains(n)).then_some(i)
    })
}

fn is_header(record: &csv::StringRecord) -> bool {
    record.iter().all(|cell| digit_count(cell) < MIN_GTIN_DIGITS)
}

/// Parse catalog rows from any reader with a known delimiter.
pub fn parse_catalog_reader<R: io::Read>(reader: R, delimiter: u8) -> Result<IngestReport> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut report = IngestReport::default();
    let mut columns: Option<(usize, usize)> = None;

    for result in rdr.records() {
        let record = result.context("reading catalog record")?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }

        let (gtin_col, name_col) = match columns {
            Some(cols) => cols,
            None if is_header(&record) => {
                report.header_skipped = true;
                let gtin_col = find_column(&record, GTIN_HEADERS, None).unwrap_or(0);
                let name_col = find_column(&record, NAME_HEADERS, Some(gtin_col))
                    .unwrap_or(if gtin_col == 0 { 1 } else { 0 });
                debug!("catalog header {:?} -> gtin col {gtin_col}, name col {name_col}", record);
                columns = Some((gtin_col, name_col));
                continue;
            }
            None => {
                columns = Some((0, 1));
                (0, 1)
            }
        };

        let gtin = record
            .get(gtin_col)
            .unwrap_or("")
            .trim_start_matches('\'')
            .to_string();
        let name = record.get(name_col).unwrap_or("").to_string();

        if digit_count(&gtin) < MIN_GTIN_DIGITS || name.is_empty() {
            debug!("dropping catalog row {:?}", record);
            report.dropped += 1;
            continue;
        }

        report.rows.push(CatalogRow { gtin, name });
    }

    info!(
        "catalog: {} rows kept, {} dropped",
        report.rows.len(),
        report.dropped
    );
    Ok(report)
}

/// Parse catalog text already in memory.
pub fn parse_catalog_str(text: &str, options: &CatalogOptions) -> Result<IngestReport> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let delimiter = options.delimiter.unwrap_or_else(|| detect_delimiter(text));
    parse_catalog_reader(text.as_bytes(), delimiter)
}

/// Parse a catalog file from disk.
pub fn parse_catalog_csv(path: impl AsRef<Path>, options: &CatalogOptions) -> Result<IngestReport> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_catalog_str(&text, options).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("gtin\tname\n1\t2"), b'\t');
        assert_eq!(detect_delimiter("gtin;name,with comma;x"), b';');
        assert_eq!(detect_delimiter("gtin,name"), b',');
        assert_eq!(detect_delimiter(""), b',');
    }

    #[test]
    fn test_header_picks_columns() {
        let text = "Description,Price,EAN Code\nDates 500g,12.50,6297000001234\nCoffee,9.00,7311100005555\n";
        let report = parse_catalog_str(text, &CatalogOptions::default()).unwrap();
        assert!(report.header_skipped);
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].gtin, "6297000001234");
        assert_eq!(report.rows[0].name, "Dates 500g");
    }

    #[test]
    fn test_headerless_tsv() {
        let text = "6297000001234\tDates 500g\n'07311100005555\tCoffee\n";
        let report = parse_catalog_str(text, &CatalogOptions::default()).unwrap();
        assert!(!report.header_skipped);
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[1].gtin, "07311100005555");
    }

    #[test]
    fn test_short_gtins_and_blank_names_are_dropped() {
        let text = "gtin;name\n1234567;Too short\n6297000001234;\n629-700-000-1234;Dates\n";
        let report = parse_catalog_str(text, &CatalogOptions::default()).unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.dropped, 2);
        assert_eq!(report.products()[0].gtin(), "06297000001234");
    }

    #[test]
    fn test_bom_and_explicit_delimiter() {
        let text = "\u{feff}6297000001234|Dates\n";
        let opts = CatalogOptions { delimiter: Some(b'|') };
        let report = parse_catalog_str(text, &opts).unwrap();
        assert_eq!(report.rows, vec![CatalogRow { gtin: "6297000001234".into(), name: "Dates".into() }]);
    }

    #[test]
    fn test_parse_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "barcode,product name").unwrap();
        writeln!(f, "6297000001234,Dates 500g").unwrap();
        writeln!(f).unwrap();
        writeln!(f, "7311100005555,\"Coffee, ground\"").unwrap();

        let report = parse_catalog_csv(f.path(), &CatalogOptions::default()).unwrap();
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[1].name, "Coffee, ground");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = parse_catalog_csv("/definitely/not/here.csv", &CatalogOptions::default()).unwrap_err();
        assert!(err.to_string().contains("reading /definitely/not/here.csv"));
    }
}
