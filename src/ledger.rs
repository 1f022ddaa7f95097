// Ledger Loader - strict CSV ingestion of a bank statement
//
// The statement is loaded once at process start and held immutably for the
// process lifetime. Rows that fail Date/Amount parsing fail the whole load;
// there is no successful-rows-only mode.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// Date formats accepted in the statement, tried in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// One parsed statement row.
///
/// Date and Amount are coerced to typed values; every other column is kept
/// as raw text in original column order so the table can be re-serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: NaiveDate,
    pub amount: f64,
    pub category: String,

    /// Cells of all columns other than Date/Amount/Category, header order
    pub extras: Vec<String>,
}

/// The in-memory transaction table
#[derive(Debug, Clone)]
pub struct Ledger {
    headers: Vec<String>,
    date_idx: usize,
    amount_idx: usize,
    category_idx: usize,
    records: Vec<Record>,
}

impl Ledger {
    /// Load and clean a statement CSV.
    ///
    /// Requires `Date`, `Amount` and `Category` headers (any position, extra
    /// columns allowed). Fails if the file is missing, a required column is
    /// absent, or any cell in a required column cannot be coerced.
    pub fn load(path: &Path) -> Result<Ledger> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open statement file: {}", path.display()))?;

        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

        let headers: Vec<String> = reader
            .headers()
            .with_context(|| format!("Failed to read CSV headers from {}", path.display()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let date_idx = required_column(&headers, "Date")?;
        let amount_idx = required_column(&headers, "Amount")?;
        let category_idx = required_column(&headers, "Category")?;

        let mut records = Vec::new();

        for (line_num, result) in reader.records().enumerate() {
            // +2: 1-indexed plus header row
            let line = line_num + 2;
            let record = result.with_context(|| {
                format!("Failed to parse CSV line {} in {}", line, path.display())
            })?;

            let date_raw = record.get(date_idx).unwrap_or("").trim();
            let date = parse_date(date_raw)
                .with_context(|| format!("Line {}: unparsable Date '{}'", line, date_raw))?;

            let amount_raw = record.get(amount_idx).unwrap_or("").trim();
            let amount: f64 = amount_raw
                .parse()
                .map_err(|_| anyhow!("Line {}: non-numeric Amount '{}'", line, amount_raw))?;

            let category = record.get(category_idx).unwrap_or("").trim().to_string();

            let extras: Vec<String> = record
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != date_idx && *i != amount_idx && *i != category_idx)
                .map(|(_, cell)| cell.to_string())
                .collect();

            records.push(Record {
                date,
                amount,
                category,
                extras,
            });
        }

        Ok(Ledger {
            headers,
            date_idx,
            amount_idx,
            category_idx,
            records,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Serialize the full table back to CSV text for prompt embedding.
    ///
    /// Header row first, then one line per record in original column order.
    /// Dates render as ISO (YYYY-MM-DD), amounts in their shortest stable
    /// decimal form.
    pub fn to_csv_string(&self) -> String {
        let mut out = String::new();
        out.push_str(&join_csv_row(self.headers.iter().map(|h| h.clone())));
        out.push('\n');

        for record in &self.records {
            let mut extras = record.extras.iter();
            let cells = (0..self.headers.len()).map(|col| {
                if col == self.date_idx {
                    record.date.format("%Y-%m-%d").to_string()
                } else if col == self.amount_idx {
                    format!("{}", record.amount)
                } else if col == self.category_idx {
                    record.category.clone()
                } else {
                    extras.next().cloned().unwrap_or_default()
                }
            });
            out.push_str(&join_csv_row(cells));
            out.push('\n');
        }

        out
    }

    /// Group amounts by category and sum, sorted descending by total.
    /// Ties are broken by category name so the output is deterministic.
    pub fn summarize_by_category(&self) -> Vec<(String, f64)> {
        let mut totals: HashMap<String, f64> = HashMap::new();
        for record in &self.records {
            *totals.entry(record.category.clone()).or_insert(0.0) += record.amount;
        }

        let mut summary: Vec<(String, f64)> = totals.into_iter().collect();
        summary.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        summary
    }

    /// Keep rows within an inclusive date range.
    /// An absent bound is unbounded on that side.
    pub fn filter_by_date(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Ledger {
        let records = self
            .records
            .iter()
            .filter(|r| start.map_or(true, |s| r.date >= s))
            .filter(|r| end.map_or(true, |e| r.date <= e))
            .cloned()
            .collect();

        Ledger {
            headers: self.headers.clone(),
            date_idx: self.date_idx,
            amount_idx: self.amount_idx,
            category_idx: self.category_idx,
            records,
        }
    }
}

/// Find a required header, case-sensitive first then case-insensitive
fn required_column(headers: &[String], name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .or_else(|| headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
        .ok_or_else(|| anyhow!("Statement CSV is missing required column '{}'", name))
}

/// Parse a statement date, trying each accepted format in order
fn parse_date(raw: &str) -> Result<NaiveDate> {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Ok(date);
        }
    }
    Err(anyhow!("No accepted date format matched '{}'", raw))
}

/// Join cells into one CSV line, quoting only where needed
fn join_csv_row(cells: impl Iterator<Item = String>) -> String {
    cells
        .map(|cell| {
            if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
                format!("\"{}\"", cell.replace('"', "\"\""))
            } else {
                cell
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp csv");
        file.write_all(contents.as_bytes()).expect("write temp csv");
        file
    }

    const SAMPLE: &str = "\
Date,Description,Amount,Category
2024-01-10,Grocery Store,-10.00,Food
2024-01-12,Sandwich,-5.00,Food
2024-01-15,January Rent,-20.00,Rent
2024-02-01,Salary,1200.50,Income
";

    #[test]
    fn test_load_preserves_row_count_and_types() {
        let file = write_csv(SAMPLE);
        let ledger = Ledger::load(file.path()).unwrap();

        assert_eq!(ledger.len(), 4);
        assert_eq!(
            ledger.records()[0].date,
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
        );
        assert_eq!(ledger.records()[0].amount, -10.00);
        assert_eq!(ledger.records()[0].category, "Food");
        // Non-required columns survive as raw text
        assert_eq!(ledger.records()[0].extras, vec!["Grocery Store".to_string()]);
    }

    #[test]
    fn test_load_accepts_us_date_format() {
        let file = write_csv("Date,Amount,Category\n01/15/2024,-3.50,Food\n");
        let ledger = Ledger::load(file.path()).unwrap();

        assert_eq!(
            ledger.records()[0].date,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
    }

    #[test]
    fn test_load_fails_on_non_numeric_amount() {
        let file = write_csv("Date,Amount,Category\n2024-01-10,ten dollars,Food\n");
        let result = Ledger::load(file.path());

        assert!(result.is_err());
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("non-numeric Amount"));
        assert!(message.contains("ten dollars"));
    }

    #[test]
    fn test_load_fails_on_unparsable_date() {
        let file = write_csv("Date,Amount,Category\nyesterday,-3.50,Food\n");
        let result = Ledger::load(file.path());

        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("unparsable Date"));
    }

    #[test]
    fn test_load_fails_on_missing_category_column() {
        let file = write_csv("Date,Amount\n2024-01-10,-3.50\n");
        let result = Ledger::load(file.path());

        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("Category"));
    }

    #[test]
    fn test_load_fails_on_missing_file() {
        let result = Ledger::load(Path::new("no_such_statement.csv"));
        assert!(result.is_err());
    }

    #[test]
    fn test_to_csv_string_round_trips_header_order() {
        let file = write_csv(SAMPLE);
        let ledger = Ledger::load(file.path()).unwrap();
        let text = ledger.to_csv_string();

        assert_eq!(
            ledger.headers(),
            &["Date", "Description", "Amount", "Category"]
        );
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(ledger.headers().join(",").as_str()));
        assert_eq!(lines.next(), Some("2024-01-10,Grocery Store,-10,Food"));
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn test_to_csv_string_quotes_commas() {
        let file = write_csv("Date,Description,Amount,Category\n2024-01-10,\"Cafe, Downtown\",-4.25,Food\n");
        let ledger = Ledger::load(file.path()).unwrap();

        assert!(ledger.to_csv_string().contains("\"Cafe, Downtown\""));
    }

    #[test]
    fn test_summarize_by_category_descending() {
        let file = write_csv(
            "Date,Amount,Category\n\
             2024-01-10,10.00,Food\n\
             2024-01-11,5.00,Food\n\
             2024-01-12,20.00,Rent\n",
        );
        let ledger = Ledger::load(file.path()).unwrap();
        let summary = ledger.summarize_by_category();

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0], ("Rent".to_string(), 20.00));
        assert_eq!(summary[1], ("Food".to_string(), 15.00));
    }

    #[test]
    fn test_filter_by_date_start_only() {
        let file = write_csv(SAMPLE);
        let ledger = Ledger::load(file.path()).unwrap();

        let start = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let filtered = ledger.filter_by_date(Some(start), None);

        assert_eq!(filtered.len(), 2);
        // Inclusive: the row exactly on the bound stays
        assert_eq!(filtered.records()[0].date, start);
    }

    #[test]
    fn test_filter_by_date_both_bounds() {
        let file = write_csv(SAMPLE);
        let ledger = Ledger::load(file.path()).unwrap();

        let filtered = ledger.filter_by_date(
            Some(NaiveDate::from_ymd_opt(2024, 1, 11).unwrap()),
            Some(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()),
        );

        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_filter_by_date_unbounded_is_identity() {
        let file = write_csv(SAMPLE);
        let ledger = Ledger::load(file.path()).unwrap();

        assert_eq!(ledger.filter_by_date(None, None).len(), ledger.len());
    }
}
