//! CSV records format
//!
//! Header: `project_id,wbs,name,<amount>...`. Header names are matched
//! case-insensitively; every column other than the three identifiers is an
//! amount parsed as a decimal. Empty amount cells are omitted.

use rust_decimal::Decimal;
use std::collections::HashSet;
use std::io::Read;
use std::str::FromStr;

use wbsync_reconcile::model::FinancialRecord;

use super::{RecordSet, RejectedRow};
use crate::error::{CliError, CliResult};

const PROJECT_ID: &str = "project_id";
const WBS: &str = "wbs";
const NAME: &str = "name";

struct Layout {
    project_id: usize,
    wbs: usize,
    name: usize,
    amounts: Vec<(usize, String)>,
}

impl Layout {
    fn from_headers(headers: &csv::StringRecord) -> CliResult<Self> {
        let mut seen = HashSet::new();
        for header in headers.iter() {
            if header.is_empty() {
                return Err(CliError::Validation(
                    "CSV header contains an empty column name".to_string(),
                ));
            }
            if !seen.insert(header.to_ascii_lowercase()) {
                return Err(CliError::Validation(format!(
                    "CSV header contains duplicate column '{}'",
                    header
                )));
            }
        }

        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| {
                    CliError::Validation(format!("CSV header is missing column '{}'", name))
                })
        };
        let project_id = find(PROJECT_ID)?;
        let wbs = find(WBS)?;
        let name = find(NAME)?;

        let amounts = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| ![project_id, wbs, name].contains(i))
            .map(|(i, h)| (i, h.to_string()))
            .collect();

        Ok(Self {
            project_id,
            wbs,
            name,
            amounts,
        })
    }

    fn record(&self, row: &csv::StringRecord) -> Result<FinancialRecord, String> {
        let cell = |i: usize| row.get(i).unwrap_or_default();
        let mut record =
            FinancialRecord::new(cell(self.project_id), cell(self.wbs), cell(self.name));

        for (i, column) in &self.amounts {
            let value = cell(*i);
            if value.is_empty() {
                continue;
            }
            let amount = parse_amount(value)
                .ok_or_else(|| format!("invalid amount '{}' in column '{}'", value, column))?;
            record.amounts.insert(column.clone(), amount);
        }
        Ok(record)
    }
}

fn parse_amount(value: &str) -> Option<Decimal> {
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

/// Parse CSV records from a reader.
///
/// A malformed header fails the whole file; a malformed row is rejected with
/// its line number and parsing continues.
pub fn parse_records<R: Read>(reader: R) -> CliResult<RecordSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let layout = Layout::from_headers(rdr.headers()?)?;
    let mut set = RecordSet::default();

    for result in rdr.records() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                set.rejected.push(RejectedRow::new(format!("line {}", line), e.to_string()));
                continue;
            }
        };
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        match layout.record(&row) {
            Ok(record) => set.records.push(record),
            Err(message) => set
                .rejected
                .push(RejectedRow::new(format!("line {}", line), message)),
        }
    }

    Ok(set)
}
