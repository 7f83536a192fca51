// Primitives for reading CSV files.

use crate::dashboard::io_common::{assemble_row, map_header, simplify_file_name};
use crate::dashboard::*;

/// Reads a CSV file with a header row. All the cells are read as text.
pub fn read_csv_rows(path: &str) -> DashResult<Vec<RawRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let header: Vec<Option<String>> = rdr
        .headers()
        .context(CsvLineParseSnafu { lineno: 1_usize })?
        .iter()
        .map(|s| Some(s.to_string()))
        .collect();
    let names = map_header(&header);
    debug!("read_csv_rows: header: {:?} -> {:?}", header, names);

    let mut res: Vec<RawRow> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let cells: Vec<RawValue> = line.iter().map(RawValue::from).collect();
        match assemble_row(&names, cells) {
            Some(row) => res.push(row),
            None => debug!("read_csv_rows: lineno {}: blank row", lineno),
        }
    }
    info!(
        "read_csv_rows: {}: {} rows",
        simplify_file_name(path),
        res.len()
    );
    Ok(res)
}
