use calamine::{open_workbook_auto, DataType, Range, Reader};

use crate::dashboard::io_common::{
    assemble_row, header_cell, map_header, raw_cell, simplify_file_name,
};
use crate::dashboard::*;

/// Reads the responses of a spreadsheet (xlsx, xls or ods). The first row of
/// the worksheet is the header.
pub fn read_excel_rows(path: &str, worksheet_name: Option<&str>) -> DashResult<Vec<RawRow>> {
    let wrange = get_range(path, worksheet_name)?;

    let mut iter = wrange.rows();
    let header: Vec<Option<String>> = iter
        .next()
        .context(EmptyExcelSnafu { path })?
        .iter()
        .map(header_cell)
        .collect();
    let names = map_header(&header);
    debug!("read_excel_rows: header: {:?} -> {:?}", header, names);

    let mut res: Vec<RawRow> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let cells: Vec<RawValue> = row.iter().map(raw_cell).collect();
        match assemble_row(&names, cells) {
            Some(r) => res.push(r),
            None => debug!("read_excel_rows: idx {}: blank row", idx),
        }
    }
    info!(
        "read_excel_rows: {}: {} rows",
        simplify_file_name(path),
        res.len()
    );
    Ok(res)
}

fn get_range(path: &str, worksheet_name_o: Option<&str>) -> DashResult<Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, worksheet_name_o
    );
    let mut workbook = open_workbook_auto(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                path,
                worksheet_name,
            })?
            .context(OpeningExcelSnafu { path })
    } else {
        workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })
    }
}
