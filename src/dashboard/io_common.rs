// Primitives shared by the spreadsheet and CSV readers.

use calamine::DataType;

use survey_analytics::normalizer::serial_to_datetime;

use crate::dashboard::*;

const EXACT_FIELDS: [&str; 10] = [
    FIELD_DATE,
    FIELD_TIMESTAMP,
    FIELD_CUSTOMER_ID,
    "Food Quality",
    "Service Quality",
    "Hygiene",
    "Value for Money",
    FIELD_OVERALL_SATISFACTION,
    FIELD_COMMENTS,
    FIELD_NPS_SCORE,
];

/// Maps a column header to the name of a recognized field.
///
/// The exact names are tried first (ignoring case), then the loose rules: any
/// header containing `date` is a date, `customer` and `id` is the customer id, etc.
pub fn canonical_field_name(header: &str) -> Option<&'static str> {
    let h = header.trim();
    if let Some(name) = EXACT_FIELDS.iter().find(|f| f.eq_ignore_ascii_case(h)) {
        return Some(*name);
    }
    let l = h.to_lowercase();
    let has = |s: &str| l.contains(s);
    if has("timestamp") {
        Some(FIELD_TIMESTAMP)
    } else if has("date") {
        Some(FIELD_DATE)
    } else if has("customer") && has("id") {
        Some(FIELD_CUSTOMER_ID)
    } else if has("food") && has("quality") {
        Some(Attribute::FoodQuality.label())
    } else if has("service") && has("quality") {
        Some(Attribute::ServiceQuality.label())
    } else if has("hygiene") {
        Some(Attribute::Hygiene.label())
    } else if has("value") && has("money") {
        Some(Attribute::ValueForMoney.label())
    } else if has("overall") && has("satisfaction") {
        Some(FIELD_OVERALL_SATISFACTION)
    } else if has("comment") {
        Some(FIELD_COMMENTS)
    } else if has("nps") {
        Some(FIELD_NPS_SCORE)
    } else {
        None
    }
}

/// Maps each column of a header row to a field name. When several columns map to
/// the same field, the leftmost one is used and the others are ignored.
pub fn map_header(header: &[Option<String>]) -> Vec<Option<&'static str>> {
    let mut seen: Vec<&'static str> = Vec::new();
    let mut res: Vec<Option<&'static str>> = Vec::new();
    for h in header.iter() {
        let name = h.as_deref().and_then(canonical_field_name);
        match name {
            Some(n) if seen.contains(&n) => {
                debug!("map_header: ignoring duplicate column {:?} for {:?}", h, n);
                res.push(None);
            }
            Some(n) => {
                seen.push(n);
                res.push(Some(n));
            }
            None => {
                if let Some(s) = h {
                    debug!("map_header: ignoring column {:?}", s);
                }
                res.push(None);
            }
        }
    }
    res
}

/// Assembles a row from its cells, following the mapping of the header.
pub fn assemble_row(names: &[Option<&'static str>], cells: Vec<RawValue>) -> Option<RawRow> {
    let mut row = RawRow::new();
    for (name_o, cell) in names.iter().zip(cells.into_iter()) {
        if let Some(name) = name_o {
            row.insert(name, cell);
        }
    }
    // Blank rows are not responses.
    if row.fields.values().all(|v| v.is_missing()) {
        None
    } else {
        Some(row)
    }
}

pub fn header_cell(cell: &DataType) -> Option<String> {
    match cell {
        DataType::String(s) => Some(s.clone()),
        DataType::Int(i) => Some(i.to_string()),
        DataType::Float(f) => Some(f.to_string()),
        _ => None,
    }
}

/// Converts a spreadsheet cell. Date cells are resolved here, numbers stay numbers.
pub fn raw_cell(cell: &DataType) -> RawValue {
    match cell {
        DataType::Int(i) => RawValue::Number(*i as f64),
        DataType::Float(f) => RawValue::Number(*f),
        DataType::String(s) => RawValue::Text(s.clone()),
        DataType::Bool(b) => RawValue::Bool(*b),
        DataType::DateTime(serial) => match serial_to_datetime(*serial) {
            Some(d) => RawValue::Date(d),
            None => RawValue::Number(*serial),
        },
        DataType::Empty => RawValue::Empty,
        _ => {
            warn!("raw_cell: could not understand cell {:?}", cell);
            RawValue::Empty
        }
    }
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_and_loose_headers() {
        assert_eq!(canonical_field_name("Food Quality"), Some("Food Quality"));
        assert_eq!(canonical_field_name("nps score"), Some(FIELD_NPS_SCORE));
        assert_eq!(canonical_field_name("Survey Date"), Some(FIELD_DATE));
        assert_eq!(canonical_field_name("Timestamp"), Some(FIELD_TIMESTAMP));
        assert_eq!(canonical_field_name("Customer_ID"), Some(FIELD_CUSTOMER_ID));
        assert_eq!(
            canonical_field_name("Rate the quality of the food"),
            Some("Food Quality")
        );
        assert_eq!(
            canonical_field_name("Value for money?"),
            Some("Value for Money")
        );
        assert_eq!(canonical_field_name("Any comments?"), Some(FIELD_COMMENTS));
        assert_eq!(canonical_field_name("Table number"), None);
    }

    #[test]
    fn duplicate_columns_keep_the_first() {
        let header = vec![
            Some("Date".to_string()),
            None,
            Some("Visit date".to_string()),
            Some("Hygiene".to_string()),
        ];
        assert_eq!(
            map_header(&header),
            vec![Some(FIELD_DATE), None, None, Some("Hygiene")]
        );
    }

    #[test]
    fn blank_rows_are_skipped() {
        let names = vec![Some(FIELD_COMMENTS), None];
        let blank = vec![RawValue::from(" "), RawValue::from("ignored")];
        assert_eq!(assemble_row(&names, blank), None);
        let row = assemble_row(&names, vec![RawValue::from("ok")]).unwrap();
        assert_eq!(row.get(FIELD_COMMENTS), Some(&RawValue::from("ok")));
    }

    #[test]
    fn date_cells() {
        let v = raw_cell(&DataType::DateTime(45292.0));
        assert_eq!(
            v,
            RawValue::Date(
                chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            )
        );
        assert_eq!(raw_cell(&DataType::Int(4)), RawValue::Number(4.0));
        assert_eq!(raw_cell(&DataType::Empty), RawValue::Empty);
    }
}
