use log::{debug, warn};
use rand::Rng;

use std::ops::RangeInclusive;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::config::*;

// Days between the spreadsheet epoch (1899-12-30) and 1970-01-01.
const SERIAL_UNIX_EPOCH_OFFSET: f64 = 25569.0;
const MILLIS_PER_DAY: f64 = 86400.0 * 1000.0;
// Beyond this, a number cannot be a sensible serial date (year > 9999).
const MAX_SERIAL_DAYS: f64 = 2_958_465.0;

const NEUTRAL_RATING: u8 = 3;

// Free-text formats tried in order. The first one that parses wins.
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
];
const DATE_FORMATS: [&str; 7] = [
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Converts a spreadsheet serial day number into a timestamp.
///
/// The integer part counts days since 1899-12-30, the fractional part is the time of day.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial.abs() > MAX_SERIAL_DAYS {
        return None;
    }
    let millis = ((serial - SERIAL_UNIX_EPOCH_OFFSET) * MILLIS_PER_DAY).round() as i64;
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?.and_hms_opt(0, 0, 0)?;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

/// Best-effort parsing of a free-text date. Returns None for invalid dates.
pub fn parse_date_text(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS.iter() {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Interprets a date cell: native dates pass through, numbers (also when
/// written as text, as in CSV files) are serial days, anything else is parsed
/// as text.
pub fn parse_date(value: &RawValue) -> Option<NaiveDateTime> {
    match value {
        RawValue::Date(d) => Some(*d),
        RawValue::Number(serial) => serial_to_datetime(*serial),
        RawValue::Text(s) => match s.trim().parse::<f64>() {
            Ok(serial) => serial_to_datetime(serial),
            Err(_) => parse_date_text(s),
        },
        RawValue::Bool(_) | RawValue::Empty => None,
    }
}

// Reads the leading integer of a value: "4.7" -> 4, " 5 stars" -> 5, 4.7 -> 4.
fn parse_leading_int(value: &RawValue) -> Option<i64> {
    match value {
        RawValue::Number(x) if x.is_finite() => Some(x.trunc() as i64),
        RawValue::Text(s) => {
            let s = s.trim_start();
            let (sign, digits) = match s.strip_prefix('-') {
                Some(rest) => (-1, rest),
                None => (1, s.strip_prefix('+').unwrap_or(s)),
            };
            let num: String = digits.chars().take_while(|c| c.is_ascii_digit()).collect();
            num.parse::<i64>().ok().map(|x| sign * x)
        }
        _ => None,
    }
}

/// Parses an attribute rating. Anything that is not a number is a neutral 3,
/// numbers are clamped to [1, 5].
pub fn parse_rating(value: Option<&RawValue>) -> u8 {
    match value.and_then(parse_leading_int) {
        Some(x) => x.clamp(1, 5) as u8,
        None => NEUTRAL_RATING,
    }
}

/// Parses a supplied NPS score, clamped to [0, 10].
pub fn parse_nps(value: Option<&RawValue>) -> Option<u8> {
    value.and_then(parse_leading_int).map(|x| x.clamp(0, 10) as u8)
}

/// Classifies the free-text overall satisfaction.
///
/// The "highly" variants are tested first, and "dissatisfied" before
/// "satisfied", since the general labels are substrings of the specific ones.
pub fn parse_overall_satisfaction(value: Option<&RawValue>) -> Satisfaction {
    let text = match value {
        Some(v) if !v.is_missing() => raw_to_string(v).to_lowercase(),
        _ => return Satisfaction::Neutral,
    };
    let has = |needles: &[&str]| needles.iter().any(|n| text.contains(n));
    if has(&["highly satisfied", "excellent", "very satisfied"]) {
        Satisfaction::HighlySatisfied
    } else if has(&["highly dissatisfied", "terrible", "very poor"]) {
        Satisfaction::HighlyDissatisfied
    } else if has(&["dissatisfied", "poor"]) {
        Satisfaction::Dissatisfied
    } else if has(&["satisfied", "good"]) {
        Satisfaction::Satisfied
    } else {
        Satisfaction::Neutral
    }
}

/// The range of NPS scores consistent with a satisfaction level.
pub fn nps_range(satisfaction: Satisfaction) -> RangeInclusive<u8> {
    match satisfaction {
        Satisfaction::HighlySatisfied => 9..=10,
        Satisfaction::Satisfied => 7..=8,
        Satisfaction::Neutral => 5..=7,
        Satisfaction::Dissatisfied => 2..=4,
        Satisfaction::HighlyDissatisfied => 0..=1,
    }
}

/// Draws an NPS score for a response that did not provide one.
pub fn backfill_nps<R: Rng>(satisfaction: Satisfaction, rng: &mut R) -> u8 {
    rng.gen_range(nps_range(satisfaction))
}

/// Renders a cell as text, the way a spreadsheet would display it.
pub fn raw_to_string(value: &RawValue) -> String {
    match value {
        RawValue::Empty => "".to_string(),
        RawValue::Text(s) => s.clone(),
        RawValue::Number(x) if x.is_finite() && x.fract() == 0.0 => format!("{}", *x as i64),
        RawValue::Number(x) => format!("{}", x),
        RawValue::Bool(b) => b.to_string(),
        RawValue::Date(d) => d.to_string(),
    }
}

/// Normalizes one row.
///
/// `id` is the sequence number of the record, `now` the date used when the row has no date.
pub fn normalize_row<R: Rng>(
    row: &RawRow,
    id: u64,
    now: NaiveDateTime,
    rng: &mut R,
) -> SurveyRecord {
    let date = match row.get(FIELD_DATE).or_else(|| row.get(FIELD_TIMESTAMP)) {
        Some(v) => {
            let d = parse_date(v);
            if d.is_none() {
                warn!("normalize_row: record {}: invalid date {:?}", id, v);
            }
            d
        }
        None => Some(now),
    };

    let customer_id = match row.get(FIELD_CUSTOMER_ID) {
        Some(v) => raw_to_string(v).trim().to_string(),
        None => format!("CUST{}", id),
    };

    let overall_satisfaction = parse_overall_satisfaction(row.get(FIELD_OVERALL_SATISFACTION));

    let nps_score = match parse_nps(row.get(FIELD_NPS_SCORE)) {
        Some(x) => x,
        None => backfill_nps(overall_satisfaction, rng),
    };

    let record = SurveyRecord {
        id,
        date,
        customer_id,
        food_quality: parse_rating(row.get(Attribute::FoodQuality.label())),
        service_quality: parse_rating(row.get(Attribute::ServiceQuality.label())),
        hygiene: parse_rating(row.get(Attribute::Hygiene.label())),
        value_for_money: parse_rating(row.get(Attribute::ValueForMoney.label())),
        overall_satisfaction,
        comments: row.get(FIELD_COMMENTS).map(raw_to_string).unwrap_or_default(),
        nps_score,
    };
    debug!("normalize_row: {:?} -> {:?}", row, record);
    record
}

/// Normalizes rows in order, numbering them from `first_id`.
pub fn normalize_rows<R: Rng>(
    rows: &[RawRow],
    first_id: u64,
    now: NaiveDateTime,
    rng: &mut R,
) -> Vec<SurveyRecord> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| normalize_row(row, first_id + idx as u64, now, rng))
        .collect()
}
