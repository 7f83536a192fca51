use log::debug;

use chrono::{Duration, Months, NaiveDateTime};

use crate::config::*;

/// Turns `highly-satisfied` or `HIGHLY satisfied` into `Highly Satisfied`.
pub fn canonical_label(s: &str) -> String {
    s.split(|c: char| c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

impl RatingFilter {
    /// Parses the dashboard rating filter. The value is normalized to the canonical
    /// label before comparison, so `highly-satisfied` selects `Highly Satisfied`.
    pub fn parse(s: &str) -> Result<RatingFilter, DashboardErrors> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(RatingFilter::All);
        }
        Satisfaction::from_label(&canonical_label(trimmed))
            .map(RatingFilter::Only)
            .ok_or_else(|| DashboardErrors::UnknownRatingCategory(s.to_string()))
    }

    pub fn name(&self) -> String {
        match self {
            RatingFilter::All => "all".to_string(),
            RatingFilter::Only(s) => s.label().to_lowercase().replace(' ', "-"),
        }
    }
}

impl FilterSpec {
    pub fn parse(date_range: &str, rating: &str) -> Result<FilterSpec, DashboardErrors> {
        Ok(FilterSpec {
            date_range: DateRange::parse(date_range)?,
            rating: RatingFilter::parse(rating)?,
        })
    }
}

/// The oldest date still inside the range, relative to `now`.
pub fn cutoff_date(range: DateRange, now: NaiveDateTime) -> Option<NaiveDateTime> {
    match range {
        DateRange::All => None,
        DateRange::Last30Days => Some(now - Duration::days(30)),
        DateRange::Last90Days => Some(now - Duration::days(90)),
        DateRange::LastYear => now
            .checked_sub_months(Months::new(12))
            .or_else(|| Some(now - Duration::days(365))),
    }
}

fn matches(record: &SurveyRecord, cutoff: Option<NaiveDateTime>, rating: RatingFilter) -> bool {
    let date_ok = match (cutoff, record.date) {
        (None, _) => true,
        (Some(c), Some(d)) => d >= c,
        // Records with an invalid date are never within a range.
        (Some(_), None) => false,
    };
    let rating_ok = match rating {
        RatingFilter::All => true,
        RatingFilter::Only(s) => record.overall_satisfaction == s,
    };
    date_ok && rating_ok
}

/// Returns the records selected by the filter, in their original order.
pub fn apply_filter(
    records: &[SurveyRecord],
    spec: &FilterSpec,
    now: NaiveDateTime,
) -> Vec<SurveyRecord> {
    if spec.is_all() {
        return records.to_vec();
    }
    let cutoff = cutoff_date(spec.date_range, now);
    let res: Vec<SurveyRecord> = records
        .iter()
        .filter(|r| matches(r, cutoff, spec.rating))
        .cloned()
        .collect();
    debug!(
        "apply_filter: {:?} cutoff {:?}: kept {} of {} records",
        spec,
        cutoff,
        res.len(),
        records.len()
    );
    res
}
