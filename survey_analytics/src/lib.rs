mod config;
use log::{debug, info};

use chrono::NaiveDateTime;

pub use crate::config::*;

pub mod aggregation;
pub mod builder;
pub mod filter;
pub mod insights;
pub mod manual;
pub mod normalizer;
pub mod sample;
pub mod session;

/// Runs one recomputation pass: filters the records, then aggregates them and
/// derives the insights.
///
/// Arguments:
/// * `records` the full record set of the dashboard
/// * `filter` the active filter
/// * `now` the reference time of the date filters
pub fn run_dashboard_stats(
    records: &[SurveyRecord],
    filter: &FilterSpec,
    now: NaiveDateTime,
) -> DashboardResult {
    info!(
        "Processing {:?} records, filter: {:?}, now: {}",
        records.len(),
        filter,
        now
    );

    let filtered = filter::apply_filter(records, filter, now);
    info!("Filtered view: {:?} records", filtered.len());

    let summary = aggregation::summarize(&filtered);
    {
        for (level, count) in summary.distribution.iter() {
            info!("{:>8} {}", count, level);
        }
        for st in summary.attributes.iter() {
            debug!(
                "Attribute {}: average {:?} priority {:?}",
                st.attribute, st.average, st.priority
            );
        }
    }

    // No insight can be derived from an empty view.
    let insights = summary
        .attribute_averages()
        .map(|averages| insights::generate_insights(&averages, &filtered));
    if insights.is_none() {
        info!("No data in the filtered view, skipping insights");
    }

    DashboardResult {
        filter: *filter,
        total_records: records.len() as u64,
        summary,
        insights,
    }
}
