use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use chrono::NaiveDateTime;

use crate::config::*;
use crate::filter::apply_filter;
use crate::normalizer::normalize_rows;
use crate::run_dashboard_stats;
use crate::sample::generate_sample_records;

/// The state of one dashboard: the loaded records and the active filter.
///
/// The record set is replaced as a whole by every load, and everything else is
/// recomputed from it on demand.
///
/// ```
/// use survey_analytics::session::DashboardSession;
/// use survey_analytics::{FilterSpec, RandomMode};
/// # use survey_analytics::DashboardErrors;
/// # let now = chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
///
/// let mut session = DashboardSession::new(RandomMode::Seeded(1));
/// session.load_sample(150, now);
/// session.set_filter(FilterSpec::parse("last-90", "all")?);
/// let result = session.refresh(now);
/// assert_eq!(result.total_records, 150);
/// # Ok::<(), DashboardErrors>(())
/// ```
pub struct DashboardSession {
    records: Vec<SurveyRecord>,
    filter: FilterSpec,
    next_id: u64,
    rng: StdRng,
}

impl DashboardSession {
    pub fn new(mode: RandomMode) -> DashboardSession {
        let rng = match mode {
            RandomMode::Seeded(seed) => StdRng::seed_from_u64(seed),
            RandomMode::Entropy => StdRng::from_entropy(),
        };
        DashboardSession {
            records: Vec::new(),
            filter: FilterSpec::ALL,
            next_id: 1,
            rng,
        }
    }

    pub fn records(&self) -> &[SurveyRecord] {
        &self.records
    }

    pub fn filter(&self) -> FilterSpec {
        self.filter
    }

    fn replace_records(&mut self, records: Vec<SurveyRecord>) -> usize {
        self.next_id += records.len() as u64;
        self.records = records;
        self.records.len()
    }

    /// Replaces the data with generated sample responses.
    pub fn load_sample(&mut self, count: usize, now: NaiveDateTime) -> usize {
        let records = generate_sample_records(count, self.next_id, now, &mut self.rng);
        info!("load_sample: loaded {} sample records", records.len());
        self.replace_records(records)
    }

    /// Replaces the data with the normalized rows.
    pub fn load_rows(&mut self, rows: &[RawRow], now: NaiveDateTime) -> usize {
        let records = normalize_rows(rows, self.next_id, now, &mut self.rng);
        info!("load_rows: loaded {} records", records.len());
        self.replace_records(records)
    }

    /// Reads rows with the given reader and loads them.
    ///
    /// Loading is all-or-nothing: if the reader fails, the current data is kept
    /// and the error is returned.
    pub fn try_load<E, F>(&mut self, read: F, now: NaiveDateTime) -> Result<usize, E>
    where
        F: FnOnce() -> Result<Vec<RawRow>, E>,
    {
        let rows = read()?;
        Ok(self.load_rows(&rows, now))
    }

    pub fn set_filter(&mut self, filter: FilterSpec) {
        self.filter = filter;
    }

    pub fn reset_filters(&mut self) {
        self.filter = FilterSpec::ALL;
    }

    /// The records selected by the active filter.
    pub fn filtered(&self, now: NaiveDateTime) -> Vec<SurveyRecord> {
        apply_filter(&self.records, &self.filter, now)
    }

    /// Runs a full recomputation pass with the active filter.
    pub fn refresh(&self, now: NaiveDateTime) -> DashboardResult {
        run_dashboard_stats(&self.records, &self.filter, now)
    }
}
