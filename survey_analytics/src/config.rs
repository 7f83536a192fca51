// ********* Input data structures ***********

use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;

use chrono::NaiveDateTime;

/// A single cell of a raw survey row, as handed over by a reader.
///
/// Readers should not try to interpret the content: the normalizer applies
/// the defaults for anything that cannot be understood.
#[derive(PartialEq, Debug, Clone)]
pub enum RawValue {
    /// A missing or blank cell.
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// A value that is already a calendar timestamp (date-formatted cells).
    Date(NaiveDateTime),
}

impl RawValue {
    /// Blank cells and empty strings count as missing, as in most spreadsheet exports.
    pub fn is_missing(&self) -> bool {
        match self {
            RawValue::Empty => true,
            RawValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<i32> for RawValue {
    fn from(x: i32) -> Self {
        RawValue::Number(x as f64)
    }
}

impl From<i64> for RawValue {
    fn from(x: i64) -> Self {
        RawValue::Number(x as f64)
    }
}

impl From<f64> for RawValue {
    fn from(x: f64) -> Self {
        RawValue::Number(x)
    }
}

impl From<NaiveDateTime> for RawValue {
    fn from(d: NaiveDateTime) -> Self {
        RawValue::Date(d)
    }
}

/// One survey response before normalization: field name -> value.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RawRow {
    pub fields: HashMap<String, RawValue>,
}

impl RawRow {
    pub fn new() -> RawRow {
        RawRow {
            fields: HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: &str, value: RawValue) {
        self.fields.insert(name.to_string(), value);
    }

    /// Returns the value of a field, treating blank values as absent.
    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.fields.get(name).filter(|v| !v.is_missing())
    }
}

// The names of the recognized fields.
pub const FIELD_DATE: &str = "Date";
pub const FIELD_TIMESTAMP: &str = "Timestamp";
pub const FIELD_CUSTOMER_ID: &str = "Customer ID";
pub const FIELD_OVERALL_SATISFACTION: &str = "Overall Satisfaction";
pub const FIELD_COMMENTS: &str = "Comments";
pub const FIELD_NPS_SCORE: &str = "NPS Score";

// ********* Canonical records ***********

/// The overall sentiment of a response, from best to worst.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Satisfaction {
    HighlySatisfied,
    Satisfied,
    Neutral,
    Dissatisfied,
    HighlyDissatisfied,
}

impl Satisfaction {
    pub const ALL: [Satisfaction; 5] = [
        Satisfaction::HighlySatisfied,
        Satisfaction::Satisfied,
        Satisfaction::Neutral,
        Satisfaction::Dissatisfied,
        Satisfaction::HighlyDissatisfied,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Satisfaction::HighlySatisfied => "Highly Satisfied",
            Satisfaction::Satisfied => "Satisfied",
            Satisfaction::Neutral => "Neutral",
            Satisfaction::Dissatisfied => "Dissatisfied",
            Satisfaction::HighlyDissatisfied => "Highly Dissatisfied",
        }
    }

    /// Exact match on the canonical label.
    pub fn from_label(label: &str) -> Option<Satisfaction> {
        Satisfaction::ALL.iter().find(|s| s.label() == label).cloned()
    }

    /// Highly Dissatisfied = 1 ... Highly Satisfied = 5
    pub fn score(&self) -> u32 {
        match self {
            Satisfaction::HighlySatisfied => 5,
            Satisfaction::Satisfied => 4,
            Satisfaction::Neutral => 3,
            Satisfaction::Dissatisfied => 2,
            Satisfaction::HighlyDissatisfied => 1,
        }
    }

    pub fn is_satisfied(&self) -> bool {
        matches!(
            self,
            Satisfaction::Satisfied | Satisfaction::HighlySatisfied
        )
    }
}

impl Display for Satisfaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The rated aspects of a visit, in their presentation order.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Attribute {
    FoodQuality,
    ServiceQuality,
    Hygiene,
    ValueForMoney,
}

impl Attribute {
    pub const ALL: [Attribute; 4] = [
        Attribute::FoodQuality,
        Attribute::ServiceQuality,
        Attribute::Hygiene,
        Attribute::ValueForMoney,
    ];

    /// The display label, which is also the name of the input field.
    pub fn label(&self) -> &'static str {
        match self {
            Attribute::FoodQuality => "Food Quality",
            Attribute::ServiceQuality => "Service Quality",
            Attribute::Hygiene => "Hygiene",
            Attribute::ValueForMoney => "Value for Money",
        }
    }
}

impl Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A normalized survey response.
///
/// Invariants: the ratings are in [1, 5] and the NPS score in [0, 10].
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SurveyRecord {
    pub id: u64,
    /// `None` when the source contained a date that could not be understood.
    pub date: Option<NaiveDateTime>,
    pub customer_id: String,
    pub food_quality: u8,
    pub service_quality: u8,
    pub hygiene: u8,
    pub value_for_money: u8,
    pub overall_satisfaction: Satisfaction,
    pub comments: String,
    pub nps_score: u8,
}

impl SurveyRecord {
    pub fn rating(&self, attribute: Attribute) -> u8 {
        match attribute {
            Attribute::FoodQuality => self.food_quality,
            Attribute::ServiceQuality => self.service_quality,
            Attribute::Hygiene => self.hygiene,
            Attribute::ValueForMoney => self.value_for_money,
        }
    }

    pub fn satisfaction_score(&self) -> u32 {
        self.overall_satisfaction.score()
    }

    pub fn average_attribute_rating(&self) -> f64 {
        let total: u32 = Attribute::ALL
            .iter()
            .map(|a| self.rating(*a) as u32)
            .sum();
        total as f64 / Attribute::ALL.len() as f64
    }

    pub fn is_promoter(&self) -> bool {
        self.nps_score >= 9
    }

    pub fn is_detractor(&self) -> bool {
        self.nps_score <= 6
    }

    pub fn is_passive(&self) -> bool {
        !self.is_promoter() && !self.is_detractor()
    }

    pub fn is_satisfied(&self) -> bool {
        self.overall_satisfaction.is_satisfied()
    }

    pub fn has_comments(&self) -> bool {
        !self.comments.trim().is_empty()
    }
}

// ********* Filters **********

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum DateRange {
    All,
    Last30Days,
    Last90Days,
    LastYear,
}

impl DateRange {
    /// Accepts the short dashboard names (`last-30`) and the long ones (`last-30-days`).
    pub fn parse(s: &str) -> Result<DateRange, DashboardErrors> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(DateRange::All),
            "last-30" | "last-30-days" => Ok(DateRange::Last30Days),
            "last-90" | "last-90-days" => Ok(DateRange::Last90Days),
            "last-year" => Ok(DateRange::LastYear),
            _ => Err(DashboardErrors::UnknownDateRange(s.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DateRange::All => "all",
            DateRange::Last30Days => "last-30",
            DateRange::Last90Days => "last-90",
            DateRange::LastYear => "last-year",
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum RatingFilter {
    All,
    Only(Satisfaction),
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct FilterSpec {
    pub date_range: DateRange,
    pub rating: RatingFilter,
}

impl FilterSpec {
    pub const ALL: FilterSpec = FilterSpec {
        date_range: DateRange::All,
        rating: RatingFilter::All,
    };

    pub fn is_all(&self) -> bool {
        *self == FilterSpec::ALL
    }
}

impl Default for FilterSpec {
    fn default() -> Self {
        FilterSpec::ALL
    }
}

// ******** Output data structures *********

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

/// Direction indicator of an attribute, derived from its average.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum AttributeTrend {
    Improving,
    Stable,
    Declining,
}

impl AttributeTrend {
    pub fn label(&self) -> &'static str {
        match self {
            AttributeTrend::Improving => "Improving",
            AttributeTrend::Stable => "Stable",
            AttributeTrend::Declining => "Declining",
        }
    }
}

/// Qualitative reading of the overall satisfaction score.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum PerformanceBand {
    Excellent,
    Good,
    NeedsImprovement,
}

impl PerformanceBand {
    pub fn label(&self) -> &'static str {
        match self {
            PerformanceBand::Excellent => "Excellent",
            PerformanceBand::Good => "Good",
            PerformanceBand::NeedsImprovement => "Needs Improvement",
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct NpsStats {
    /// Between -100 and 100.
    pub score: i64,
    pub promoters: u64,
    pub passives: u64,
    pub detractors: u64,
    pub total: u64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct AttributeStats {
    pub attribute: Attribute,
    pub responses: u64,
    // All the fields below are None when there is no response.
    pub average: Option<f64>,
    /// Percentage of ratings >= 4.
    pub satisfied_rate: Option<f64>,
    pub priority: Option<Priority>,
    pub trend: Option<AttributeTrend>,
}

/// A calendar month, ordered chronologically.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    const SHORT_NAMES: [&'static str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    /// `2024-03`
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// `Mar 2024`
    pub fn label(&self) -> String {
        let name = MonthKey::SHORT_NAMES
            .get((self.month as usize).wrapping_sub(1))
            .unwrap_or(&"???");
        format!("{} {}", name, self.year)
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct TrendPoint {
    pub month: MonthKey,
    pub average_score: f64,
    pub responses: u64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct CommentEntry {
    pub record_id: u64,
    pub date: Option<NaiveDateTime>,
    pub satisfaction: Satisfaction,
    pub text: String,
}

/// All the statistics computed over one set of records.
///
/// Every statistic that is undefined for an empty set is an `Option`.
#[derive(PartialEq, Debug, Clone)]
pub struct SurveySummary {
    pub responses: u64,
    /// Categories without records are omitted. Ordered from best to worst.
    pub distribution: Vec<(Satisfaction, u64)>,
    pub overall_score: Option<f64>,
    pub performance: Option<PerformanceBand>,
    /// Percentage, in [0, 100].
    pub satisfaction_rate: Option<f64>,
    pub nps: Option<NpsStats>,
    pub attributes: Vec<AttributeStats>,
    pub monthly_trend: Vec<TrendPoint>,
    pub recent_comments: Vec<CommentEntry>,
}

impl SurveySummary {
    /// The averages of all the attributes, if the summary has data.
    pub fn attribute_averages(&self) -> Option<Vec<(Attribute, f64)>> {
        self.attributes
            .iter()
            .map(|st| st.average.map(|avg| (st.attribute, avg)))
            .collect()
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct Insights {
    /// At most 3 attributes, best first.
    pub top_performing: Vec<(Attribute, f64)>,
    /// Attributes below 4.0, worst first.
    pub improvement_areas: Vec<(Attribute, f64)>,
    pub recommendations: Vec<String>,
}

impl Insights {
    pub fn all_areas_performing_well(&self) -> bool {
        self.improvement_areas.is_empty()
    }
}

/// The outcome of one recomputation pass.
#[derive(PartialEq, Debug, Clone)]
pub struct DashboardResult {
    pub filter: FilterSpec,
    pub total_records: u64,
    pub summary: SurveySummary,
    /// None when the filtered view is empty.
    pub insights: Option<Insights>,
}

/// Errors raised while interpreting dashboard settings.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum DashboardErrors {
    UnknownDateRange(String),
    UnknownRatingCategory(String),
}

impl Error for DashboardErrors {}

impl Display for DashboardErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DashboardErrors::UnknownDateRange(s) => write!(f, "Unknown date range: {:?}", s),
            DashboardErrors::UnknownRatingCategory(s) => {
                write!(f, "Unknown rating category: {:?}", s)
            }
        }
    }
}

// ********* Configuration **********

/// Where the randomness of the sample data and of the NPS back-fill comes from.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum RandomMode {
    /// Reproducible draws.
    Seeded(u64),
    Entropy,
}

/// The number of records generated when no data was loaded.
pub const DEFAULT_SAMPLE_SIZE: usize = 150;
