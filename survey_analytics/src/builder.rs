pub use crate::config::*;

/// A builder for raw survey rows.
///
/// Readers usually fill `RawRow` directly. The builder is convenient when the
/// responses come from code, with the canonical field names already known.
///
/// ```
/// pub use survey_analytics::builder::Builder;
/// pub use survey_analytics::{Attribute, RandomMode};
/// use survey_analytics::session::DashboardSession;
/// # let now = chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
///
/// let mut builder = Builder::new();
/// builder.add_row(
///     Builder::row()
///         .rating(Attribute::FoodQuality, 5)
///         .rating(Attribute::Hygiene, 4)
///         .overall("Excellent")
///         .comments("Lovely dinner"),
/// );
/// builder.add_row_simple(&[("Overall Satisfaction", "poor"), ("NPS Score", "3")]);
///
/// let mut session = DashboardSession::new(RandomMode::Seeded(3));
/// session.load_rows(&builder.build(), now);
/// assert_eq!(session.records().len(), 2);
/// ```
pub struct Builder {
    rows: Vec<RawRow>,
}

/// One row under construction.
pub struct RowBuilder {
    row: RawRow,
}

impl RowBuilder {
    pub fn field(mut self, name: &str, value: RawValue) -> RowBuilder {
        self.row.insert(name, value);
        self
    }

    pub fn date(self, value: RawValue) -> RowBuilder {
        self.field(FIELD_DATE, value)
    }

    pub fn customer_id(self, id: &str) -> RowBuilder {
        self.field(FIELD_CUSTOMER_ID, RawValue::from(id))
    }

    pub fn rating(self, attribute: Attribute, rating: i64) -> RowBuilder {
        self.field(attribute.label(), RawValue::from(rating))
    }

    pub fn overall(self, text: &str) -> RowBuilder {
        self.field(FIELD_OVERALL_SATISFACTION, RawValue::from(text))
    }

    pub fn comments(self, text: &str) -> RowBuilder {
        self.field(FIELD_COMMENTS, RawValue::from(text))
    }

    pub fn nps(self, score: i64) -> RowBuilder {
        self.field(FIELD_NPS_SCORE, RawValue::from(score))
    }
}

impl Builder {
    pub fn new() -> Builder {
        Builder { rows: Vec::new() }
    }

    pub fn row() -> RowBuilder {
        RowBuilder { row: RawRow::new() }
    }

    pub fn add_row(&mut self, row: RowBuilder) {
        self.rows.push(row.row);
    }

    /// Adds a row given as (field name, text) pairs.
    ///
    /// It is the simplest use case for most cases.
    pub fn add_row_simple(&mut self, fields: &[(&str, &str)]) {
        let mut row = RawRow::new();
        for (name, value) in fields {
            row.insert(name, RawValue::from(*value));
        }
        self.rows.push(row);
    }

    pub fn build(self) -> Vec<RawRow> {
        self.rows
    }
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}
