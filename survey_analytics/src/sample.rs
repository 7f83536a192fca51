use log::debug;
use rand::Rng;

use chrono::{Duration, NaiveDateTime};

use crate::config::*;

const SAMPLE_COMMENTS: [&str; 20] = [
    "Outstanding food quality and excellent service! Will definitely return.",
    "Good value for money and clean environment.",
    "Service was prompt and staff was very friendly.",
    "Food was delicious but the portions could be larger.",
    "Average experience overall, nothing special.",
    "Great atmosphere and the food exceeded expectations.",
    "Service was slow but the food quality made up for it.",
    "Hygiene standards were excellent, very impressed.",
    "A bit expensive but worth it for the quality.",
    "Perfect dining experience for a special occasion!",
    "Food quality needs improvement, disappointed.",
    "Excellent customer service and attention to detail.",
    "Clean facility and well-maintained dining area.",
    "Value for money is questionable given the portion sizes.",
    "Staff went above and beyond to accommodate our needs.",
    "Food was cold when served, not acceptable.",
    "Best restaurant experience in a long time!",
    "Good selection of menu items and reasonable prices.",
    "Service quality varies depending on the time of day.",
    "Impressed with the hygiene protocols followed.",
];

// Probability for a generated response to carry a comment.
const COMMENT_PROBABILITY: f64 = 0.6;
const SAMPLE_WINDOW_DAYS: i64 = 365;

/// Generates `count` plausible responses spread over the year before `now`.
///
/// The ratings and the NPS score follow the drawn satisfaction level, so that the
/// aggregates look like a real survey. Records are numbered from `first_id` and
/// returned most recent first.
pub fn generate_sample_records<R: Rng>(
    count: usize,
    first_id: u64,
    now: NaiveDateTime,
    rng: &mut R,
) -> Vec<SurveyRecord> {
    let mut res: Vec<SurveyRecord> = Vec::with_capacity(count);
    for idx in 0..count {
        let date = now - Duration::days(rng.gen_range(0..SAMPLE_WINDOW_DAYS));

        let level_idx = rng.gen_range(0..Satisfaction::ALL.len());
        let overall_satisfaction = Satisfaction::ALL[level_idx];
        // The better the level, the higher the ratings.
        let base = 5 - level_idx as i64;
        let mut vary = |lo: i64, hi: i64, center: i64| {
            (center + rng.gen_range(-1..=1)).clamp(lo, hi) as u8
        };
        let food_quality = vary(1, 5, base);
        let service_quality = vary(1, 5, base);
        let hygiene = vary(1, 5, base);
        let value_for_money = vary(1, 5, base);
        let nps_score = vary(0, 10, base * 2);

        let comments = if rng.gen_bool(COMMENT_PROBABILITY) {
            SAMPLE_COMMENTS[rng.gen_range(0..SAMPLE_COMMENTS.len())].to_string()
        } else {
            "".to_string()
        };

        res.push(SurveyRecord {
            id: first_id + idx as u64,
            date: Some(date),
            customer_id: format!("CUST{:03}", idx + 1),
            food_quality,
            service_quality,
            hygiene,
            value_for_money,
            overall_satisfaction,
            comments,
            nps_score,
        });
    }
    res.sort_by(|a, b| b.date.cmp(&a.date));
    debug!("generate_sample_records: generated {} records", res.len());
    res
}
