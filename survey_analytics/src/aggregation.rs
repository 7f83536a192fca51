use log::debug;

use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;

use crate::config::*;

// The number of comments reported in a summary.
const RECENT_COMMENTS: usize = 10;

// Above this average an attribute is fine, below the lower one it is a problem.
pub const TARGET_AVERAGE: f64 = 4.0;
pub const WARNING_AVERAGE: f64 = 3.5;

fn mean(total: f64, count: u64) -> Option<f64> {
    if count == 0 {
        None
    } else {
        Some(total / count as f64)
    }
}

fn percentage(part: u64, total: u64) -> Option<f64> {
    mean(part as f64 * 100.0, total)
}

/// Number of records per satisfaction level, best level first. Levels without
/// records are not reported.
pub fn satisfaction_distribution(records: &[SurveyRecord]) -> Vec<(Satisfaction, u64)> {
    let mut counts: HashMap<Satisfaction, u64> = HashMap::new();
    for r in records.iter() {
        *counts.entry(r.overall_satisfaction).or_insert(0) += 1;
    }
    Satisfaction::ALL
        .iter()
        .filter_map(|s| counts.get(s).map(|c| (*s, *c)))
        .collect()
}

/// Mean satisfaction score (1 to 5).
pub fn overall_score(records: &[SurveyRecord]) -> Option<f64> {
    let total: u64 = records.iter().map(|r| r.satisfaction_score() as u64).sum();
    mean(total as f64, records.len() as u64)
}

pub fn performance_band(score: f64) -> PerformanceBand {
    if score >= TARGET_AVERAGE {
        PerformanceBand::Excellent
    } else if score >= WARNING_AVERAGE {
        PerformanceBand::Good
    } else {
        PerformanceBand::NeedsImprovement
    }
}

/// Percentage of Satisfied and Highly Satisfied responses.
pub fn satisfaction_rate(records: &[SurveyRecord]) -> Option<f64> {
    let satisfied = records.iter().filter(|r| r.is_satisfied()).count() as u64;
    percentage(satisfied, records.len() as u64)
}

/// Net Promoter Score: promoters minus detractors, as a rounded percentage.
pub fn net_promoter_score(records: &[SurveyRecord]) -> Option<NpsStats> {
    let total = records.len() as u64;
    if total == 0 {
        return None;
    }
    let promoters = records.iter().filter(|r| r.is_promoter()).count() as u64;
    let detractors = records.iter().filter(|r| r.is_detractor()).count() as u64;
    let passives = records.iter().filter(|r| r.is_passive()).count() as u64;
    let score = ((promoters as f64 - detractors as f64) / total as f64 * 100.0).round() as i64;
    Some(NpsStats {
        score,
        promoters,
        passives,
        detractors,
        total,
    })
}

pub fn priority(average: f64) -> Priority {
    if average < WARNING_AVERAGE {
        Priority::High
    } else if average < TARGET_AVERAGE {
        Priority::Medium
    } else {
        Priority::Low
    }
}

pub fn attribute_trend(average: f64) -> AttributeTrend {
    if average >= TARGET_AVERAGE {
        AttributeTrend::Improving
    } else if average >= WARNING_AVERAGE {
        AttributeTrend::Stable
    } else {
        AttributeTrend::Declining
    }
}

pub fn attribute_average(records: &[SurveyRecord], attribute: Attribute) -> Option<f64> {
    let total: u64 = records.iter().map(|r| r.rating(attribute) as u64).sum();
    mean(total as f64, records.len() as u64)
}

pub fn attribute_stats(records: &[SurveyRecord], attribute: Attribute) -> AttributeStats {
    let responses = records.len() as u64;
    let average = attribute_average(records, attribute);
    let satisfied = records
        .iter()
        .filter(|r| r.rating(attribute) >= 4)
        .count() as u64;
    AttributeStats {
        attribute,
        responses,
        average,
        satisfied_rate: percentage(satisfied, responses),
        priority: average.map(priority),
        trend: average.map(attribute_trend),
    }
}

/// Mean satisfaction score per calendar month, oldest month first.
///
/// Records without a valid date do not belong to any month.
pub fn monthly_trend(records: &[SurveyRecord]) -> Vec<TrendPoint> {
    let mut months: BTreeMap<MonthKey, (u64, u64)> = BTreeMap::new();
    for r in records.iter() {
        if let Some(d) = r.date {
            let key = MonthKey {
                year: d.year(),
                month: d.month(),
            };
            let e = months.entry(key).or_insert((0, 0));
            e.0 += r.satisfaction_score() as u64;
            e.1 += 1;
        }
    }
    months
        .into_iter()
        .filter_map(|(month, (total, count))| {
            mean(total as f64, count).map(|average_score| TrendPoint {
                month,
                average_score,
                responses: count,
            })
        })
        .collect()
}

/// The most recent comments, newest first.
pub fn recent_comments(records: &[SurveyRecord]) -> Vec<CommentEntry> {
    let mut commented: Vec<&SurveyRecord> = records.iter().filter(|r| r.has_comments()).collect();
    // Undated records sort last.
    commented.sort_by(|a, b| b.date.cmp(&a.date));
    commented
        .into_iter()
        .take(RECENT_COMMENTS)
        .map(|r| CommentEntry {
            record_id: r.id,
            date: r.date,
            satisfaction: r.overall_satisfaction,
            text: r.comments.clone(),
        })
        .collect()
}

/// Computes all the statistics of a set of records.
pub fn summarize(records: &[SurveyRecord]) -> SurveySummary {
    let overall = overall_score(records);
    let summary = SurveySummary {
        responses: records.len() as u64,
        distribution: satisfaction_distribution(records),
        overall_score: overall,
        performance: overall.map(performance_band),
        satisfaction_rate: satisfaction_rate(records),
        nps: net_promoter_score(records),
        attributes: Attribute::ALL
            .iter()
            .map(|a| attribute_stats(records, *a))
            .collect(),
        monthly_trend: monthly_trend(records),
        recent_comments: recent_comments(records),
    };
    debug!(
        "summarize: {} records: score {:?} rate {:?} nps {:?}",
        summary.responses, summary.overall_score, summary.satisfaction_rate, summary.nps
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn day(y: i32, m: u32, d: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(y, m, d).and_then(|d| d.and_hms_opt(9, 0, 0))
    }

    fn record(id: u64, s: Satisfaction, nps: u8) -> SurveyRecord {
        SurveyRecord {
            id,
            date: day(2024, 5, 1),
            customer_id: format!("C{}", id),
            food_quality: 4,
            service_quality: 3,
            hygiene: 5,
            value_for_money: 2,
            overall_satisfaction: s,
            comments: "".to_string(),
            nps_score: nps,
        }
    }

    #[test]
    fn empty_set_has_no_data() {
        let s = summarize(&[]);
        assert_eq!(s.responses, 0);
        assert!(s.distribution.is_empty());
        assert_eq!(s.overall_score, None);
        assert_eq!(s.performance, None);
        assert_eq!(s.satisfaction_rate, None);
        assert_eq!(s.nps, None);
        assert!(s.monthly_trend.is_empty());
        assert!(s.recent_comments.is_empty());
        assert_eq!(s.attributes.len(), 4);
        for st in s.attributes.iter() {
            assert_eq!(st.average, None);
            assert_eq!(st.satisfied_rate, None);
            assert_eq!(st.priority, None);
        }
        assert_eq!(s.attribute_averages(), None);
    }

    #[test]
    fn satisfaction_rate_seventy_percent() {
        let mut rs = Vec::new();
        for i in 0..10 {
            let s = match i {
                0..=3 => Satisfaction::Satisfied,
                4..=6 => Satisfaction::HighlySatisfied,
                7 => Satisfaction::Neutral,
                _ => Satisfaction::Dissatisfied,
            };
            rs.push(record(i, s, 5));
        }
        assert_eq!(satisfaction_rate(&rs), Some(70.0));
    }

    #[test]
    fn nps_example() {
        let rs: Vec<SurveyRecord> = [9, 9, 3, 7]
            .iter()
            .enumerate()
            .map(|(i, nps)| record(i as u64, Satisfaction::Neutral, *nps))
            .collect();
        let nps = net_promoter_score(&rs).unwrap();
        assert_eq!(nps.promoters, 2);
        assert_eq!(nps.detractors, 1);
        assert_eq!(nps.passives, 1);
        assert_eq!(nps.total, 4);
        assert_eq!(nps.score, 25);
    }

    #[test]
    fn nps_categories_cover_every_score() {
        for nps in 0..=10 {
            let r = record(1, Satisfaction::Neutral, nps);
            let categories = [r.is_promoter(), r.is_passive(), r.is_detractor()];
            assert_eq!(categories.iter().filter(|c| **c).count(), 1, "{}", nps);
        }
        assert!(record(1, Satisfaction::Neutral, 7).is_passive());
        assert!(record(1, Satisfaction::Neutral, 8).is_passive());
        assert!(!record(1, Satisfaction::Neutral, 6).is_passive());
        assert!(!record(1, Satisfaction::Neutral, 9).is_passive());

        let rs: Vec<SurveyRecord> = (0..=10)
            .map(|nps| record(nps as u64, Satisfaction::Neutral, nps))
            .collect();
        let stats = net_promoter_score(&rs).unwrap();
        assert_eq!((stats.promoters, stats.passives, stats.detractors), (2, 2, 7));
        assert_eq!(stats.promoters + stats.passives + stats.detractors, stats.total);
    }

    #[test]
    fn average_attribute_rating_of_a_record() {
        // Ratings 4, 3, 5 and 2.
        assert_eq!(record(1, Satisfaction::Neutral, 5).average_attribute_rating(), 3.5);
        let mut r = record(2, Satisfaction::Neutral, 5);
        r.food_quality = 5;
        r.service_quality = 5;
        r.value_for_money = 5;
        assert_eq!(r.average_attribute_rating(), 5.0);
    }

    #[test]
    fn distribution_omits_empty_levels() {
        let rs = vec![
            record(1, Satisfaction::Neutral, 5),
            record(2, Satisfaction::HighlySatisfied, 9),
            record(3, Satisfaction::Neutral, 5),
        ];
        assert_eq!(
            satisfaction_distribution(&rs),
            vec![
                (Satisfaction::HighlySatisfied, 1),
                (Satisfaction::Neutral, 2)
            ]
        );
        // (5 + 3 + 3) / 3
        let score = overall_score(&rs).unwrap();
        assert!((score - 11.0 / 3.0).abs() < 1e-9);
        assert_eq!(performance_band(score), PerformanceBand::Good);
    }

    #[test]
    fn attributes() {
        let mut rs = vec![record(1, Satisfaction::Neutral, 5), record(2, Satisfaction::Neutral, 5)];
        rs[1].food_quality = 3;
        let food = attribute_stats(&rs, Attribute::FoodQuality);
        assert_eq!(food.average, Some(3.5));
        assert_eq!(food.satisfied_rate, Some(50.0));
        assert_eq!(food.priority, Some(Priority::Medium));
        assert_eq!(food.trend, Some(AttributeTrend::Stable));
        let hygiene = attribute_stats(&rs, Attribute::Hygiene);
        assert_eq!(hygiene.priority, Some(Priority::Low));
        let value = attribute_stats(&rs, Attribute::ValueForMoney);
        assert_eq!(value.priority, Some(Priority::High));
        assert_eq!(value.satisfied_rate, Some(0.0));
    }

    #[test]
    fn priorities_at_boundaries() {
        assert_eq!(priority(3.49), Priority::High);
        assert_eq!(priority(3.5), Priority::Medium);
        assert_eq!(priority(3.99), Priority::Medium);
        assert_eq!(priority(4.0), Priority::Low);
    }

    #[test]
    fn trend_is_chronological() {
        let mut rs = vec![
            record(1, Satisfaction::HighlySatisfied, 9),
            record(2, Satisfaction::Dissatisfied, 3),
            record(3, Satisfaction::Satisfied, 7),
            record(4, Satisfaction::Neutral, 5),
        ];
        rs[0].date = day(2024, 2, 10);
        rs[1].date = day(2023, 12, 31);
        rs[2].date = day(2024, 2, 1);
        rs[3].date = None;
        let trend = monthly_trend(&rs);
        let keys: Vec<String> = trend.iter().map(|p| p.month.key()).collect();
        assert_eq!(keys, vec!["2023-12", "2024-02"]);
        assert_eq!(trend[0].average_score, 2.0);
        assert_eq!(trend[1].average_score, 4.5);
        assert_eq!(trend[1].responses, 2);
        assert_eq!(trend[1].month.label(), "Feb 2024");
    }

    #[test]
    fn comments_newest_first() {
        let mut rs: Vec<SurveyRecord> = (0..15)
            .map(|i| record(i, Satisfaction::Satisfied, 8))
            .collect();
        for (i, r) in rs.iter_mut().enumerate() {
            r.date = day(2024, 1, 1 + i as u32);
            if i % 5 != 0 {
                r.comments = format!("comment {}", i);
            }
        }
        let cs = recent_comments(&rs);
        assert_eq!(cs.len(), 10);
        assert_eq!(cs[0].record_id, 14);
        assert!(cs.iter().all(|c| !c.text.is_empty()));
        assert!(cs.windows(2).all(|w| w[0].date >= w[1].date));
    }

    #[test]
    fn bounds_hold_for_non_empty_sets() {
        let rs = vec![
            record(1, Satisfaction::HighlyDissatisfied, 0),
            record(2, Satisfaction::HighlyDissatisfied, 1),
        ];
        let s = summarize(&rs);
        assert_eq!(s.satisfaction_rate, Some(0.0));
        assert_eq!(s.nps.unwrap().score, -100);
        let rs = vec![record(1, Satisfaction::HighlySatisfied, 10)];
        let s = summarize(&rs);
        assert_eq!(s.satisfaction_rate, Some(100.0));
        assert_eq!(s.nps.unwrap().score, 100);
    }
}
