use log::debug;

use crate::aggregation::{satisfaction_rate, TARGET_AVERAGE, WARNING_AVERAGE};
use crate::config::*;

const TOP_PERFORMING: usize = 3;
// Percentage of satisfied customers below which interviews are recommended.
const SATISFACTION_RATE_TARGET: f64 = 70.0;

pub const LOW_SATISFACTION_RECOMMENDATION: &str =
    "Overall satisfaction is below 70% - conduct detailed customer interviews";

pub const MAINTAIN_RECOMMENDATIONS: [&str; 3] = [
    "Excellent performance across all metrics - focus on maintaining standards",
    "Consider implementing loyalty programs to enhance customer retention",
    "Share best practices with other locations or departments",
];

/// The corrective action for an attribute that scores badly.
pub fn attribute_recommendation(attribute: Attribute) -> &'static str {
    match attribute {
        Attribute::FoodQuality => "Implement food quality training programs for kitchen staff",
        Attribute::ServiceQuality => "Enhance customer service training and response times",
        Attribute::Hygiene => "Review and strengthen hygiene protocols and monitoring",
        Attribute::ValueForMoney => "Analyze pricing strategy and consider menu optimization",
    }
}

/// The best attributes, highest average first. Ties keep the input order.
pub fn top_performing(averages: &[(Attribute, f64)]) -> Vec<(Attribute, f64)> {
    let mut sorted = averages.to_vec();
    // sort_by is stable.
    sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    sorted.truncate(TOP_PERFORMING);
    sorted
}

/// The attributes under target, worst first. An empty list means that all the
/// areas are performing well.
pub fn improvement_areas(averages: &[(Attribute, f64)]) -> Vec<(Attribute, f64)> {
    let mut res: Vec<(Attribute, f64)> = averages
        .iter()
        .filter(|(_, avg)| *avg < TARGET_AVERAGE)
        .cloned()
        .collect();
    res.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    res
}

/// Rule-based recommendations. The satisfaction rate rule comes first, then one
/// rule per attribute in attribute order. If nothing triggers, the standard
/// maintenance recommendations are returned.
pub fn recommendations(
    averages: &[(Attribute, f64)],
    records: &[SurveyRecord],
) -> Vec<String> {
    let mut res: Vec<String> = Vec::new();
    if let Some(rate) = satisfaction_rate(records) {
        if rate < SATISFACTION_RATE_TARGET {
            res.push(LOW_SATISFACTION_RECOMMENDATION.to_string());
        }
    }
    for attribute in Attribute::ALL.iter() {
        let low = averages
            .iter()
            .any(|(a, avg)| a == attribute && *avg < WARNING_AVERAGE);
        if low {
            res.push(attribute_recommendation(*attribute).to_string());
        }
    }
    if res.is_empty() {
        res = MAINTAIN_RECOMMENDATIONS
            .iter()
            .map(|s| s.to_string())
            .collect();
    }
    res
}

pub fn generate_insights(averages: &[(Attribute, f64)], records: &[SurveyRecord]) -> Insights {
    let insights = Insights {
        top_performing: top_performing(averages),
        improvement_areas: improvement_areas(averages),
        recommendations: recommendations(averages, records),
    };
    debug!("generate_insights: {:?}", insights);
    insights
}

#[cfg(test)]
mod tests {
    use super::*;

    fn averages() -> Vec<(Attribute, f64)> {
        vec![
            (Attribute::FoodQuality, 4.5),
            (Attribute::ServiceQuality, 3.0),
            (Attribute::Hygiene, 4.8),
            (Attribute::ValueForMoney, 2.0),
        ]
    }

    fn record(s: Satisfaction) -> SurveyRecord {
        SurveyRecord {
            id: 1,
            date: None,
            customer_id: "C1".to_string(),
            food_quality: 4,
            service_quality: 4,
            hygiene: 4,
            value_for_money: 4,
            overall_satisfaction: s,
            comments: "".to_string(),
            nps_score: 8,
        }
    }

    fn names(v: &[(Attribute, f64)]) -> Vec<Attribute> {
        v.iter().map(|p| p.0).collect()
    }

    #[test]
    fn ranking() {
        let avgs = averages();
        assert_eq!(
            names(&top_performing(&avgs)),
            vec![
                Attribute::Hygiene,
                Attribute::FoodQuality,
                Attribute::ServiceQuality
            ]
        );
        assert_eq!(
            names(&improvement_areas(&avgs)),
            vec![Attribute::ValueForMoney, Attribute::ServiceQuality]
        );
    }

    #[test]
    fn ties_keep_attribute_order() {
        let avgs: Vec<(Attribute, f64)> = Attribute::ALL.iter().map(|a| (*a, 4.2)).collect();
        assert_eq!(
            names(&top_performing(&avgs)),
            vec![
                Attribute::FoodQuality,
                Attribute::ServiceQuality,
                Attribute::Hygiene
            ]
        );
        assert!(improvement_areas(&avgs).is_empty());
    }

    #[test]
    fn recommendation_order() {
        let rs = vec![record(Satisfaction::Neutral), record(Satisfaction::Satisfied)];
        let recs = recommendations(&averages(), &rs);
        assert_eq!(
            recs,
            vec![
                LOW_SATISFACTION_RECOMMENDATION.to_string(),
                attribute_recommendation(Attribute::ServiceQuality).to_string(),
                attribute_recommendation(Attribute::ValueForMoney).to_string(),
            ]
        );
    }

    #[test]
    fn maintain_when_nothing_triggers() {
        let rs = vec![record(Satisfaction::HighlySatisfied)];
        let avgs: Vec<(Attribute, f64)> = Attribute::ALL.iter().map(|a| (*a, 3.6)).collect();
        let insights = generate_insights(&avgs, &rs);
        assert_eq!(insights.recommendations.len(), 3);
        assert_eq!(insights.recommendations[0], MAINTAIN_RECOMMENDATIONS[0]);
        // 3.6 is under target but above the warning threshold.
        assert_eq!(insights.improvement_areas.len(), 4);
        assert!(!insights.all_areas_performing_well());
    }
}
