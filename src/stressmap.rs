use crate::models::{AreaProperties, MapFeature, MapStats};

/// Rolls the per-pincode features up into the headline figures shown beside
/// the map: area count, assessment count, assessment-weighted average score,
/// and the number of high-risk ("concerning") areas.
pub fn aggregate(features: &[MapFeature]) -> MapStats {
    let mut total_assessments: u64 = 0;
    let mut weighted_score = 0.0;
    let mut high_risk_areas = 0;

    for feature in features {
        let props = &feature.properties;
        total_assessments += props.total_assessments;
        weighted_score += props.average_score * props.total_assessments as f64;
        if props.stress_level == "concerning" {
            high_risk_areas += 1;
        }
    }

    let average_score = if total_assessments > 0 {
        (weighted_score / total_assessments as f64 * 10.0).round() / 10.0
    } else {
        0.0
    };

    MapStats {
        total_pincodes: features.len(),
        total_assessments,
        average_score,
        high_risk_areas,
    }
}

pub fn find_pincode<'a>(features: &'a [MapFeature], pincode: &str) -> Option<&'a AreaProperties> {
    features
        .iter()
        .map(|feature| &feature.properties)
        .find(|props| props.pincode == pincode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(pincode: &str, level: &str, assessments: u64, score: f64) -> MapFeature {
        MapFeature {
            properties: AreaProperties {
                pincode: pincode.to_string(),
                color: "#ff0000".to_string(),
                stress_level: level.to_string(),
                total_assessments: assessments,
                average_score: score,
                office_name: None,
                district: None,
                region: None,
            },
        }
    }

    #[test]
    fn aggregation_weights_scores_by_assessment_count() {
        let features = vec![
            feature("110001", "good", 10, 120.0),
            feature("560001", "concerning", 30, 320.0),
        ];
        let stats = aggregate(&features);
        assert_eq!(stats.total_pincodes, 2);
        assert_eq!(stats.total_assessments, 40);
        assert_eq!(stats.high_risk_areas, 1);
        // (10*120 + 30*320) / 40 = 270.0
        assert_eq!(stats.average_score, 270.0);
    }

    #[test]
    fn empty_feature_set_yields_zeroes() {
        let stats = aggregate(&[]);
        assert_eq!(stats.total_pincodes, 0);
        assert_eq!(stats.average_score, 0.0);
    }

    #[test]
    fn pincode_lookup() {
        let features = vec![feature("110001", "good", 5, 100.0)];
        assert!(find_pincode(&features, "110001").is_some());
        assert!(find_pincode(&features, "999999").is_none());
    }
}
