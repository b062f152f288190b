use crate::models::{EmotionBar, HistoryRecord, MoodPoint};
use std::collections::BTreeMap;

/// Colour code for an emotion name, matching the palette the mood charts
/// have always used. Matching is by substring so "very sad" and "sadness"
/// land on the same colour.
pub fn emotion_color(emotion: &str) -> &'static str {
    let emotion = emotion.to_lowercase();
    let contains = |needle: &str| emotion.contains(needle);
    if contains("joy") || contains("happy") {
        "#FFD700"
    } else if contains("sad") {
        "#4C9AFF"
    } else if contains("anger") {
        "#FF4C4C"
    } else if contains("calm") {
        "#56E39F"
    } else if contains("fear") || contains("anxiety") {
        "#FFA500"
    } else if contains("disgust") {
        "#8FBC8F"
    } else if contains("surprise") {
        "#BA68C8"
    } else if contains("depression") {
        "#708090"
    } else if contains("loneliness") {
        "#A0A0A0"
    } else {
        "#667EEA"
    }
}

pub fn emotion_emoji(emotion: &str) -> &'static str {
    const EMOJI: [(&str, &str); 10] = [
        ("joy", "😀"),
        ("happy", "😊"),
        ("sadness", "😢"),
        ("anger", "😡"),
        ("calm", "😌"),
        ("fear", "😨"),
        ("anxiety", "😰"),
        ("surprise", "😲"),
        ("disgust", "🤢"),
        ("depression", "🥀"),
    ];
    let emotion = emotion.to_lowercase();
    EMOJI
        .iter()
        .find(|(name, _)| emotion.contains(name))
        .map(|(_, emoji)| *emoji)
        .unwrap_or("😐")
}

/// Per-emotion bars for the current entry: score fractions rounded to whole
/// percentages, each with its chart colour.
pub fn emotion_bars(scores: &BTreeMap<String, f64>) -> Vec<EmotionBar> {
    scores
        .iter()
        .map(|(emotion, score)| EmotionBar {
            emotion: emotion.clone(),
            percent: (score * 100.0).round() as i64,
            color: emotion_color(emotion).to_string(),
        })
        .collect()
}

/// One chart point per history record: the date part of the timestamp, the
/// dominant emotion's own score (0 when the service omits it), and the
/// emotion's colour.
pub fn build_mood_history(records: &[HistoryRecord]) -> Vec<MoodPoint> {
    records
        .iter()
        .map(|record| {
            let label = record
                .timestamp
                .split_whitespace()
                .next()
                .unwrap_or(record.timestamp.as_str())
                .to_string();
            let value = record
                .emotion_scores
                .get(&record.dominant_emotion)
                .copied()
                .unwrap_or(0.0);
            MoodPoint {
                label,
                emotion: record.dominant_emotion.clone(),
                value,
                color: emotion_color(&record.dominant_emotion).to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(timestamp: &str, dominant: &str, scores: &[(&str, f64)]) -> HistoryRecord {
        HistoryRecord {
            timestamp: timestamp.to_string(),
            dominant_emotion: dominant.to_string(),
            emotion_scores: scores
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect(),
        }
    }

    #[test]
    fn one_point_per_record_with_dominant_score() {
        let records = vec![
            record("2026-08-01 10:15:00", "joy", &[("joy", 0.82), ("calm", 0.1)]),
            record("2026-08-02 21:03:11", "sadness", &[("sadness", 0.64)]),
        ];
        let points = build_mood_history(&records);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].label, "2026-08-01");
        assert_eq!(points[0].value, 0.82);
        assert_eq!(points[0].color, "#FFD700");
        assert_eq!(points[1].value, 0.64);
        assert_eq!(points[1].color, "#4C9AFF");
    }

    #[test]
    fn missing_dominant_score_falls_back_to_zero() {
        let points = build_mood_history(&[record("2026-08-03 09:00:00", "anger", &[])]);
        assert_eq!(points[0].value, 0.0);
        assert_eq!(points[0].emotion, "anger");
    }

    #[test]
    fn colors_match_by_substring() {
        assert_eq!(emotion_color("Happy"), "#FFD700");
        assert_eq!(emotion_color("deep sadness"), "#4C9AFF");
        assert_eq!(emotion_color("anxiety attack"), "#FFA500");
        assert_eq!(emotion_color("unknown"), "#667EEA");
    }

    #[test]
    fn emoji_has_a_neutral_fallback() {
        assert_eq!(emotion_emoji("JOY"), "😀");
        assert_eq!(emotion_emoji("calmness"), "😌");
        assert_eq!(emotion_emoji("confusion"), "😐");
    }

    #[test]
    fn bars_round_to_whole_percentages() {
        let mut scores = BTreeMap::new();
        scores.insert("joy".to_string(), 0.824);
        scores.insert("fear".to_string(), 0.176);
        let bars = emotion_bars(&scores);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].emotion, "joy");
        assert_eq!(bars[1].percent, 82);
        assert_eq!(bars[0].percent, 18);
    }
}
