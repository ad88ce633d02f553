//! Workout log record, as extracted from free-text or dictated descriptions.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One logged exercise
///
/// Field names match both the workout file header and the JSON keys the
/// AI backends are asked to produce.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    #[serde(rename = "Exercise", default, deserialize_with = "text_or_empty")]
    pub exercise: String,
    #[serde(rename = "Target_Muscle", default, deserialize_with = "text_or_empty")]
    pub target_muscle: String,
    /// Upper Body, Lower Body, Core or Full Body
    #[serde(rename = "Region", default, deserialize_with = "text_or_empty")]
    pub region: String,
    /// Free form, e.g. "3x10" or "4 sets of 8"
    #[serde(rename = "Target_Sets_Reps", default, deserialize_with = "text_or_empty")]
    pub target_sets_reps: String,
    #[serde(rename = "Min_Weight", default, deserialize_with = "optional_number")]
    pub min_weight: Option<f64>,
    #[serde(rename = "Max_Weight", default, deserialize_with = "optional_number")]
    pub max_weight: Option<f64>,
    /// Total reps or reps per set; models answer with either a number or a string
    #[serde(rename = "Reps", default, deserialize_with = "text_or_empty")]
    pub reps: String,
    #[serde(rename = "Notes", default, deserialize_with = "text_or_empty")]
    pub notes: String,
}

impl WorkoutRecord {
    /// A record is worth saving only if it names an exercise
    pub fn is_complete(&self) -> bool {
        !self.exercise.trim().is_empty()
    }
}

/// Accept strings, numbers or null and keep them as text
fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

/// Accept numbers, numeric strings, empty strings or null
fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            // "60kg" and similar: keep the leading number
            let numeric: String = s
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            numeric
                .parse()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("invalid weight '{s}'")))
        }
        other => Err(serde::de::Error::custom(format!("invalid weight {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_model_reply() {
        let json = r#"{
            "Exercise": "Bench Press",
            "Target_Muscle": "Chest",
            "Region": "Upper Body",
            "Target_Sets_Reps": "3x10",
            "Min_Weight": 40,
            "Max_Weight": "60kg",
            "Reps": 30,
            "Notes": null
        }"#;
        let record: WorkoutRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.exercise, "Bench Press");
        assert_eq!(record.min_weight, Some(40.0));
        assert_eq!(record.max_weight, Some(60.0));
        assert_eq!(record.reps, "30");
        assert_eq!(record.notes, "");
        assert!(record.is_complete());
    }

    #[test]
    fn test_missing_keys_default() {
        let record: WorkoutRecord = serde_json::from_str(r#"{"Exercise": "Squat"}"#).unwrap();
        assert_eq!(record.exercise, "Squat");
        assert_eq!(record.min_weight, None);
        assert_eq!(record.region, "");
    }

    #[test]
    fn test_incomplete_record() {
        assert!(!WorkoutRecord::default().is_complete());
    }
}
