use serde::{Deserialize, Deserializer};

/// TeamCity is not consistent about quoting: ids, build numbers and second
/// counts show up both as JSON numbers and as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Loose {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Loose {
    fn into_string(self) -> String {
        match self {
            Loose::Int(v) => v.to_string(),
            Loose::Float(v) => v.to_string(),
            Loose::Str(v) => v,
        }
    }

    fn into_seconds(self) -> i64 {
        match self {
            Loose::Int(v) => v,
            Loose::Float(v) => v as i64,
            Loose::Str(v) => v.trim().parse().unwrap_or(0),
        }
    }
}

pub fn loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Loose::deserialize(deserializer).map(Loose::into_string)
}

pub fn loose_seconds<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Loose::deserialize(deserializer).map(Loose::into_seconds)
}

/// Case-sensitive substring test; no wildcard keeps everything.
pub fn matches_wildcard(id: &str, wildcard: Option<&str>) -> bool {
    wildcard.map_or(true, |w| id.contains(w))
}

pub fn normalize_field_names(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|s| s.replace("r#", ""))
        .collect::<Vec<String>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "loose_string")]
        id: String,
        #[serde(deserialize_with = "loose_seconds")]
        seconds: i64,
    }

    #[test]
    fn loose_values_test() {
        let a: Sample = serde_json::from_str(r#"{"id": 4307, "seconds": 10}"#).unwrap();
        let b: Sample = serde_json::from_str(r#"{"id": "4307", "seconds": "10"}"#).unwrap();
        let c: Sample = serde_json::from_str(r#"{"id": "x", "seconds": "soon"}"#).unwrap();

        assert_eq!((a.id.as_str(), a.seconds), ("4307", 10));
        assert_eq!((b.id.as_str(), b.seconds), ("4307", 10));
        assert_eq!(c.seconds, 0);
    }

    #[test]
    fn matches_wildcard_test() {
        let ids = ["Wildcard_A", "B_Wildcard", "C_Wildcard_C", "NoneProject"];

        let kept = ids.iter().filter(|id| matches_wildcard(id, Some("Wildcard"))).count();
        assert_eq!(kept, 3);

        assert!(ids.iter().all(|id| matches_wildcard(id, None)));
        assert!(!matches_wildcard("Wildcard_A", Some("wildcard")));
        assert!(!matches_wildcard("Wildcard_A", Some("Wild.*")));
    }

    #[test]
    fn normalize_field_names_test() {
        assert_eq!(normalize_field_names(&["id", "r#type", "projectName"]), "id,type,projectName");
    }
}
