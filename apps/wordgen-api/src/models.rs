//! Data models for WordGen API

use chrono::{DateTime, Utc};
use docx_engine::{GenerationInput, Segmentation};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use docx_engine::grammar::{MAX_COMPANIES, MAX_SEGMENTS, MAX_SUB_SEGMENTS};

/// Report generation request
///
/// Segmentations arrive either structured under `segmentations` or as
/// flat `Segment1`, `Segment1Sub-segment1`, ... keys. Company names are
/// always flat `Company1` through `Company10` keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(
        default,
        deserialize_with = "nullable_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub market_name: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "nullable_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub segmentations: Option<Option<Vec<Segmentation>>>,
    /// Flat keys and anything else the client sent.
    #[serde(flatten)]
    pub fields: serde_json::Map<String, Value>,
}

/// Keeps an explicitly supplied `null` distinguishable from an absent
/// key: the outer `Option` is presence, the inner the value.
fn nullable_field<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl GenerateRequest {
    /// True for a body that carries nothing at all, `{}` included.
    pub fn is_empty(&self) -> bool {
        self.market_name.is_none() && self.segmentations.is_none() && self.fields.is_empty()
    }

    pub fn market_name(&self) -> &str {
        self.market_name_field().unwrap_or("")
    }

    /// Market name as stored in the audit row: absent and null keys
    /// both come out as no value.
    pub fn market_name_field(&self) -> Option<&str> {
        self.market_name.as_ref().and_then(|m| m.as_deref())
    }

    /// The structured list wins when present; otherwise segmentations
    /// are rebuilt from flat keys, reading consecutive slots until the
    /// first missing or non-string one.
    pub fn resolve_segmentations(&self) -> Vec<Segmentation> {
        if let Some(Some(segmentations)) = &self.segmentations {
            return segmentations.clone();
        }

        let mut segmentations = Vec::new();
        for i in 1..=MAX_SEGMENTS {
            let Some(name) = self.flat_string(&format!("Segment{i}")) else {
                break;
            };
            let mut sub_segments = Vec::new();
            for j in 1..=MAX_SUB_SEGMENTS {
                let Some(sub) = self.flat_string(&format!("Segment{i}Sub-segment{j}")) else {
                    break;
                };
                sub_segments.push(sub);
            }
            segmentations.push(Segmentation { name, sub_segments });
        }
        segmentations
    }

    /// Company names for the ten fixed slots, missing keys as empty
    /// strings.
    pub fn companies(&self) -> Vec<String> {
        (1..=MAX_COMPANIES)
            .map(|k| {
                self.flat_string(&format!("Company{k}"))
                    .unwrap_or_default()
            })
            .collect()
    }

    pub fn to_generation_input(&self) -> GenerationInput {
        GenerationInput {
            market_name: self.market_name().to_string(),
            segmentations: self.resolve_segmentations(),
            companies: self.companies(),
        }
    }

    fn flat_string(&self, key: &str) -> Option<String> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .map(|s| s.to_string())
    }
}

/// Generation audit row stored in database
#[derive(Debug, Clone, FromRow)]
pub struct GenerationRecord {
    pub id: String,
    pub user_id: String,
    pub filename: String,
    pub market_name: Option<String>,
    pub input_json: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}
