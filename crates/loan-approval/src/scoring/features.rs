use serde::ser::SerializeMap;
use serde::Serialize;
use tracing::warn;

use super::applicant::ApplicantRecord;
use super::schema::{
    self, CategoricalAttribute, SchemaViolation, SlotSource, FEATURE_COUNT, FEATURE_SCHEMA,
};

/// How to treat a categorical value outside its attribute's domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownCategoryPolicy {
    /// Fail the request with [`ReconstructionError::UnknownCategory`].
    #[default]
    Reject,
    /// Leave every indicator of the attribute at zero.
    ZeroFill,
}

impl UnknownCategoryPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reject" | "strict" => Some(Self::Reject),
            "zero-fill" | "zero_fill" | "zerofill" => Some(Self::ZeroFill),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::ZeroFill => "zero-fill",
        }
    }
}

/// Failure while turning an applicant into classifier input.
#[derive(Debug, thiserror::Error)]
pub enum ReconstructionError {
    #[error(
        "unknown {} value '{value}' (expected one of: {})",
        .attribute.name(),
        .attribute.domain().join(", ")
    )]
    UnknownCategory {
        attribute: CategoricalAttribute,
        value: String,
    },
    #[error("malformed applicant record: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("feature schema is inconsistent: {0}")]
    Schema(#[from] SchemaViolation),
}

/// Dense classifier input laid out in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        schema::position(column).map(|index| self.values[index])
    }

    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        schema::feature_names().zip(self.values.iter().copied())
    }
}

impl Serialize for FeatureVector {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.named() {
            map.serialize_entry(column, &value)?;
        }
        map.end()
    }
}

/// Projects applicant records onto the training-time feature schema.
#[derive(Debug, Clone, Copy)]
pub struct FeatureReconstructor {
    policy: UnknownCategoryPolicy,
}

impl FeatureReconstructor {
    pub fn new(policy: UnknownCategoryPolicy) -> Result<Self, ReconstructionError> {
        schema::validate(&FEATURE_SCHEMA)?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> UnknownCategoryPolicy {
        self.policy
    }

    pub fn reconstruct(
        &self,
        record: &ApplicantRecord,
    ) -> Result<FeatureVector, ReconstructionError> {
        let mut active: [Option<&'static str>; CategoricalAttribute::COUNT] =
            [None; CategoricalAttribute::COUNT];

        for attribute in CategoricalAttribute::ordered() {
            let raw = record.categorical(attribute);
            match attribute.encode(raw) {
                Some(level) => active[attribute.index()] = Some(level),
                None => match self.policy {
                    UnknownCategoryPolicy::Reject => {
                        return Err(ReconstructionError::UnknownCategory {
                            attribute,
                            value: raw.to_string(),
                        })
                    }
                    UnknownCategoryPolicy::ZeroFill => {
                        warn!(
                            attribute = attribute.name(),
                            value = raw,
                            "unknown category value, indicator block left empty"
                        );
                    }
                },
            }
        }

        let values = std::array::from_fn(|index| match FEATURE_SCHEMA[index].source {
            SlotSource::Numeric(feature) => record.numeric(feature),
            SlotSource::Indicator { attribute, level } => {
                if active[attribute.index()] == Some(level) {
                    1.0
                } else {
                    0.0
                }
            }
        });

        Ok(FeatureVector { values })
    }

    /// Deserializes an untyped payload first so missing or mistyped fields surface
    /// as reconstruction failures.
    pub fn reconstruct_value(
        &self,
        payload: serde_json::Value,
    ) -> Result<FeatureVector, ReconstructionError> {
        let record: ApplicantRecord = serde_json::from_value(payload)?;
        self.reconstruct(&record)
    }
}
