use std::collections::HashSet;

use serde::Serialize;

use self::CategoricalAttribute as C;
use self::NumericFeature as N;

/// Number of slots the classifier was trained on.
pub const FEATURE_COUNT: usize = 33;

/// Guards `DTIRatio` against a zero income.
pub const DTI_EPSILON: f64 = 1e-6;

/// Continuous columns taken from the applicant record, plus the derived ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NumericFeature {
    Age,
    Income,
    LoanAmount,
    CreditScore,
    MonthsEmployed,
    NumCreditLines,
    InterestRate,
    LoanTerm,
    DtiRatio,
}

impl NumericFeature {
    pub const fn ordered() -> [Self; 9] {
        [
            Self::Age,
            Self::Income,
            Self::LoanAmount,
            Self::CreditScore,
            Self::MonthsEmployed,
            Self::NumCreditLines,
            Self::InterestRate,
            Self::LoanTerm,
            Self::DtiRatio,
        ]
    }

    pub const fn column(self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Income => "Income",
            Self::LoanAmount => "LoanAmount",
            Self::CreditScore => "CreditScore",
            Self::MonthsEmployed => "MonthsEmployed",
            Self::NumCreditLines => "NumCreditLines",
            Self::InterestRate => "InterestRate",
            Self::LoanTerm => "LoanTerm",
            Self::DtiRatio => "DTIRatio",
        }
    }
}

/// Enumerated applicant attributes expanded into one indicator slot per level.
///
/// `Default` is the applicant's prior-default flag. It is an input feature and has
/// nothing to do with the approval verdict produced by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CategoricalAttribute {
    Education,
    EmploymentType,
    MaritalStatus,
    HasMortgage,
    HasDependents,
    LoanPurpose,
    HasCoSigner,
    Default,
}

impl CategoricalAttribute {
    pub const COUNT: usize = 8;

    pub const fn ordered() -> [Self; Self::COUNT] {
        [
            Self::Education,
            Self::EmploymentType,
            Self::MaritalStatus,
            Self::HasMortgage,
            Self::HasDependents,
            Self::LoanPurpose,
            Self::HasCoSigner,
            Self::Default,
        ]
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Education => "Education",
            Self::EmploymentType => "EmploymentType",
            Self::MaritalStatus => "MaritalStatus",
            Self::HasMortgage => "HasMortgage",
            Self::HasDependents => "HasDependents",
            Self::LoanPurpose => "LoanPurpose",
            Self::HasCoSigner => "HasCoSigner",
            Self::Default => "Default",
        }
    }

    /// Accepted input values, in the order their indicator slots appear.
    pub const fn domain(self) -> &'static [&'static str] {
        match self {
            Self::Education => &["Bachelor's", "High School", "Master's", "PhD"],
            Self::EmploymentType => &["Full-time", "Part-time", "Self-employed", "Unemployed"],
            Self::MaritalStatus => &["Divorced", "Married", "Single"],
            Self::HasMortgage | Self::HasDependents | Self::HasCoSigner => &["No", "Yes"],
            Self::LoanPurpose => &["Auto", "Business", "Education", "Home", "Other"],
            Self::Default => &["No", "Yes"],
        }
    }

    /// Column suffixes for each level. `Default` is binarized before expansion,
    /// so its columns are `Default_0` / `Default_1` rather than `No` / `Yes`.
    pub const fn levels(self) -> &'static [&'static str] {
        match self {
            Self::Default => &["0", "1"],
            other => other.domain(),
        }
    }

    /// Maps a raw input value to its level. Matching is exact and case-sensitive.
    pub fn encode(self, raw: &str) -> Option<&'static str> {
        self.domain()
            .iter()
            .position(|candidate| *candidate == raw)
            .map(|position| self.levels()[position])
    }
}

/// Source of a single slot in the feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSource {
    Numeric(NumericFeature),
    Indicator {
        attribute: CategoricalAttribute,
        level: &'static str,
    },
}

/// A named position in the classifier's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSlot {
    pub column: &'static str,
    pub source: SlotSource,
}

const fn numeric(feature: NumericFeature) -> FeatureSlot {
    FeatureSlot {
        column: feature.column(),
        source: SlotSource::Numeric(feature),
    }
}

const fn indicator(
    column: &'static str,
    attribute: CategoricalAttribute,
    level: &'static str,
) -> FeatureSlot {
    FeatureSlot {
        column,
        source: SlotSource::Indicator { attribute, level },
    }
}

/// Training-time column order. The classifier reads slots positionally, so this
/// list is the contract and must never be derived from map iteration.
pub static FEATURE_SCHEMA: [FeatureSlot; FEATURE_COUNT] = [
    numeric(N::Age),
    numeric(N::Income),
    numeric(N::LoanAmount),
    numeric(N::CreditScore),
    numeric(N::MonthsEmployed),
    numeric(N::NumCreditLines),
    numeric(N::InterestRate),
    numeric(N::LoanTerm),
    numeric(N::DtiRatio),
    indicator("Education_Bachelor's", C::Education, "Bachelor's"),
    indicator("Education_High School", C::Education, "High School"),
    indicator("Education_Master's", C::Education, "Master's"),
    indicator("Education_PhD", C::Education, "PhD"),
    indicator("EmploymentType_Full-time", C::EmploymentType, "Full-time"),
    indicator("EmploymentType_Part-time", C::EmploymentType, "Part-time"),
    indicator("EmploymentType_Self-employed", C::EmploymentType, "Self-employed"),
    indicator("EmploymentType_Unemployed", C::EmploymentType, "Unemployed"),
    indicator("MaritalStatus_Divorced", C::MaritalStatus, "Divorced"),
    indicator("MaritalStatus_Married", C::MaritalStatus, "Married"),
    indicator("MaritalStatus_Single", C::MaritalStatus, "Single"),
    indicator("HasMortgage_No", C::HasMortgage, "No"),
    indicator("HasMortgage_Yes", C::HasMortgage, "Yes"),
    indicator("HasDependents_No", C::HasDependents, "No"),
    indicator("HasDependents_Yes", C::HasDependents, "Yes"),
    indicator("LoanPurpose_Auto", C::LoanPurpose, "Auto"),
    indicator("LoanPurpose_Business", C::LoanPurpose, "Business"),
    indicator("LoanPurpose_Education", C::LoanPurpose, "Education"),
    indicator("LoanPurpose_Home", C::LoanPurpose, "Home"),
    indicator("LoanPurpose_Other", C::LoanPurpose, "Other"),
    indicator("HasCoSigner_No", C::HasCoSigner, "No"),
    indicator("HasCoSigner_Yes", C::HasCoSigner, "Yes"),
    indicator("Default_0", C::Default, "0"),
    indicator("Default_1", C::Default, "1"),
];

/// Column names in schema order.
pub fn feature_names() -> impl Iterator<Item = &'static str> {
    FEATURE_SCHEMA.iter().map(|slot| slot.column)
}

/// Position of a column in the schema.
pub fn position(column: &str) -> Option<usize> {
    FEATURE_SCHEMA.iter().position(|slot| slot.column == column)
}

/// Describes why a slot list does not line up with the attribute definitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaViolation {
    #[error("expected {expected} slots, found {found}")]
    Length { expected: usize, found: usize },
    #[error("column '{column}' appears more than once")]
    Duplicate { column: String },
    #[error("slot {index} is '{found}', expected '{expected}'")]
    Misplaced {
        index: usize,
        expected: String,
        found: String,
    },
}

/// Checks a slot list against the numeric and categorical definitions: numeric
/// columns first, then each attribute's block in attribute order with its
/// levels in domain order, every column named `<Attribute>_<level>`.
pub fn validate(slots: &[FeatureSlot]) -> Result<(), SchemaViolation> {
    let expected = expected_layout();
    if slots.len() != expected.len() {
        return Err(SchemaViolation::Length {
            expected: expected.len(),
            found: slots.len(),
        });
    }

    let mut seen = HashSet::with_capacity(slots.len());
    for slot in slots {
        if !seen.insert(slot.column) {
            return Err(SchemaViolation::Duplicate {
                column: slot.column.to_string(),
            });
        }
    }

    for (index, (slot, (column, source))) in slots.iter().zip(expected).enumerate() {
        if slot.column != column || slot.source != source {
            return Err(SchemaViolation::Misplaced {
                index,
                expected: column,
                found: slot.column.to_string(),
            });
        }
    }

    Ok(())
}

fn expected_layout() -> Vec<(String, SlotSource)> {
    let numeric = NumericFeature::ordered()
        .into_iter()
        .map(|feature| (feature.column().to_string(), SlotSource::Numeric(feature)));

    let indicators = CategoricalAttribute::ordered()
        .into_iter()
        .flat_map(|attribute| {
            attribute.levels().iter().map(move |&level| {
                (
                    format!("{}_{}", attribute.name(), level),
                    SlotSource::Indicator { attribute, level },
                )
            })
        });

    numeric.chain(indicators).collect()
}
