use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use super::schema::{CategoricalAttribute, NumericFeature, DTI_EPSILON};

/// One loan applicant as submitted at the request boundary.
///
/// Numeric fields are type-checked during deserialization; integer fields also
/// accept floats with no fractional part (`35.0`). Categorical fields are
/// accepted as free-form strings and checked against their domains during
/// feature reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApplicantRecord {
    #[serde(deserialize_with = "integral")]
    pub age: i64,
    #[serde(deserialize_with = "integral")]
    pub income: i64,
    #[serde(deserialize_with = "integral")]
    pub loan_amount: i64,
    #[serde(deserialize_with = "integral")]
    pub credit_score: i64,
    #[serde(deserialize_with = "integral")]
    pub months_employed: i64,
    #[serde(deserialize_with = "integral")]
    pub num_credit_lines: i64,
    pub interest_rate: f64,
    #[serde(deserialize_with = "integral")]
    pub loan_term: i64,
    pub education: String,
    pub employment_type: String,
    pub marital_status: String,
    pub has_mortgage: String,
    pub has_dependents: String,
    pub loan_purpose: String,
    pub has_co_signer: String,
    /// Whether the applicant defaulted on a previous loan ("Yes" / "No"). An input
    /// feature, not the approval outcome.
    #[serde(rename = "Default")]
    pub prior_default: String,
}

impl ApplicantRecord {
    /// `LoanAmount / (Income + 1e-6)`, finite for a zero income.
    pub fn dti_ratio(&self) -> f64 {
        self.loan_amount as f64 / (self.income as f64 + DTI_EPSILON)
    }

    pub fn numeric(&self, feature: NumericFeature) -> f64 {
        match feature {
            NumericFeature::Age => self.age as f64,
            NumericFeature::Income => self.income as f64,
            NumericFeature::LoanAmount => self.loan_amount as f64,
            NumericFeature::CreditScore => self.credit_score as f64,
            NumericFeature::MonthsEmployed => self.months_employed as f64,
            NumericFeature::NumCreditLines => self.num_credit_lines as f64,
            NumericFeature::InterestRate => self.interest_rate,
            NumericFeature::LoanTerm => self.loan_term as f64,
            NumericFeature::DtiRatio => self.dti_ratio(),
        }
    }

    pub fn categorical(&self, attribute: CategoricalAttribute) -> &str {
        match attribute {
            CategoricalAttribute::Education => &self.education,
            CategoricalAttribute::EmploymentType => &self.employment_type,
            CategoricalAttribute::MaritalStatus => &self.marital_status,
            CategoricalAttribute::HasMortgage => &self.has_mortgage,
            CategoricalAttribute::HasDependents => &self.has_dependents,
            CategoricalAttribute::LoanPurpose => &self.loan_purpose,
            CategoricalAttribute::HasCoSigner => &self.has_co_signer,
            CategoricalAttribute::Default => &self.prior_default,
        }
    }
}

/// Largest magnitude at which every integer is exactly representable as `f64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn integral<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(IntegralVisitor)
}

struct IntegralVisitor;

impl Visitor<'_> for IntegralVisitor {
    type Value = i64;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an integer or a float with no fractional part")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<i64, E> {
        Ok(value)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<i64, E> {
        i64::try_from(value).map_err(|_| E::invalid_value(de::Unexpected::Unsigned(value), &self))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<i64, E> {
        if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
            Ok(value as i64)
        } else {
            Err(E::invalid_value(de::Unexpected::Float(value), &self))
        }
    }
}
