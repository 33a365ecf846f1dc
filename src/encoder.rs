//! Feature encoding shared by training and querying.
//!
//! Training rows and query rows go through the same [`EncoderState::encode`] call, so a
//! training record replayed as a query lands on exactly the same encoded row.

use crate::error::EncodeError;
use log::{debug, info};
use ndarray::{Array1, Array2, Axis};
use std::collections::BTreeMap;
use std::fmt;

/// Encoded column, in matrix order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Feature {
    Age,
    AnnualIncome,
    SpendingScore,
    GenreIsMale,
}

impl Feature {
    /// All encoded columns, in matrix order.
    pub const ALL: [Feature; 4] = [
        Feature::Age,
        Feature::AnnualIncome,
        Feature::SpendingScore,
        Feature::GenreIsMale,
    ];

    /// Standardised columns.
    pub const NUMERICAL: [Feature; 3] = [Feature::Age, Feature::AnnualIncome, Feature::SpendingScore];

    pub fn column_name(self) -> &'static str {
        match self {
            Feature::Age => "Age",
            Feature::AnnualIncome => "Annual Income (k$)",
            Feature::SpendingScore => "Spending Score (1-100)",
            Feature::GenreIsMale => "Genre_Male",
        }
    }

    /// Column index in the encoded matrix.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn column_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|f| f.column_name()).collect()
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Categorical column name in the source data.
pub const GENRE_COLUMN: &str = "Genre";

/// Known `Genre` categories, sorted. The first one is dropped by the one-hot encoding.
pub const GENRE_CATEGORIES: [&str; 2] = ["Female", "Male"];

/// One row of the training set, identifier already dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub age: f64,
    pub annual_income: f64,
    pub spending_score: f64,
    pub genre: String,
}

impl RawRecord {
    /// The record as a column-keyed query mapping, with the categorical value already
    /// turned into its indicator.
    pub fn to_query_fields(&self, state: &EncoderState) -> BTreeMap<String, FieldValue> {
        let indicator = if self.genre == state.positive_category { 1.0 } else { 0.0 };
        [
            (Feature::Age, self.age),
            (Feature::AnnualIncome, self.annual_income),
            (Feature::SpendingScore, self.spending_score),
            (Feature::GenreIsMale, indicator),
        ]
        .into_iter()
        .map(|(feature, value)| (feature.column_name().to_string(), FieldValue::Number(value)))
        .collect()
    }
}

/// A loosely typed query value, as received from a client.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Bool(bool),
    Text(String),
    Null,
    /// Anything else (arrays, objects), kept in its rendered form for error messages.
    Other(String),
}

impl FieldValue {
    /// Numeric value of a present field. `"NaN"` and `"inf"` parse as `f64` but are rejected.
    fn to_number(&self, feature: Feature) -> Result<f64, EncodeError> {
        let conversion_error = |value: String| EncodeError::TypeConversion { feature, value };
        let value = match self {
            FieldValue::Number(value) => *value,
            FieldValue::Bool(flag) => {
                if *flag {
                    1.0
                } else {
                    0.0
                }
            }
            FieldValue::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| conversion_error(format!("{:?}", text)))?,
            FieldValue::Null => return Err(EncodeError::MissingFeature(feature)),
            FieldValue::Other(rendered) => return Err(conversion_error(rendered.clone())),
        };
        if !value.is_finite() {
            let rendered = match self {
                FieldValue::Text(text) => format!("{:?}", text),
                _ => value.to_string(),
            };
            return Err(conversion_error(rendered));
        }
        Ok(value)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(flag) => FieldValue::Bool(flag),
            Value::Number(number) => match number.as_f64() {
                Some(value) => FieldValue::Number(value),
                None => FieldValue::Other(number.to_string()),
            },
            Value::String(text) => FieldValue::Text(text),
            other => FieldValue::Other(other.to_string()),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

/// Frozen standardisation parameters and category mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderState {
    means: [f64; 3],
    stds: [f64; 3],
    positive_category: String,
}

impl EncoderState {
    pub fn means(&self) -> &[f64; 3] {
        &self.means
    }

    /// Population standard deviations, with zero-variance columns reported as 1.0.
    pub fn stds(&self) -> &[f64; 3] {
        &self.stds
    }

    pub fn positive_category(&self) -> &str {
        &self.positive_category
    }

    /// Map an encoded value back to source units. The indicator column is returned as is.
    pub fn decode_value(&self, feature: Feature, encoded: f64) -> f64 {
        match feature {
            Feature::GenreIsMale => encoded,
            numerical => {
                let i = numerical.index();
                encoded * self.stds[i] + self.means[i]
            }
        }
    }

    /// Encode raw values given in [`Feature::ALL`] order, indicator included.
    fn encode(&self, raw: [f64; 4]) -> Array1<f64> {
        let mut row = Array1::<f64>::zeros(Feature::ALL.len());
        for feature in Feature::NUMERICAL {
            let i = feature.index();
            row[i] = (raw[i] - self.means[i]) / self.stds[i];
        }
        let g = Feature::GenreIsMale.index();
        row[g] = raw[g];
        row
    }

    /// Apply the frozen transform to a column-keyed query mapping.
    ///
    /// Fails on the first absent (or null) feature in column order, then on the first value
    /// that does not convert to a number.
    pub fn transform(&self, fields: &BTreeMap<String, FieldValue>) -> Result<Array1<f64>, EncodeError> {
        let present = |feature: Feature| {
            fields
                .get(feature.column_name())
                .filter(|value| **value != FieldValue::Null)
        };
        if let Some(missing) = Feature::ALL.into_iter().find(|&f| present(f).is_none()) {
            return Err(EncodeError::MissingFeature(missing));
        }

        let mut raw = [0.0; 4];
        for feature in Feature::ALL {
            if let Some(value) = present(feature) {
                raw[feature.index()] = value.to_number(feature)?;
            }
        }
        Ok(self.encode(raw))
    }
}

/// Fits an [`EncoderState`] on the training set and encodes it.
#[derive(Debug, Default)]
pub struct FeatureEncoder;

impl FeatureEncoder {
    pub fn new() -> Self {
        Self
    }

    pub fn fit(&self, records: &[RawRecord]) -> Result<(Array2<f64>, EncoderState), EncodeError> {
        if records.is_empty() {
            return Err(EncodeError::EmptyTrainingSet);
        }

        // Categories are sorted, so dropping the first one leaves the last as the indicator.
        let positive_category = GENRE_CATEGORIES[GENRE_CATEGORIES.len() - 1].to_string();

        let mut raw = Array2::<f64>::zeros((records.len(), Feature::ALL.len()));
        for (row, record) in records.iter().enumerate() {
            if !GENRE_CATEGORIES.contains(&record.genre.as_str()) {
                return Err(EncodeError::UnknownCategory {
                    feature: GENRE_COLUMN,
                    value: record.genre.clone(),
                    row,
                });
            }
            let values = [record.age, record.annual_income, record.spending_score];
            for (feature, value) in Feature::NUMERICAL.into_iter().zip(values) {
                if !value.is_finite() {
                    return Err(EncodeError::NonFinite { feature, row });
                }
                raw[[row, feature.index()]] = value;
            }
            raw[[row, Feature::GenreIsMale.index()]] =
                if record.genre == positive_category { 1.0 } else { 0.0 };
        }

        let mut means = [0.0; 3];
        let mut stds = [1.0; 3];
        for feature in Feature::NUMERICAL {
            let column = raw.index_axis(Axis(1), feature.index());
            let i = feature.index();
            means[i] = column.mean().unwrap_or(0.0);
            let std = column.std(0.0);
            if std > 0.0 {
                stds[i] = std;
            } else {
                debug!("{} has zero variance, centring only", feature);
            }
        }

        let state = EncoderState {
            means,
            stds,
            positive_category,
        };

        let mut encoded = Array2::<f64>::zeros(raw.raw_dim());
        for (mut out, row) in encoded.rows_mut().into_iter().zip(raw.rows()) {
            let values = [row[0], row[1], row[2], row[3]];
            out.assign(&state.encode(values));
        }

        info!(
            "Encoded {} records into {}x{} matrix (means {:?}, stds {:?})",
            records.len(),
            encoded.nrows(),
            encoded.ncols(),
            state.means,
            state.stds
        );

        Ok((encoded, state))
    }
}
