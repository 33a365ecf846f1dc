//! Everything the service reads after startup, built once and never mutated.

use crate::config::{AlgorithmPolicy, ClusteringConfig, Config};
use crate::dataset;
use crate::encoder::{EncoderState, FeatureEncoder, RawRecord};
use crate::error::StartupError;
use crate::model_bank::ModelBank;
use log::info;
use ndarray::{Array2, ArrayView2};
use std::path::PathBuf;

/// Trained, read-only state shared by every request handler.
#[derive(Debug)]
pub struct SegmentationContext {
    encoder: EncoderState,
    x: Array2<f64>,
    bank: ModelBank,
    policy: AlgorithmPolicy,
    source: Option<PathBuf>,
}

impl SegmentationContext {
    pub fn encoder(&self) -> &EncoderState {
        &self.encoder
    }

    /// Encoded training matrix.
    pub fn x(&self) -> ArrayView2<'_, f64> {
        self.x.view()
    }

    pub fn bank(&self) -> &ModelBank {
        &self.bank
    }

    pub fn policy(&self) -> AlgorithmPolicy {
        self.policy
    }

    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    /// Dataset file the context was trained on, if it came from disk.
    pub fn source(&self) -> Option<&PathBuf> {
        self.source.as_ref()
    }
}

/// Load, encode and train, in that order. Any failure aborts the build.
pub struct SegmentationContextBuilder {
    clustering: ClusteringConfig,
    policy: AlgorithmPolicy,
    candidate_paths: Vec<String>,
    records: Option<Vec<RawRecord>>,
}

impl SegmentationContextBuilder {
    /// Create a new builder from a config.
    pub fn new(config: &Config) -> Self {
        Self {
            clustering: config.clustering.clone(),
            policy: config.algorithm_policy,
            candidate_paths: config.data.candidate_paths.clone(),
            records: None,
        }
    }

    /// Train on in-memory records instead of probing the candidate paths.
    pub fn with_records(mut self, records: Vec<RawRecord>) -> Self {
        self.records = Some(records);
        self
    }

    pub fn build(self) -> Result<SegmentationContext, StartupError> {
        let (source, records) = match self.records {
            Some(records) => (None, records),
            None => {
                let (path, records) = dataset::load(self.candidate_paths.as_slice())?;
                (Some(path), records)
            }
        };

        let (x, encoder) = FeatureEncoder::new().fit(&records)?;
        let bank = ModelBank::train(&x.view(), &self.clustering)?;

        info!(
            "Segmentation context ready: {} samples, {} features",
            x.nrows(),
            x.ncols()
        );

        Ok(SegmentationContext {
            encoder,
            x,
            bank,
            policy: self.policy,
            source,
        })
    }
}
