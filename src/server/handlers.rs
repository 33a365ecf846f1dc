//! Request handlers. All of them only read the shared [`SegmentationContext`].

use super::error::ApiError;
use crate::clustering::ClusterId;
use crate::config::AlgorithmPolicy;
use crate::context::SegmentationContext;
use crate::encoder::{Feature, FieldValue};
use crate::metrics::QualityScores;
use crate::model_bank::Strategy;
use crate::profiler::{self, ClusterProfile, FeatureSummary};
use crate::projection::{self, ProjectedPoint};
use crate::resolver::AssignmentResolver;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

pub type SharedContext = Arc<SegmentationContext>;

const DEFAULT_ALGORITHM: &str = "agglomerative";

/// Whether an endpoint may fall back to the divisive strategy for unknown names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fallback {
    Divisive,
    Never,
}

fn resolve_strategy(name: &str, policy: AlgorithmPolicy, fallback: Fallback) -> Result<Strategy, ApiError> {
    match (Strategy::from_name(name), policy, fallback) {
        (Some(strategy), _, _) => Ok(strategy),
        (None, AlgorithmPolicy::Legacy, Fallback::Divisive) => {
            debug!("Unknown algorithm {:?}, using divisive", name);
            Ok(Strategy::Divisive)
        }
        (None, _, _) => Err(ApiError::invalid_algorithm(name)),
    }
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "Backend is running" }))
}

#[derive(Debug, Serialize)]
pub struct FeaturesResponse {
    features: Vec<&'static str>,
    n_features: usize,
    n_samples: usize,
    algorithms: Vec<&'static str>,
}

pub async fn features(State(context): State<SharedContext>) -> Json<FeaturesResponse> {
    let features = Feature::column_names();
    Json(FeaturesResponse {
        n_features: features.len(),
        features,
        n_samples: context.n_samples(),
        algorithms: Strategy::names(),
    })
}

pub async fn data_summary(
    State(context): State<SharedContext>,
) -> Json<BTreeMap<&'static str, FeatureSummary>> {
    Json(profiler::data_summary(&context.x()))
}

#[derive(Debug, Deserialize)]
pub struct AlgorithmQuery {
    algorithm: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClustersResponse {
    algorithm: String,
    /// Integer keys render as JSON strings, in ascending numeric order.
    clusters: BTreeMap<ClusterId, ClusterProfile>,
    total_clusters: usize,
    quality: QualityScores,
}

pub async fn clusters(
    State(context): State<SharedContext>,
    Query(query): Query<AlgorithmQuery>,
) -> Result<Json<ClustersResponse>, ApiError> {
    let algorithm = query.algorithm.unwrap_or_else(|| DEFAULT_ALGORITHM.to_string());
    let strategy = resolve_strategy(&algorithm, context.policy(), Fallback::Divisive)?;

    let clusters = profiler::list_clusters(strategy, &context.x(), context.bank().labels(strategy));
    Ok(Json(ClustersResponse {
        algorithm,
        total_clusters: clusters.len(),
        clusters,
        quality: context.bank().quality(strategy),
    }))
}

pub async fn cluster_profile(
    State(context): State<SharedContext>,
    Path(cluster_id): Path<ClusterId>,
    Query(query): Query<AlgorithmQuery>,
) -> Result<Json<ClusterProfile>, ApiError> {
    let algorithm = query.algorithm.unwrap_or_else(|| DEFAULT_ALGORITHM.to_string());
    let strategy = resolve_strategy(&algorithm, context.policy(), Fallback::Divisive)?;

    profiler::profile(cluster_id, strategy, &context.x(), context.bank().labels(strategy))
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Cluster {} not found for {}", cluster_id, algorithm)))
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    algorithm: Option<String>,
    #[serde(rename = "Age")]
    age: Option<Value>,
    income: Option<Value>,
    spending: Option<Value>,
    gender: Option<Value>,
}

impl PredictRequest {
    /// Client values keyed by encoded column name. Absent and null values are left out.
    fn raw_fields(&self) -> BTreeMap<String, Value> {
        [
            (Feature::Age, &self.age),
            (Feature::AnnualIncome, &self.income),
            (Feature::SpendingScore, &self.spending),
            (Feature::GenreIsMale, &self.gender),
        ]
        .into_iter()
        .filter_map(|(feature, value)| {
            value
                .clone()
                .map(|value| (feature.column_name().to_string(), value))
        })
        .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    success: bool,
    algorithm: String,
    predicted_cluster: ClusterId,
    cluster_profile: Option<ClusterProfile>,
    input: BTreeMap<String, Value>,
    nearest_index: usize,
    distance: f64,
}

pub async fn predict(
    State(context): State<SharedContext>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let request = json_body(payload)?;
    let algorithm = request
        .algorithm
        .clone()
        .unwrap_or_else(|| DEFAULT_ALGORITHM.to_string());
    let strategy = resolve_strategy(&algorithm, context.policy(), Fallback::Divisive)?;

    let input = request.raw_fields();
    let fields: BTreeMap<String, FieldValue> = input
        .iter()
        .map(|(name, value)| (name.clone(), FieldValue::from(value.clone())))
        .collect();
    let query = context.encoder().transform(&fields)?;

    let x = context.x();
    let labels = context.bank().labels(strategy);
    let assignment = AssignmentResolver::new().assign(&query.view(), strategy, &x, labels)?;

    let cluster_profile = if assignment.is_noise() {
        None
    } else {
        profiler::profile(assignment.cluster_id, strategy, &x, labels)
    };

    Ok(Json(PredictResponse {
        success: true,
        algorithm,
        predicted_cluster: assignment.cluster_id,
        cluster_profile,
        input,
        nearest_index: assignment.nearest_index,
        distance: assignment.distance,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct VisualizeRequest {
    algorithm: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VisualizeResponse {
    algorithm: String,
    points: Vec<ProjectedPoint>,
    explained_variance: [f64; 2],
    n_points: usize,
}

pub async fn visualize(
    State(context): State<SharedContext>,
    payload: Result<Json<VisualizeRequest>, JsonRejection>,
) -> Result<Json<VisualizeResponse>, ApiError> {
    let request = json_body(payload)?;
    let algorithm = request
        .algorithm
        .unwrap_or_else(|| DEFAULT_ALGORITHM.to_string());
    let strategy = resolve_strategy(&algorithm, context.policy(), Fallback::Never)?;

    let projection = projection::project(&context.x())?;
    let points = projection::label_points(&projection, context.bank().labels(strategy))?;

    Ok(Json(VisualizeResponse {
        algorithm,
        n_points: points.len(),
        points,
        explained_variance: projection.explained_variance,
    }))
}
