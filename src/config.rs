use crate::dataset::DEFAULT_CANDIDATE_PATHS;
use crate::error::ConfigError;
use log::{error, LevelFilter};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Prefix for every route, e.g. "/api". Empty mounts routes at the root.
    pub base_path: String,
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5001,
            base_path: "/api".to_string(),
            cors: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Probed in order; the first existing file wins.
    pub candidate_paths: Vec<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            candidate_paths: DEFAULT_CANDIDATE_PATHS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DensityConfig {
    pub eps: f64,
    pub min_pts: usize,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self { eps: 0.5, min_pts: 5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    pub n_clusters: usize,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self { n_clusters: 5 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    pub density: DensityConfig,
    pub agglomerative: HierarchyConfig,
    pub divisive: HierarchyConfig,
}

/// How endpoints treat an algorithm name that matches no strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmPolicy {
    /// Listing and prediction fall back to the divisive strategy; visualisation rejects.
    #[default]
    Legacy,
    /// Every endpoint rejects.
    Strict,
}

impl fmt::Display for AlgorithmPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmPolicy::Legacy => write!(f, "legacy"),
            AlgorithmPolicy::Strict => write!(f, "strict"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String, // Log level, e.g., "info", "debug", "warn", "error"
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Print a per-strategy cluster table once training finishes.
    pub on_startup: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub clustering: ClusteringConfig,
    pub algorithm_policy: AlgorithmPolicy,
    pub logging: LoggingConfig,
    pub report: ReportConfig,
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Configuration:")?;
        writeln!(f, "  Server:")?;
        writeln!(f, "    Address: {}:{}", self.server.host, self.server.port)?;
        writeln!(f, "    Base Path: {:?}", self.server.base_path)?;
        writeln!(f, "    CORS: {}", self.server.cors)?;
        writeln!(f, "  Data Candidates: {}", self.data.candidate_paths.join(", "))?;
        writeln!(f, "  Clustering:")?;
        writeln!(
            f,
            "    Density: eps={} min_pts={}",
            self.clustering.density.eps, self.clustering.density.min_pts
        )?;
        writeln!(
            f,
            "    Agglomerative (ward): {} clusters",
            self.clustering.agglomerative.n_clusters
        )?;
        writeln!(
            f,
            "    Divisive (complete): {} clusters",
            self.clustering.divisive.n_clusters
        )?;
        writeln!(f, "  Algorithm Policy: {}", self.algorithm_policy)?;
        writeln!(f, "  Logging:")?;
        writeln!(f, "    Level: {}", self.logging.level)?;
        writeln!(f, "  Startup Report: {}", self.report.on_startup)?;
        Ok(())
    }
}

impl Config {
    /// Reads the YAML configuration file and returns a validated `Config`.
    pub fn from_file<P: AsRef<Path>>(file_path: P) -> Result<Self, ConfigError> {
        let path = file_path.as_ref();
        let file_content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&file_content).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        // An empty document deserialises to unit, not to an empty mapping.
        let config: Config = if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
                path: "<inline>".to_string(),
                source,
            })?
        };
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        let density = &self.clustering.density;
        if !(density.eps > 0.0) || !density.eps.is_finite() {
            return Err(format!("clustering.density.eps must be positive, got {}", density.eps));
        }
        if density.min_pts == 0 {
            return Err("clustering.density.min_pts must be greater than 0".to_string());
        }
        if self.clustering.agglomerative.n_clusters == 0 {
            return Err("clustering.agglomerative.n_clusters must be greater than 0".to_string());
        }
        if self.clustering.divisive.n_clusters == 0 {
            return Err("clustering.divisive.n_clusters must be greater than 0".to_string());
        }

        if self.data.candidate_paths.is_empty() {
            return Err("data.candidate_paths must not be empty".to_string());
        }

        if !self.server.base_path.is_empty() && !self.server.base_path.starts_with('/') {
            return Err(format!(
                "server.base_path must start with '/', got {:?}",
                self.server.base_path
            ));
        }

        self.log_level_filter()?;
        Ok(())
    }

    fn log_level_filter(&self) -> Result<LevelFilter, String> {
        match self.logging.level.to_lowercase().as_str() {
            "debug" => Ok(LevelFilter::Debug),
            "info" => Ok(LevelFilter::Info),
            "warn" => Ok(LevelFilter::Warn),
            "error" => Ok(LevelFilter::Error),
            _ => Err(format!("Unsupported log level: {}", self.logging.level)),
        }
    }

    /// Sets up logging based on the logging level in the configuration.
    pub fn setup_logging(&self) {
        let level_filter = self.log_level_filter().unwrap_or(LevelFilter::Info);

        if let Err(e) = env_logger::Builder::new()
            .filter_level(level_filter)
            .try_init()
        {
            error!("Failed to initialize logger: {}", e);
        }
    }
}
