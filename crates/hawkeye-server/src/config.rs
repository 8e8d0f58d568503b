use serde::Deserialize;

use hawkeye_core::generator::GeneratorConfig;
use hawkeye_core::upload::DEFAULT_MAX_UPLOAD_BYTES;

/// Top-level server configuration, loaded from `hawkeye.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub web_root: String,
    pub analysis: AnalysisConfig,
    pub playback: PlaybackConfig,
    pub limits: LimitsConfig,
    pub generator: GeneratorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            web_root: "web".to_string(),
            analysis: AnalysisConfig::default(),
            playback: PlaybackConfig::default(),
            limits: LimitsConfig::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

/// Simulated analysis latency.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Delay between the analyze trigger and the trajectory becoming available.
    pub delay_ms: u64,
    /// Fixed seed for reproducible statistics. Each analysis mixes in its
    /// ticket number so repeated runs still differ.
    pub seed: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            delay_ms: 3000,
            seed: None,
        }
    }
}

/// Playback tick loop and frame fan-out.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Driver ticks per second (one per rendered frame).
    pub tick_rate_hz: f32,
    pub broadcast_capacity: usize,
    pub max_subscribers: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            broadcast_capacity: 256,
            max_subscribers: 32,
        }
    }
}

/// Upload and storage limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_upload_bytes: u64,
    /// Uploaded videos kept in memory before the oldest is evicted.
    pub max_stored_videos: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_stored_videos: 4,
        }
    }
}

impl ServerConfig {
    /// Check the configuration, logging warnings for suspicious values.
    ///
    /// Returns the first fatal problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!(
                "listen_addr {:?} is not a valid socket address",
                self.listen_addr
            ));
        }

        if !self.playback.tick_rate_hz.is_finite() || self.playback.tick_rate_hz <= 0.0 {
            return Err("playback.tick_rate_hz must be > 0".to_string());
        }
        if self.playback.tick_rate_hz > 240.0 {
            tracing::warn!(
                tick_rate_hz = self.playback.tick_rate_hz,
                "playback.tick_rate_hz is above typical display refresh rates"
            );
        }
        if self.playback.broadcast_capacity == 0 {
            return Err("playback.broadcast_capacity must be > 0".to_string());
        }
        if self.playback.max_subscribers == 0 {
            return Err("playback.max_subscribers must be > 0".to_string());
        }

        if self.limits.max_upload_bytes == 0 {
            return Err("limits.max_upload_bytes must be > 0".to_string());
        }
        if self.limits.max_upload_bytes > usize::MAX as u64 {
            return Err("limits.max_upload_bytes does not fit in memory".to_string());
        }
        if self.limits.max_stored_videos == 0 {
            return Err("limits.max_stored_videos must be > 0".to_string());
        }

        if self.analysis.delay_ms == 0 {
            tracing::warn!("analysis.delay_ms is 0, results will be available immediately");
        }

        self.generator
            .validate()
            .map_err(|e| format!("generator: {e}"))
    }

    /// Load config from `hawkeye.toml` if it exists, then apply env var overrides.
    pub fn load() -> Self {
        let path = std::env::var("HAWKEYE_CONFIG").unwrap_or_else(|_| "hawkeye.toml".to_string());
        let mut config = match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<ServerConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!(path = %path, "Loaded configuration");
                    cfg
                },
                Err(e) => {
                    tracing::warn!(path = %path, "Failed to parse config: {e}, using defaults");
                    ServerConfig::default()
                },
            },
            Err(_) => {
                tracing::info!(path = %path, "No config file found, using defaults");
                ServerConfig::default()
            },
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply `HAWKEYE_*` overrides read through `lookup`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("HAWKEYE_LISTEN_ADDR")
            && !addr.is_empty()
        {
            self.listen_addr = addr;
        }
        if let Some(root) = lookup("HAWKEYE_WEB_ROOT")
            && !root.is_empty()
        {
            self.web_root = root;
        }
        if let Some(val) = lookup("HAWKEYE_ANALYSIS_DELAY_MS")
            && let Ok(n) = val.parse::<u64>()
        {
            self.analysis.delay_ms = n;
        }
        if let Some(val) = lookup("HAWKEYE_ANALYSIS_SEED")
            && let Ok(n) = val.parse::<u64>()
        {
            self.analysis.seed = Some(n);
        }
        if let Some(val) = lookup("HAWKEYE_TICK_RATE_HZ")
            && let Ok(n) = val.parse::<f32>()
        {
            self.playback.tick_rate_hz = n;
        }
        if let Some(val) = lookup("HAWKEYE_MAX_UPLOAD_BYTES")
            && let Ok(n) = val.parse::<u64>()
        {
            self.limits.max_upload_bytes = n;
        }
        if let Some(val) = lookup("HAWKEYE_MAX_SUBSCRIBERS")
            && let Ok(n) = val.parse::<usize>()
        {
            self.playback.max_subscribers = n;
        }
    }
}
