use crate::loyalty::TierSystemType;
use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `PASSDESK__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub loyalty: LoyaltyConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Key required in `X-Admin-Key` to provision tenants.
    #[serde(default = "default_admin_key")]
    pub admin_key: String,
}

// Default functions
fn default_node_id() -> String {
    "passdesk-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_enabled() -> bool {
    true
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_admin_key() -> String {
    "change-me".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            port: default_metrics_port(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_key: default_admin_key(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            auth: AuthConfig::default(),
            loyalty: LoyaltyConfig::default(),
            demo: DemoConfig::default(),
        }
    }
}

// ─── Loyalty Config ─────────────────────────────────────────────────────────

/// Defaults applied to newly provisioned tenant programs.
#[derive(Debug, Clone, Deserialize)]
pub struct LoyaltyConfig {
    #[serde(default = "default_points_per_dollar")]
    pub default_points_per_dollar: u32,
    #[serde(default = "default_tier_system")]
    pub default_tier_system: TierSystemType,
}

fn default_points_per_dollar() -> u32 {
    1
}

fn default_tier_system() -> TierSystemType {
    TierSystemType::Loyalty
}

impl Default for LoyaltyConfig {
    fn default() -> Self {
        Self {
            default_points_per_dollar: default_points_per_dollar(),
            default_tier_system: default_tier_system(),
        }
    }
}

// ─── Demo Config ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct DemoConfig {
    /// Seed a demo tenant with sample members at startup.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_demo_api_key")]
    pub api_key: String,
}

fn default_demo_api_key() -> String {
    "demo-tenant-key".to_string()
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: default_demo_api_key(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("PASSDESK")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
