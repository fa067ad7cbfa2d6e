use serde::Deserialize;

/// Root application configuration. Loaded from environment variables with
/// the prefix `LABELFORGE__` and an optional TOML config file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub vision: VisionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

/// Model identity + endpoint per LLM-backed stage (spec §6: "text LLM model
/// per stage, configurable").
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_design_scheme_model")]
    pub design_scheme_model: String,
    #[serde(default = "default_image_prompts_model")]
    pub image_prompts_model: String,
    #[serde(default = "default_detailed_layout_model")]
    pub detailed_layout_model: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    #[serde(default = "default_image_model")]
    pub model: String,
    #[serde(default = "default_image_base_url")]
    pub base_url: String,
    #[serde(default = "default_image_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_image_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisionConfig {
    #[serde(default = "default_vision_model")]
    pub model: String,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_backend")]
    pub backend: String,
    #[serde(default = "default_storage_bucket")]
    pub bucket: String,
    #[serde(default = "default_storage_root")]
    pub local_root: String,
    #[serde(default = "default_storage_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

/// Render service endpoint (spec §4.5 "Renderer").
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_render_base_url")]
    pub base_url: String,
    #[serde(default = "default_render_timeout_ms")]
    pub timeout_ms: u64,
}

/// Pipeline-wide knobs (spec §6, §4.8, §4.7).
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_max_edits")]
    pub max_edits: usize,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_max_delta")]
    pub max_delta: f64,
    #[serde(default = "default_max_image_concurrency")]
    pub max_image_concurrency: usize,
    #[serde(default = "default_render_timeout_ms")]
    pub render_timeout_ms: u64,
    #[serde(default = "default_image_generate_timeout_ms")]
    pub image_generate_timeout_ms: u64,
}

fn default_node_id() -> String {
    "node-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_database_url() -> String {
    "postgres://localhost/labelforge".to_string()
}
fn default_pool_size() -> u32 {
    10
}
fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_llm_api_key_env() -> String {
    "LABELFORGE_LLM_API_KEY".to_string()
}
fn default_design_scheme_model() -> String {
    "gpt-4o".to_string()
}
fn default_image_prompts_model() -> String {
    "gpt-4o".to_string()
}
fn default_detailed_layout_model() -> String {
    "gpt-4o".to_string()
}
fn default_timeout_ms() -> u64 {
    30_000
}
fn default_image_model() -> String {
    "dall-e-3".to_string()
}
fn default_image_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_image_api_key_env() -> String {
    "LABELFORGE_IMAGE_API_KEY".to_string()
}
fn default_image_timeout_ms() -> u64 {
    60_000
}
fn default_vision_model() -> String {
    "gpt-4o".to_string()
}
fn default_storage_backend() -> String {
    "local".to_string()
}
fn default_storage_bucket() -> String {
    "label-images".to_string()
}
fn default_storage_root() -> String {
    "./data/label-images".to_string()
}
fn default_public_base_url() -> String {
    "http://localhost:8080/assets".to_string()
}
fn default_storage_endpoint() -> String {
    "http://localhost:9000".to_string()
}
fn default_max_edits() -> usize {
    10
}
fn default_max_iterations() -> usize {
    2
}
fn default_max_delta() -> f64 {
    0.2
}
fn default_max_image_concurrency() -> usize {
    3
}
fn default_render_timeout_ms() -> u64 {
    30_000
}
fn default_render_base_url() -> String {
    "http://localhost:9090".to_string()
}
fn default_image_generate_timeout_ms() -> u64 {
    60_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            pool_size: default_pool_size(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key_env: default_llm_api_key_env(),
            design_scheme_model: default_design_scheme_model(),
            image_prompts_model: default_image_prompts_model(),
            detailed_layout_model: default_detailed_layout_model(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            model: default_image_model(),
            base_url: default_image_base_url(),
            api_key_env: default_image_api_key_env(),
            timeout_ms: default_image_timeout_ms(),
        }
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            model: default_vision_model(),
            base_url: default_llm_base_url(),
            api_key_env: default_llm_api_key_env(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            bucket: default_storage_bucket(),
            local_root: default_storage_root(),
            endpoint: default_storage_endpoint(),
            public_base_url: default_public_base_url(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            base_url: default_render_base_url(),
            timeout_ms: default_render_timeout_ms(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_edits: default_max_edits(),
            max_iterations: default_max_iterations(),
            max_delta: default_max_delta(),
            max_image_concurrency: default_max_image_concurrency(),
            render_timeout_ms: default_render_timeout_ms(),
            image_generate_timeout_ms: default_image_generate_timeout_ms(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            database: DatabaseConfig::default(),
            llm: LlmConfig::default(),
            image: ImageConfig::default(),
            vision: VisionConfig::default(),
            storage: StorageConfig::default(),
            render: RenderConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and optional config file.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("LABELFORGE")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
