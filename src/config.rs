use anyhow::Result;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_days: i64,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub client_base_url: String,
    pub ai_gateway_url: String,
    pub ai_gateway_key: String,
    pub ai_model: String,
    /// Daily per-user AI execution allowance. Every quota check reads this
    /// value; handlers must not carry their own copy of the number.
    pub ai_daily_limit: i64,
    pub ai_trial_days: i64,
    pub invite_expiry_days: i64,
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Install the process-wide configuration. Later calls are ignored, which
/// keeps repeated test setup harmless.
pub fn init_config(config: Config) -> &'static Config {
    CONFIG.get_or_init(|| config)
}

pub fn config() -> &'static Config {
    CONFIG.get_or_init(|| Config::from_env().expect("failed to load configuration"))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_env_only()
    }

    /// Load configuration from environment variables only (without loading .env files)
    /// This is useful for testing where you want to control the environment directly
    pub fn from_env_only() -> Result<Self> {
        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://@localhost:5432/koinonia".to_string()),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                "your-super-secret-jwt-key-change-this-in-production-12345".to_string()
            }),
            jwt_expiration_days: env::var("JWT_EXPIRATION_DAYS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            client_base_url: env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            ai_gateway_url: env::var("AI_GATEWAY_URL")
                .unwrap_or_else(|_| "https://ai.gateway.lovable.dev".to_string()),
            ai_gateway_key: env::var("AI_GATEWAY_KEY").unwrap_or_default(),
            ai_model: env::var("AI_MODEL")
                .unwrap_or_else(|_| "google/gemini-3-flash-preview".to_string()),
            ai_daily_limit: env::var("AI_DAILY_LIMIT")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            ai_trial_days: env::var("AI_TRIAL_DAYS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            invite_expiry_days: env::var("INVITE_EXPIRY_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .unwrap_or(7),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn invite_link(&self, token: &str) -> String {
        format!("{}/invite/{}", self.client_base_url, token)
    }
}
