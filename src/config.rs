use std::env;

/// Application configuration loaded from environment variables
///
/// Every field has a development default so the server boots from a bare
/// `.env`; production deployments are expected to set all of them.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// PostgreSQL connection URL
    pub database_url: String,

    /// Maximum connections in the r2d2 pool
    pub db_pool_size: u32,

    /// Secret used to sign and verify JWTs
    pub jwt_secret: String,

    /// SMTP transport settings for trigger emails
    pub smtp: SmtpConfig,

    /// Base URL of the chat-completions endpoint used for intent parsing
    pub llm_api_url: String,

    /// API key for the intent-parsing endpoint (empty disables the agent)
    pub llm_api_key: String,

    /// Model identifier sent to the intent-parsing endpoint
    pub llm_model: String,

    /// JSON-RPC endpoint for stake activation queries
    pub chain_rpc_url: String,

    /// Frontend URL linked from trigger emails
    pub frontend_url: String,
}

/// SMTP settings for the best-effort email channel
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl AppConfig {
    /// Load configuration from the environment (call after `dotenvy::dotenv()`)
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/wallet_agent".to_string()),
            db_pool_size: env::var("DB_POOL_MAX_SIZE")
                .ok()
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(10),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string()),
            smtp: SmtpConfig {
                host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.ethereal.email".to_string()),
                port: env::var("SMTP_PORT")
                    .ok()
                    .and_then(|s| s.parse::<u16>().ok())
                    .unwrap_or(587),
                username: env::var("SMTP_USER").unwrap_or_default(),
                password: env::var("SMTP_PASS").unwrap_or_default(),
                from: env::var("EMAIL_FROM")
                    .unwrap_or_else(|_| "Wallet Agent <agent@wallet-agent.local>".to_string()),
            },
            llm_api_url: env::var("LLM_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
            llm_api_key: env::var("LLM_API_KEY").unwrap_or_default(),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            chain_rpc_url: env::var("CHAIN_RPC_URL")
                .unwrap_or_else(|_| "https://api.devnet.solana.com".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5174".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        // Only checks fields that have no reason to be set in CI
        let config = AppConfig::from_env();
        assert!(!config.bind_addr.is_empty());
        assert!(config.db_pool_size > 0);
        assert_eq!(config.smtp.port, 587);
    }
}
