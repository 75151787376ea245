/// Configuration management for Insights Service
///
/// Everything is read from environment variables (a `.env` file is loaded by
/// the binary in development). Missing secrets fall back to empty values in
/// development and are rejected in production.
use std::fmt;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Cache (Redis) configuration
    pub cache: CacheConfig,
    /// JWT validation
    pub auth: AuthConfig,
    /// Sentiment classifier (OpenAI)
    pub openai: OpenAiConfig,
    /// LinkedIn OAuth + REST API
    pub linkedin: LinkedInConfig,
    /// Premium checkout (Stripe)
    pub stripe: StripeConfig,
}

/// Application settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
    /// Dashboard origin used for post-OAuth redirects
    pub frontend_url: String,
    /// Display time zone for daily buckets when the request does not supply one
    pub display_utc_offset_minutes: i32,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Redis URL
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// RS256 public key used to validate session tokens
    pub jwt_public_key_pem: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_ms: u64,
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

#[derive(Clone)]
pub struct LinkedInConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Callback registered with the LinkedIn app
    pub redirect_uri: String,
    pub scope: String,
    /// Base URL for `/oauth/v2/*`
    pub auth_base_url: String,
    /// Base URL for `/v2/*` and `/rest/*`
    pub api_base_url: String,
    /// `LinkedIn-Version` header (YYYYMM)
    pub api_version: String,
    /// Maximum posts fetched per sync
    pub max_posts: u32,
    /// Concurrent classifier calls during sync
    pub sync_concurrency: usize,
    pub timeout_ms: u64,
}

impl fmt::Debug for LinkedInConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedInConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("scope", &self.scope)
            .field("auth_base_url", &self.auth_base_url)
            .field("api_base_url", &self.api_base_url)
            .field("api_version", &self.api_version)
            .field("max_posts", &self.max_posts)
            .field("sync_concurrency", &self.sync_concurrency)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

#[derive(Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub base_url: String,
    /// Price used when the client does not pick one
    pub premium_price_id: String,
    /// Additional prices a client may request
    pub allowed_price_ids: Vec<String>,
    pub success_url: String,
    pub cancel_url: String,
    pub timeout_ms: u64,
}

impl fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("premium_price_id", &self.premium_price_id)
            .field("allowed_price_ids", &self.allowed_price_ids)
            .field("success_url", &self.success_url)
            .field("cancel_url", &self.cancel_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = env_or("APP_ENV", "development");
        let production = app_env.eq_ignore_ascii_case("production");

        let frontend_url = env_or("FRONTEND_URL", "http://localhost:3000");
        let display_utc_offset_minutes: i32 = parse_env_or_default("DISPLAY_UTC_OFFSET_MINUTES", 0)?;
        if display_utc_offset_minutes.abs() > 14 * 60 {
            return Err(format!(
                "DISPLAY_UTC_OFFSET_MINUTES out of range: {}",
                display_utc_offset_minutes
            ));
        }

        let cors = {
            let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                Ok(value) => value,
                Err(_) if production => {
                    return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                }
                Err(_) => frontend_url.clone(),
            };

            if production && allowed_origins.trim() == "*" {
                return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
            }

            CorsConfig { allowed_origins }
        };

        let jwt_public_key_pem = std::env::var("JWT_PUBLIC_KEY_PEM")
            .ok()
            .filter(|v| !v.trim().is_empty());
        if production && jwt_public_key_pem.is_none() {
            return Err("JWT_PUBLIC_KEY_PEM must be set in production".to_string());
        }

        let openai_api_key = required_secret("OPENAI_API_KEY", production)?;
        let linkedin_client_secret = required_secret("LINKEDIN_CLIENT_SECRET", production)?;
        let stripe_secret_key = required_secret("STRIPE_SECRET_KEY", production)?;

        let sync_concurrency: usize = parse_env_or_default("LINKEDIN_SYNC_CONCURRENCY", 4)?;
        if sync_concurrency == 0 {
            return Err("LINKEDIN_SYNC_CONCURRENCY must be at least 1".to_string());
        }

        Ok(Config {
            app: AppConfig {
                env: app_env,
                host: env_or("INSIGHTS_SERVICE_HOST", "0.0.0.0"),
                port: parse_env_or_default("INSIGHTS_SERVICE_PORT", 8090)?,
                frontend_url: frontend_url.trim_end_matches('/').to_string(),
                display_utc_offset_minutes,
            },
            cors,
            database: DatabaseConfig {
                url: env_or("DATABASE_URL", "postgresql://localhost/insights"),
                max_connections: parse_env_or_default("DATABASE_MAX_CONNECTIONS", 10)?,
                connect_timeout_secs: parse_env_or_default("DATABASE_CONNECT_TIMEOUT_SECS", 5)?,
            },
            cache: CacheConfig {
                url: env_or("REDIS_URL", "redis://localhost:6379"),
            },
            auth: AuthConfig { jwt_public_key_pem },
            openai: OpenAiConfig {
                api_key: openai_api_key,
                model: env_or("OPENAI_MODEL", "gpt-4"),
                base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com"),
                timeout_ms: parse_env_or_default("OPENAI_TIMEOUT_MS", 20_000)?,
            },
            linkedin: LinkedInConfig {
                client_id: env_or("LINKEDIN_CLIENT_ID", ""),
                client_secret: linkedin_client_secret,
                redirect_uri: std::env::var("LINKEDIN_REDIRECT_URI").unwrap_or_else(|_| {
                    "http://localhost:8090/api/v1/linkedin/callback".to_string()
                }),
                scope: env_or("LINKEDIN_SCOPE", "openid profile r_member_social"),
                auth_base_url: env_or("LINKEDIN_AUTH_BASE_URL", "https://www.linkedin.com"),
                api_base_url: env_or("LINKEDIN_API_BASE_URL", "https://api.linkedin.com"),
                api_version: env_or("LINKEDIN_API_VERSION", "202405"),
                max_posts: parse_env_or_default("LINKEDIN_SYNC_MAX_POSTS", 100)?,
                sync_concurrency,
                timeout_ms: parse_env_or_default("LINKEDIN_TIMEOUT_MS", 10_000)?,
            },
            stripe: StripeConfig {
                secret_key: stripe_secret_key,
                base_url: env_or("STRIPE_BASE_URL", "https://api.stripe.com"),
                premium_price_id: env_or("STRIPE_PREMIUM_PRICE_ID", ""),
                allowed_price_ids: parse_list(&env_or("STRIPE_ALLOWED_PRICE_IDS", "")),
                success_url: std::env::var("STRIPE_SUCCESS_URL").unwrap_or_else(|_| {
                    format!("{}/dashboard?checkout=success", frontend_url.trim_end_matches('/'))
                }),
                cancel_url: std::env::var("STRIPE_CANCEL_URL").unwrap_or_else(|_| {
                    format!("{}/dashboard?checkout=cancelled", frontend_url.trim_end_matches('/'))
                }),
                timeout_ms: parse_env_or_default("STRIPE_TIMEOUT_MS", 10_000)?,
            },
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn required_secret(key: &str, production: bool) -> Result<String, String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ if production => Err(format!("{} must be set in production", key)),
        _ => Ok(String::new()),
    }
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "APP_ENV",
        "FRONTEND_URL",
        "DISPLAY_UTC_OFFSET_MINUTES",
        "CORS_ALLOWED_ORIGINS",
        "JWT_PUBLIC_KEY_PEM",
        "OPENAI_API_KEY",
        "LINKEDIN_CLIENT_SECRET",
        "STRIPE_SECRET_KEY",
        "STRIPE_ALLOWED_PRICE_IDS",
        "INSIGHTS_SERVICE_PORT",
        "LINKEDIN_SYNC_CONCURRENCY",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    fn set_production_secrets() {
        std::env::set_var("APP_ENV", "production");
        std::env::set_var("CORS_ALLOWED_ORIGINS", "https://insights.example.com");
        std::env::set_var("JWT_PUBLIC_KEY_PEM", "pem");
        std::env::set_var("OPENAI_API_KEY", "sk-test");
        std::env::set_var("LINKEDIN_CLIENT_SECRET", "li-secret");
        std::env::set_var("STRIPE_SECRET_KEY", "sk_test");
    }

    #[test]
    #[serial]
    fn development_defaults() {
        clear_env();
        let config = Config::from_env().expect("defaults load");

        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.port, 8090);
        assert_eq!(config.app.display_utc_offset_minutes, 0);
        assert_eq!(config.cors.allowed_origins, "http://localhost:3000");
        assert!(config.auth.jwt_public_key_pem.is_none());
        assert_eq!(config.openai.model, "gpt-4");
        assert_eq!(config.linkedin.sync_concurrency, 4);
        assert_eq!(
            config.stripe.success_url,
            "http://localhost:3000/dashboard?checkout=success"
        );
    }

    #[test]
    #[serial]
    fn production_requires_secrets() {
        clear_env();
        set_production_secrets();
        assert!(Config::from_env().is_ok());

        std::env::remove_var("OPENAI_API_KEY");
        let err = Config::from_env().unwrap_err();
        assert!(err.contains("OPENAI_API_KEY"));
        clear_env();
    }

    #[test]
    #[serial]
    fn production_rejects_wildcard_cors() {
        clear_env();
        set_production_secrets();
        std::env::set_var("CORS_ALLOWED_ORIGINS", "*");

        let err = Config::from_env().unwrap_err();
        assert!(err.contains("CORS_ALLOWED_ORIGINS"));
        clear_env();
    }

    #[test]
    #[serial]
    fn invalid_numbers_are_reported() {
        clear_env();
        std::env::set_var("INSIGHTS_SERVICE_PORT", "eighty");
        let err = Config::from_env().unwrap_err();
        assert!(err.contains("INSIGHTS_SERVICE_PORT"));

        std::env::set_var("INSIGHTS_SERVICE_PORT", "8090");
        std::env::set_var("DISPLAY_UTC_OFFSET_MINUTES", "9000");
        assert!(Config::from_env().is_err());

        std::env::remove_var("DISPLAY_UTC_OFFSET_MINUTES");
        std::env::set_var("LINKEDIN_SYNC_CONCURRENCY", "0");
        assert!(Config::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn price_list_is_trimmed() {
        clear_env();
        std::env::set_var("STRIPE_ALLOWED_PRICE_IDS", " price_a, ,price_b ");
        let config = Config::from_env().unwrap();
        assert_eq!(config.stripe.allowed_price_ids, vec!["price_a", "price_b"]);
        clear_env();
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let openai = OpenAiConfig {
            api_key: "sk-live-secret".to_string(),
            model: "gpt-4".to_string(),
            base_url: "https://api.openai.com".to_string(),
            timeout_ms: 1_000,
        };
        let rendered = format!("{:?}", openai);
        assert!(!rendered.contains("sk-live-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
