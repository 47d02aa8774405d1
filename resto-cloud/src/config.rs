//! Cloud server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Cloud server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Stripe secret key
    pub stripe_secret_key: String,
    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,
    /// Stripe REST base URL (overridable for tests / proxies)
    pub stripe_api_base: String,
    /// Max age of a webhook signature timestamp, in seconds
    pub webhook_tolerance_secs: i64,
    /// Three-letter currency code for payment sessions
    pub payment_currency: String,
    /// Public storefront origin, used for payment redirect URLs
    pub public_base_url: String,
    /// JWT secret for staff / customer authentication
    pub jwt_secret: String,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: environment.clone(),
            stripe_secret_key: Self::require_secret("STRIPE_SECRET_KEY", &environment)?,
            stripe_webhook_secret: Self::require_secret("STRIPE_WEBHOOK_SECRET", &environment)?,
            stripe_api_base: std::env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| "https://api.stripe.com".into())
                .trim_end_matches('/')
                .to_string(),
            webhook_tolerance_secs: std::env::var("WEBHOOK_TOLERANCE_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(300),
            payment_currency: std::env::var("PAYMENT_CURRENCY")
                .map(|c| c.to_lowercase())
                .unwrap_or_else(|_| "usd".into()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into())
                .trim_end_matches('/')
                .to_string(),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: "postgres://unused".into(),
            http_port: 0,
            environment: "test".into(),
            stripe_secret_key: "sk_test_xxx".into(),
            stripe_webhook_secret: "whsec_test123secret456".into(),
            stripe_api_base: "http://127.0.0.1:9".into(),
            webhook_tolerance_secs: 300,
            payment_currency: "usd".into(),
            public_base_url: "https://shop.test".into(),
            jwt_secret: "test-jwt-secret".into(),
        }
    }
}
