//! Application state for resto-cloud

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::db::{OrderStore, PgOrderStore};
use crate::live::KitchenHub;
use crate::payments::{PaymentProvider, PaymentSettings};
use crate::stripe::StripeClient;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Order / menu persistence
    pub store: Arc<dyn OrderStore>,
    /// Checkout session provider (Stripe)
    pub payments: Arc<dyn PaymentProvider>,
    /// Currency and redirect URLs for checkout sessions
    pub payment_settings: PaymentSettings,
    /// Realtime order change fan-out
    pub kitchen_hub: KitchenHub,
    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,
    /// Max webhook timestamp skew, in seconds
    pub webhook_tolerance_secs: i64,
    /// JWT secret for staff / customer authentication
    pub jwt_secret: String,
}

impl AppState {
    /// Connect to PostgreSQL, run migrations and build the state
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        let stripe = StripeClient::new(&config.stripe_secret_key, &config.stripe_api_base);

        Ok(Self::with_parts(
            config,
            Arc::new(PgOrderStore::new(pool)),
            Arc::new(stripe),
        ))
    }

    /// Build the state around an existing store and payment provider
    pub fn with_parts(
        config: &Config,
        store: Arc<dyn OrderStore>,
        payments: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            store,
            payments,
            payment_settings: PaymentSettings {
                currency: config.payment_currency.clone(),
                public_base_url: config.public_base_url.clone(),
            },
            kitchen_hub: KitchenHub::new(),
            stripe_webhook_secret: config.stripe_webhook_secret.clone(),
            webhook_tolerance_secs: config.webhook_tolerance_secs,
            jwt_secret: config.jwt_secret.clone(),
        }
    }
}
