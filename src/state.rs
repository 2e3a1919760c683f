use std::sync::Arc;

use redis::aio::ConnectionManager;
use sqlx::PgPool;
use tokio::sync::Mutex;

use crate::config::Settings;
use crate::services::agent::{AgentService, AgentServiceImpl};
use crate::services::booking::{BookingService, BookingServiceImpl};
use crate::services::calendar_gateway::{CalendarGatewayClient, CalendarGatewayService};
use crate::services::email::{EmailService, EmailServiceImpl};
use crate::services::hold_manager::{hold_manager_for, HoldManager};
use crate::services::payment_gateway::{PaymentGatewayClient, PaymentGatewayService};
use crate::services::pricing::{PricingConfig, PricingEngine};

/// Application state shared across all request handlers.
///
/// This struct is designed to be cheaply cloneable (all inner types use Arc or are Clone),
/// making it suitable for use with Axum's state extraction.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    db: PgPool,
    /// Redis connection manager for async operations
    redis: ConnectionManager,
    /// Application configuration
    config: Arc<Settings>,
    calendar: Arc<dyn CalendarGatewayService>,
    payment: Arc<dyn PaymentGatewayService>,
    hold_manager: Arc<Mutex<HoldManager>>,
    booking: Arc<dyn BookingService>,
    agent: Arc<dyn AgentService>,
    email: Arc<dyn EmailService>,
    pricing: PricingEngine,
}

impl AppState {
    /// Creates a new AppState instance, wiring up the external-gateway
    /// clients and the domain services that sit on top of them.
    ///
    /// # Arguments
    ///
    /// * `db` - PostgreSQL connection pool
    /// * `redis` - Redis connection manager
    /// * `config` - Application settings
    pub fn new(db: PgPool, redis: ConnectionManager, config: Settings) -> Self {
        let calendar: Arc<dyn CalendarGatewayService> =
            Arc::new(CalendarGatewayClient::new(config.calendar.clone()));
        let payment: Arc<dyn PaymentGatewayService> =
            Arc::new(PaymentGatewayClient::new(config.payment.clone()));
        let email: Arc<dyn EmailService> = EmailServiceImpl::from_smtp_config(&config.email)
            .map(|svc| Arc::new(svc) as Arc<dyn EmailService>)
            .unwrap_or_else(|| Arc::new(crate::services::email::NoOpEmailService));
        let hold_manager = hold_manager_for(redis.clone(), config.business.hold_duration_secs);
        let pricing = PricingEngine::new(PricingConfig::default());

        let booking: Arc<dyn BookingService> = Arc::new(BookingServiceImpl::new(
            db.clone(),
            calendar.clone(),
            payment.clone(),
            pricing.clone(),
            hold_manager.clone(),
            email.clone(),
        ));

        let agent: Arc<dyn AgentService> = Arc::new(AgentServiceImpl::new(
            db.clone(),
            calendar.clone(),
            pricing.clone(),
            hold_manager.clone(),
            booking.clone(),
        ));

        Self {
            db,
            redis,
            config: Arc::new(config),
            calendar,
            payment,
            hold_manager,
            booking,
            agent,
            email,
            pricing,
        }
    }

    /// Returns the pricing engine. Cheap to clone (holds small config vectors).
    #[inline]
    pub fn pricing(&self) -> PricingEngine {
        self.pricing.clone()
    }

    /// Returns the calendar gateway client shared across requests.
    #[inline]
    pub fn calendar_gateway(&self) -> Arc<dyn CalendarGatewayService> {
        self.calendar.clone()
    }

    /// Returns the payment gateway client shared across requests.
    #[inline]
    pub fn payment_gateway(&self) -> Arc<dyn PaymentGatewayService> {
        self.payment.clone()
    }

    /// Returns the hold manager, guarded by a mutex since Redis command
    /// pipelining through a single `ConnectionManager` clone is not meant to
    /// be driven concurrently from the same logical caller.
    #[inline]
    pub fn hold_manager(&self) -> Arc<Mutex<HoldManager>> {
        self.hold_manager.clone()
    }

    #[inline]
    pub fn booking(&self) -> Arc<dyn BookingService> {
        self.booking.clone()
    }

    #[inline]
    pub fn agent(&self) -> Arc<dyn AgentService> {
        self.agent.clone()
    }

    #[inline]
    pub fn email(&self) -> Arc<dyn EmailService> {
        self.email.clone()
    }

    /// Returns a reference to the database connection pool.
    ///
    /// Use this to execute database queries:
    /// ```ignore
    /// let users = sqlx::query_as!(User, "SELECT * FROM users")
    ///     .fetch_all(state.db())
    ///     .await?;
    /// ```
    #[inline]
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    /// Returns a clone of the Redis connection manager.
    ///
    /// The ConnectionManager implements Clone and handles reconnection automatically.
    /// Each clone shares the same underlying connection.
    #[inline]
    pub fn redis(&self) -> ConnectionManager {
        self.redis.clone()
    }

    /// Returns a reference to the application configuration.
    #[inline]
    pub fn config(&self) -> &Settings {
        &self.config
    }

    /// Returns the business timezone all date/time calculations are anchored to.
    #[inline]
    pub fn business_timezone(&self) -> &str {
        &self.config.business.timezone
    }

    /// Returns the hold duration in seconds before an uncommitted hold expires.
    #[inline]
    pub fn hold_duration_secs(&self) -> u64 {
        self.config.business.hold_duration_secs
    }

    /// Returns the configured server port.
    #[inline]
    pub fn port(&self) -> u16 {
        self.config.server.port
    }

    /// Returns whether the application is running in production mode.
    #[inline]
    pub fn is_production(&self) -> bool {
        self.config.is_production()
    }
}
