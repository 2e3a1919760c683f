//! OpenAPI documentation configuration
//!
//! This module configures utoipa to generate an OpenAPI 3.0 specification
//! for the cabin reservation backend. The generated spec can be used to
//! generate TypeScript clients or viewed via Swagger UI.
//!
//! ## Usage
//!
//! Add Swagger UI routes to your application:
//!
//! ```ignore
//! use cabin_reservation_backend::openapi::swagger_routes;
//!
//! let app = Router::new()
//!     .merge(swagger_routes())
//!     .merge(api_routes);
//! ```
//!
//! This will expose:
//! - `GET /docs` - Interactive Swagger UI
//! - `GET /openapi.json` - Raw OpenAPI specification in JSON format

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Security scheme modifier documenting the admin shared-secret header.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "admin_api_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-admin-api-key"))),
        );
    }
}

/// OpenAPI documentation for the cabin reservation backend.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cabin Reservation API",
        version = "1.0.0",
        description = "REST API for a vacation-cabin reservation backend: catalog and availability, pricing quotes, TTL-bounded holds, direct booking commit, a Hebrew/English conversational agent, payment webhook reconciliation, and an admin surface for curating the knowledge base and reviewing activity.",
        license(
            name = "Proprietary",
        ),
        contact(
            name = "Cabin Reservations Team",
            email = "support@example-cabins.test"
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "cabins", description = "Cabin catalog, availability, calendar, and pricing quotes"),
        (name = "hold", description = "TTL-bounded date-range holds"),
        (name = "booking", description = "Direct booking commit"),
        (name = "agent", description = "Conversational agent (Hebrew/English)"),
        (name = "webhooks", description = "Payment gateway webhook sink"),
        (name = "admin", description = "Admin surface: holds, audit log, knowledge base, bookings")
    ),
    paths(
        // Health endpoints
        crate::openapi::paths::health_check,
        crate::openapi::paths::health_check_db,
        crate::openapi::paths::health_check_redis,
        crate::openapi::paths::health_check_full,
        // Catalog endpoints
        crate::openapi::paths::list_cabins,
        crate::openapi::paths::check_availability,
        crate::openapi::paths::cabin_calendar,
        crate::openapi::paths::quote,
        // Hold endpoints
        crate::openapi::paths::create_hold,
        crate::openapi::paths::get_hold,
        crate::openapi::paths::release_hold,
        // Booking endpoints
        crate::openapi::paths::create_booking,
        // Agent endpoints
        crate::openapi::paths::agent_chat,
        // Webhook endpoints
        crate::openapi::paths::receive_webhook,
        // Admin endpoints
        crate::openapi::paths::admin_list_active_holds,
        crate::openapi::paths::admin_list_audit_entries,
        crate::openapi::paths::admin_pending_faqs,
        crate::openapi::paths::admin_all_faqs,
        crate::openapi::paths::admin_approve_faq,
        crate::openapi::paths::admin_update_faq,
        crate::openapi::paths::admin_delete_faq,
        crate::openapi::paths::admin_list_business_facts,
        crate::openapi::paths::admin_upsert_business_fact,
        crate::openapi::paths::admin_deactivate_business_fact,
        crate::openapi::paths::admin_list_bookings,
        crate::openapi::paths::admin_get_booking,
        crate::openapi::paths::admin_cancel_booking,
    ),
    components(
        schemas(
            // Error responses
            schemas::ErrorResponse,
            // Health schemas
            schemas::HealthResponse,
            schemas::DbHealthResponse,
            schemas::RedisHealthResponse,
            schemas::SystemHealthResponse,
            // Cabin/catalog schemas
            schemas::CabinResponse,
            schemas::AvailabilityRequest,
            schemas::AvailabilityResponse,
            schemas::AvailableCabin,
            schemas::CalendarResponse,
            schemas::QuoteRequest,
            schemas::Addon,
            schemas::NightBreakdown,
            schemas::DiscountInfo,
            schemas::PriceBreakdown,
            // Hold schemas
            schemas::HoldStatus,
            schemas::CreateHoldRequest,
            schemas::HoldResponse,
            // Booking schemas
            schemas::BookingStatus,
            schemas::CreateBookingRequest,
            schemas::BookingResponse,
            schemas::TransactionStatus,
            schemas::TransactionResponse,
            // Agent schemas
            schemas::ConversationChannel,
            schemas::ChatRequest,
            schemas::ChatResponse,
            // Admin schemas
            schemas::Hold,
            schemas::AuditAction,
            schemas::AuditEntry,
            schemas::FaqResponse,
            schemas::UpdateFaqRequest,
            schemas::ApproveFaqRequest,
            schemas::BusinessFact,
            schemas::UpsertBusinessFactRequest,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Schema definitions for OpenAPI.
///
/// These mirror the wire shapes in `crate::models`/`crate::services` rather
/// than re-exporting them directly, so the documented contract can diverge
/// deliberately (docs/examples) without requiring `ToSchema` on every
/// internal type.
pub mod schemas {
    use chrono::{DateTime, NaiveDate, Utc};
    use rust_decimal::Decimal;
    use serde::{Deserialize, Serialize};
    use serde_json::Value;
    use utoipa::ToSchema;
    use uuid::Uuid;

    // ============================================================================
    // Error Responses
    // ============================================================================

    /// Standard error response
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct ErrorResponse {
        /// Machine-readable error code
        #[schema(example = "validation_error")]
        pub error: String,
        /// Human-readable error message
        #[schema(example = "Validation failed")]
        pub message: String,
        /// Optional field-level error details
        #[serde(skip_serializing_if = "Option::is_none")]
        pub details: Option<std::collections::HashMap<String, Vec<String>>>,
    }

    // ============================================================================
    // Health Schemas
    // ============================================================================

    /// Basic health check response
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct HealthResponse {
        #[schema(example = "ok")]
        pub status: String,
        #[schema(example = "2026-07-28T10:30:00Z")]
        pub timestamp: String,
        #[schema(example = "0.1.0")]
        pub version: String,
    }

    /// Database health check response
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct DbHealthResponse {
        #[schema(example = "ok")]
        pub status: String,
        #[schema(example = "connected")]
        pub database: String,
        pub timestamp: String,
    }

    /// Redis health check response
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct RedisHealthResponse {
        #[schema(example = "ok")]
        pub status: String,
        #[schema(example = "connected")]
        pub redis: String,
        pub timestamp: String,
    }

    /// Full system health check response
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct SystemHealthResponse {
        #[schema(example = "ok")]
        pub status: String,
        pub timestamp: String,
        #[schema(example = "0.1.0")]
        pub version: String,
        #[schema(example = "connected")]
        pub database: String,
        #[schema(example = "connected")]
        pub redis: String,
    }

    // ============================================================================
    // Cabin / Catalog Schemas
    // ============================================================================

    /// Cabin catalog entry
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct CabinResponse {
        pub id: Uuid,
        #[schema(example = "ZB01")]
        pub short_code: String,
        pub name: String,
        pub area: Option<String>,
        pub max_adults: i32,
        pub max_kids: i32,
        pub features: Vec<String>,
        pub base_price_per_night: Decimal,
        pub weekend_price_per_night: Option<Decimal>,
        pub image_refs: Vec<String>,
        pub street: Option<String>,
        pub city: Option<String>,
        pub postal_code: Option<String>,
    }

    /// Availability search request
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct AvailabilityRequest {
        #[schema(example = "2026-08-10")]
        pub check_in: String,
        #[schema(example = "2026-08-12")]
        pub check_out: String,
        pub adults: Option<i32>,
        pub kids: Option<i32>,
        pub area: Option<String>,
        #[serde(default)]
        pub features: Vec<String>,
        pub cabin: Option<String>,
    }

    /// A cabin matched against an availability search, with price and
    /// occupancy suitability annotated.
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct AvailableCabin {
        pub cabin: CabinResponse,
        pub available: bool,
        pub fits_occupancy: bool,
        pub price_per_night: Decimal,
    }

    /// Availability search response
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct AvailabilityResponse {
        pub check_in: String,
        pub check_out: String,
        pub cabins: Vec<AvailableCabin>,
    }

    /// Monthly free-day calendar for one cabin
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct CalendarResponse {
        pub cabin_id: Uuid,
        pub short_code: String,
        pub year: i32,
        pub month: u32,
        pub free_days: Vec<NaiveDate>,
    }

    /// An add-on line item (e.g. extra bed, late checkout)
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct Addon {
        pub name: String,
        pub price: Decimal,
    }

    /// Price quote request
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct QuoteRequest {
        #[schema(example = "ZB01")]
        pub cabin: String,
        pub check_in: String,
        pub check_out: String,
        #[serde(default)]
        pub addons: Vec<Addon>,
        #[serde(default = "default_true")]
        pub apply_discounts: bool,
    }

    fn default_true() -> bool {
        true
    }

    /// One night's contribution to a price breakdown
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct NightBreakdown {
        pub date: NaiveDate,
        pub is_weekend: bool,
        pub is_holiday: bool,
        pub is_high_season: bool,
        pub price: Decimal,
    }

    /// Discount applied to a quote, if any
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct DiscountInfo {
        pub percent: Decimal,
        pub amount: Decimal,
        pub reason: Option<String>,
    }

    /// Full price breakdown returned by `/quote` and embedded in booking commit
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct PriceBreakdown {
        pub nights: i64,
        pub regular_nights: i64,
        pub weekend_nights: i64,
        pub holiday_nights: i64,
        pub high_season_nights: i64,
        pub base_total: Decimal,
        pub weekend_surcharge: Decimal,
        pub holiday_surcharge: Decimal,
        pub high_season_surcharge: Decimal,
        pub addons_total: Decimal,
        pub addons: Vec<Addon>,
        pub subtotal: Decimal,
        pub discount: DiscountInfo,
        pub total: Decimal,
        pub breakdown: Vec<NightBreakdown>,
    }

    // ============================================================================
    // Hold Schemas
    // ============================================================================

    /// Hold lifecycle state
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    #[serde(rename_all = "snake_case")]
    pub enum HoldStatus {
        Active,
        Converted,
        Released,
    }

    /// A TTL-bounded lock on a cabin/date-range pair
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct Hold {
        pub id: Uuid,
        pub cabin_id: String,
        pub check_in_date: NaiveDate,
        pub check_out_date: NaiveDate,
        pub customer_id: Option<Uuid>,
        pub customer_name: Option<String>,
        pub status: HoldStatus,
        pub created_at: DateTime<Utc>,
        pub expires_at: DateTime<Utc>,
    }

    /// Request to create a hold
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct CreateHoldRequest {
        #[schema(example = "ZB01")]
        pub cabin: String,
        pub check_in: String,
        pub check_out: String,
        pub customer_name: Option<String>,
        pub customer_id: Option<Uuid>,
    }

    /// Hold created or fetched via the hold endpoints
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct HoldResponse {
        pub id: Uuid,
        pub cabin_id: String,
        pub check_in_date: NaiveDate,
        pub check_out_date: NaiveDate,
        pub status: HoldStatus,
        pub expires_at: DateTime<Utc>,
        /// Set when the lock store was unreachable and the hold was created
        /// in the in-process fallback instead.
        #[serde(skip_serializing_if = "Option::is_none")]
        pub warning: Option<String>,
    }

    // ============================================================================
    // Booking Schemas
    // ============================================================================

    /// Booking lifecycle state
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    #[serde(rename_all = "snake_case")]
    pub enum BookingStatus {
        Hold,
        Confirmed,
        Cancelled,
    }

    /// Direct booking commit request
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct CreateBookingRequest {
        #[schema(example = "ZB01")]
        pub cabin: String,
        pub check_in: String,
        pub check_out: String,
        pub adults: i32,
        pub kids: i32,
        pub customer_name: Option<String>,
        pub customer_email: Option<String>,
        pub customer_phone: Option<String>,
        pub hold_id: Option<String>,
        pub total_price: Option<Decimal>,
        pub notes: Option<String>,
        #[serde(default = "default_true")]
        pub create_payment: bool,
    }

    /// A confirmed (or cancelled) booking
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct BookingResponse {
        pub id: Uuid,
        pub cabin_id: Uuid,
        pub customer_id: Option<Uuid>,
        pub check_in_date: NaiveDate,
        pub check_out_date: NaiveDate,
        pub nights: i64,
        pub adults: i32,
        pub kids: i32,
        pub total_price: Decimal,
        pub status: BookingStatus,
        pub calendar_event_ref: Option<String>,
        pub calendar_event_link: Option<String>,
        pub notes: Option<String>,
        pub created_at: DateTime<Utc>,
        /// Present only when payment creation failed but the booking still
        /// committed.
        #[serde(skip_serializing_if = "Option::is_none")]
        pub warning: Option<String>,
    }

    /// Payment transaction lifecycle state
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionStatus {
        Pending,
        Completed,
        Failed,
        Refunded,
    }

    /// A payment transaction associated with a booking
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct TransactionResponse {
        pub id: Uuid,
        pub booking_id: Uuid,
        pub payment_ref: Option<String>,
        pub amount: Decimal,
        pub currency: String,
        pub status: TransactionStatus,
        pub payment_method: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    // ============================================================================
    // Agent Schemas
    // ============================================================================

    /// Channel a conversation arrived on
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    #[serde(rename_all = "snake_case")]
    pub enum ConversationChannel {
        Web,
        Whatsapp,
        Voice,
        Sms,
    }

    /// A turn sent to the conversational agent
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct ChatRequest {
        pub conversation_id: Option<Uuid>,
        #[schema(example = "יש לכם זמינות לסוף השבוע הקרוב?")]
        pub message: String,
        pub channel: Option<ConversationChannel>,
        pub customer_id: Option<Uuid>,
    }

    /// The agent's reply to a turn
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct ChatResponse {
        pub conversation_id: Uuid,
        pub reply: String,
        pub intent: Option<String>,
        pub confidence: Option<f64>,
    }

    // ============================================================================
    // Admin Schemas
    // ============================================================================

    /// Audit log action kind
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum AuditAction {
        Insert,
        Update,
        Delete,
    }

    /// A normalized audit log entry
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct AuditEntry {
        pub id: Uuid,
        pub table_name: String,
        pub record_id: String,
        pub action: AuditAction,
        pub old_values: Option<Value>,
        pub new_values: Option<Value>,
        pub user_id: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    /// A knowledge-base FAQ entry
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct FaqResponse {
        pub id: Uuid,
        pub question: String,
        pub answer: String,
        pub approved: bool,
        pub usage_count: i64,
    }

    /// Admin edit to an existing FAQ entry
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct UpdateFaqRequest {
        pub question: Option<String>,
        pub answer: Option<String>,
        pub approved: Option<bool>,
    }

    /// Approve or reject an agent-suggested FAQ entry
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct ApproveFaqRequest {
        pub id: Uuid,
        pub approve: bool,
        pub question: Option<String>,
        pub answer: Option<String>,
        pub approved_by: Option<String>,
    }

    /// A structured business fact the agent quotes verbatim
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct BusinessFact {
        #[schema(example = "check_in_time")]
        pub fact_key: String,
        #[schema(example = "15:00")]
        pub fact_value: String,
        pub category: String,
        pub description: Option<String>,
        pub is_active: bool,
    }

    /// Create or update a business fact
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct UpsertBusinessFactRequest {
        pub fact_key: String,
        pub fact_value: String,
        pub category: String,
        pub description: Option<String>,
        #[serde(default = "default_true")]
        pub is_active: bool,
    }
}

/// Stub handlers annotated purely for OpenAPI generation. None of these
/// bodies run; the real handlers live in `crate::routes`.
pub mod paths {
    #[allow(unused_imports)]
    use super::schemas::*;

    // ============================================================================
    // Health Endpoints
    // ============================================================================

    /// Basic health check
    #[utoipa::path(
        get,
        path = "/health",
        tag = "health",
        responses(
            (status = 200, description = "Service is healthy", body = HealthResponse)
        )
    )]
    pub async fn health_check() {}

    /// Database health check
    #[utoipa::path(
        get,
        path = "/health/db",
        tag = "health",
        responses(
            (status = 200, description = "Database is connected", body = DbHealthResponse),
            (status = 503, description = "Database is disconnected", body = DbHealthResponse)
        )
    )]
    pub async fn health_check_db() {}

    /// Redis health check
    #[utoipa::path(
        get,
        path = "/health/redis",
        tag = "health",
        responses(
            (status = 200, description = "Redis is connected", body = RedisHealthResponse),
            (status = 503, description = "Redis is disconnected", body = RedisHealthResponse)
        )
    )]
    pub async fn health_check_redis() {}

    /// Full system health check
    #[utoipa::path(
        get,
        path = "/health/full",
        tag = "health",
        responses(
            (status = 200, description = "All services are healthy", body = SystemHealthResponse),
            (status = 503, description = "One or more services are unhealthy", body = SystemHealthResponse)
        )
    )]
    pub async fn health_check_full() {}

    // ============================================================================
    // Catalog Endpoints
    // ============================================================================

    /// List the cabin catalog
    #[utoipa::path(
        get,
        path = "/cabins",
        tag = "cabins",
        responses(
            (status = 200, description = "Cabin catalog", body = [CabinResponse])
        )
    )]
    pub async fn list_cabins() {}

    /// Search availability across the catalog, or a single cabin
    #[utoipa::path(
        post,
        path = "/availability",
        tag = "cabins",
        request_body = AvailabilityRequest,
        responses(
            (status = 200, description = "Matching cabins", body = AvailabilityResponse),
            (status = 400, description = "Invalid or inverted date range", body = ErrorResponse)
        )
    )]
    pub async fn check_availability() {}

    /// Free-day calendar for one cabin in a given month
    #[utoipa::path(
        get,
        path = "/cabin/calendar/{cabin_id}",
        tag = "cabins",
        params(
            ("cabin_id" = String, Path, description = "short_code, UUID, name, or calendar_ref"),
            ("year" = i32, Query, description = "Calendar year"),
            ("month" = u32, Query, description = "Calendar month (1-12)")
        ),
        responses(
            (status = 200, description = "Free days in the requested month", body = CalendarResponse),
            (status = 404, description = "Cabin not found", body = ErrorResponse)
        )
    )]
    pub async fn cabin_calendar() {}

    /// Price a stay
    #[utoipa::path(
        post,
        path = "/quote",
        tag = "cabins",
        request_body = QuoteRequest,
        responses(
            (status = 200, description = "Price breakdown", body = PriceBreakdown),
            (status = 400, description = "Invalid or inverted date range", body = ErrorResponse),
            (status = 404, description = "Cabin not found", body = ErrorResponse)
        )
    )]
    pub async fn quote() {}

    // ============================================================================
    // Hold Endpoints
    // ============================================================================

    /// Create a TTL-bounded hold on a cabin/date-range
    #[utoipa::path(
        post,
        path = "/hold",
        tag = "hold",
        request_body = CreateHoldRequest,
        responses(
            (status = 200, description = "Hold created", body = HoldResponse),
            (status = 404, description = "Cabin not found", body = ErrorResponse),
            (status = 409, description = "Cabin already held or booked for the range", body = ErrorResponse)
        )
    )]
    pub async fn create_hold() {}

    /// Fetch a hold by id
    #[utoipa::path(
        get,
        path = "/hold/{hold_id}",
        tag = "hold",
        params(("hold_id" = uuid::Uuid, Path)),
        responses(
            (status = 200, description = "Hold", body = HoldResponse),
            (status = 404, description = "Hold not found or expired", body = ErrorResponse)
        )
    )]
    pub async fn get_hold() {}

    /// Release a hold before it expires
    #[utoipa::path(
        delete,
        path = "/hold/{hold_id}",
        tag = "hold",
        params(("hold_id" = uuid::Uuid, Path)),
        responses(
            (status = 200, description = "Hold released"),
            (status = 404, description = "Hold not found", body = ErrorResponse)
        )
    )]
    pub async fn release_hold() {}

    // ============================================================================
    // Booking Endpoints
    // ============================================================================

    /// Commit a booking directly, optionally converting an existing hold
    #[utoipa::path(
        post,
        path = "/book",
        tag = "booking",
        request_body = CreateBookingRequest,
        responses(
            (status = 200, description = "Booking confirmed", body = BookingResponse),
            (status = 400, description = "Invalid request", body = ErrorResponse),
            (status = 404, description = "Cabin not found", body = ErrorResponse),
            (status = 409, description = "Cabin busy or held by another hold", body = ErrorResponse)
        )
    )]
    pub async fn create_booking() {}

    // ============================================================================
    // Agent Endpoints
    // ============================================================================

    /// Send a turn to the conversational agent
    #[utoipa::path(
        post,
        path = "/agent/chat",
        tag = "agent",
        request_body = ChatRequest,
        responses(
            (status = 200, description = "Agent reply", body = ChatResponse)
        )
    )]
    pub async fn agent_chat() {}

    // ============================================================================
    // Webhook Endpoints
    // ============================================================================

    /// Receive and verify a payment gateway webhook event
    #[utoipa::path(
        post,
        path = "/webhooks/{gateway}",
        tag = "webhooks",
        params(("gateway" = String, Path, description = "Payment gateway identifier")),
        responses(
            (status = 200, description = "Transaction reconciled"),
            (status = 401, description = "Missing or invalid webhook signature", body = ErrorResponse)
        )
    )]
    pub async fn receive_webhook() {}

    // ============================================================================
    // Admin Endpoints
    // ============================================================================

    /// List currently active holds
    #[utoipa::path(
        get,
        path = "/admin/holds",
        tag = "admin",
        security(("admin_api_key" = [])),
        responses(
            (status = 200, description = "Active holds", body = [Hold]),
            (status = 401, description = "Missing or invalid admin key", body = ErrorResponse)
        )
    )]
    pub async fn admin_list_active_holds() {}

    /// List audit log entries, optionally filtered
    #[utoipa::path(
        get,
        path = "/admin/audit",
        tag = "admin",
        security(("admin_api_key" = [])),
        params(
            ("table_name" = Option<String>, Query),
            ("record_id" = Option<String>, Query),
            ("action" = Option<String>, Query)
        ),
        responses(
            (status = 200, description = "Audit entries", body = [AuditEntry]),
            (status = 401, description = "Missing or invalid admin key", body = ErrorResponse)
        )
    )]
    pub async fn admin_list_audit_entries() {}

    /// List FAQ entries awaiting approval
    #[utoipa::path(
        get,
        path = "/admin/faq/pending",
        tag = "admin",
        security(("admin_api_key" = [])),
        responses(
            (status = 200, description = "Pending FAQ suggestions", body = [FaqResponse])
        )
    )]
    pub async fn admin_pending_faqs() {}

    /// List all FAQ entries
    #[utoipa::path(
        get,
        path = "/admin/faq/all",
        tag = "admin",
        security(("admin_api_key" = [])),
        responses(
            (status = 200, description = "All FAQ entries", body = [FaqResponse])
        )
    )]
    pub async fn admin_all_faqs() {}

    /// Approve or reject an agent-suggested FAQ entry
    #[utoipa::path(
        post,
        path = "/admin/faq/approve",
        tag = "admin",
        security(("admin_api_key" = [])),
        request_body = ApproveFaqRequest,
        responses(
            (status = 200, description = "FAQ approved or rejected", body = FaqResponse),
            (status = 404, description = "FAQ not found", body = ErrorResponse)
        )
    )]
    pub async fn admin_approve_faq() {}

    /// Edit an existing FAQ entry
    #[utoipa::path(
        put,
        path = "/admin/faq/{id}",
        tag = "admin",
        security(("admin_api_key" = [])),
        params(("id" = uuid::Uuid, Path)),
        request_body = UpdateFaqRequest,
        responses(
            (status = 200, description = "FAQ updated", body = FaqResponse),
            (status = 404, description = "FAQ not found", body = ErrorResponse)
        )
    )]
    pub async fn admin_update_faq() {}

    /// Delete a FAQ entry
    #[utoipa::path(
        delete,
        path = "/admin/faq/{id}",
        tag = "admin",
        security(("admin_api_key" = [])),
        params(("id" = uuid::Uuid, Path)),
        responses(
            (status = 200, description = "FAQ deleted"),
            (status = 404, description = "FAQ not found", body = ErrorResponse)
        )
    )]
    pub async fn admin_delete_faq() {}

    /// List business facts, optionally filtered by category
    #[utoipa::path(
        get,
        path = "/admin/business-facts",
        tag = "admin",
        security(("admin_api_key" = [])),
        params(("category" = Option<String>, Query)),
        responses(
            (status = 200, description = "Business facts", body = [BusinessFact])
        )
    )]
    pub async fn admin_list_business_facts() {}

    /// Create or update a business fact
    #[utoipa::path(
        post,
        path = "/admin/business-facts",
        tag = "admin",
        security(("admin_api_key" = [])),
        request_body = UpsertBusinessFactRequest,
        responses(
            (status = 200, description = "Business fact upserted", body = BusinessFact)
        )
    )]
    pub async fn admin_upsert_business_fact() {}

    /// Soft-deactivate a business fact
    #[utoipa::path(
        delete,
        path = "/admin/business-facts/{key}",
        tag = "admin",
        security(("admin_api_key" = [])),
        params(("key" = String, Path)),
        responses(
            (status = 200, description = "Business fact deactivated"),
            (status = 404, description = "Business fact not found", body = ErrorResponse)
        )
    )]
    pub async fn admin_deactivate_business_fact() {}

    /// List bookings, optionally filtered by status
    #[utoipa::path(
        get,
        path = "/admin/bookings",
        tag = "admin",
        security(("admin_api_key" = [])),
        params(("status" = Option<String>, Query)),
        responses(
            (status = 200, description = "Bookings", body = [BookingResponse])
        )
    )]
    pub async fn admin_list_bookings() {}

    /// Fetch one booking with its transaction history
    #[utoipa::path(
        get,
        path = "/admin/bookings/{id}",
        tag = "admin",
        security(("admin_api_key" = [])),
        params(("id" = uuid::Uuid, Path)),
        responses(
            (status = 200, description = "Booking and transactions", body = BookingResponse),
            (status = 404, description = "Booking not found", body = ErrorResponse)
        )
    )]
    pub async fn admin_get_booking() {}

    /// Cancel a booking
    #[utoipa::path(
        post,
        path = "/admin/bookings/{id}/cancel",
        tag = "admin",
        security(("admin_api_key" = [])),
        params(("id" = uuid::Uuid, Path)),
        responses(
            (status = 200, description = "Booking cancelled"),
            (status = 404, description = "Booking not found", body = ErrorResponse)
        )
    )]
    pub async fn admin_cancel_booking() {}
}
