//! Business logic services module
//!
//! Contains the core business logic for the cabin reservation backend.
//! Services are defined as traits to allow for easy testing and mocking,
//! following the teacher's `XService`/`XServiceImpl` pairing.

pub mod agent;
pub mod audit;
pub mod availability;
pub mod booking;
pub mod calendar_gateway;
pub mod email;
pub mod hold_manager;
pub mod payment_gateway;
pub mod pricing;

// Re-export service traits and implementations
pub use agent::{AgentService, AgentServiceImpl};
pub use audit::AuditService;
pub use availability::{AvailabilityQuery, AvailabilityResolver, AvailableCabin};
pub use booking::{reconcile_transaction, BookingService, BookingServiceImpl, WebhookReconciliationResult};
pub use calendar_gateway::{CalendarEvent, CalendarGatewayClient, CalendarGatewayService, NewEventDetails};
pub use email::{EmailConfig, EmailService, EmailServiceImpl, NoOpEmailService};
pub use hold_manager::{hold_manager_for, CreatedHold, HoldManager};
pub use payment_gateway::{PaymentGatewayClient, PaymentGatewayService, PaymentIntent, WebhookOutcome};
pub use pricing::{Addon, DiscountInfo, NightBreakdown, PriceBreakdown, PricingConfig, PricingEngine};
