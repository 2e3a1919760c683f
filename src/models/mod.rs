//! Data models module
//!
//! Contains struct definitions for database entities and API types.
//! Models are organized by domain and include both database entities
//! (with sqlx::FromRow) and DTOs for request/response handling.

pub mod audit;
pub mod booking;
pub mod cabin;
pub mod conversation;
pub mod customer;
pub mod faq;
pub mod hold;
pub mod transaction;

// Re-export commonly used types for convenience

pub use cabin::{Cabin, CabinFeatures, CabinResponse, CreateCabinRequest};

pub use customer::{Customer, CustomerResponse, UpsertCustomerRequest};

pub use booking::{Booking, BookingListFilter, BookingResponse, BookingStatus, CreateBookingRequest};

pub use transaction::{Transaction, TransactionResponse, TransactionStatus};

pub use hold::{CreateHoldRequest, Hold, HoldResponse, HoldStatus};

pub use conversation::{
    ChatRequest, ChatResponse, Conversation, ConversationChannel, ConversationStatus, Message,
    MessageRole, TurnContext,
};

pub use faq::{
    ApproveFaqRequest, BusinessFact, Faq, FaqResponse, SuggestFaqRequest, UpdateFaqRequest,
    UpsertBusinessFactRequest,
};

pub use audit::{AuditAction, AuditEntry, AuditEntryRow, AuditListFilter};
