//! Custom middleware module
//!
//! Contains middleware for admin authorization, CORS, rate limiting, and
//! request processing. There is no end-user JWT middleware in this domain —
//! the only authenticated surface is the admin API, gated by a shared
//! secret (see [`admin::admin_middleware`]).

pub mod admin;
pub mod cors;
pub mod rate_limit;

// Re-export commonly used items for convenience
pub use admin::admin_middleware;
pub use cors::{cors_layer, cors_layer_permissive};
pub use rate_limit::{
    default_rate_limit_layer, rate_limit_middleware, strict_rate_limit_layer, RateLimitConfig,
    RateLimiter,
};
