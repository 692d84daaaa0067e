pub mod client_ip;
pub mod limiter;
pub mod messages;
pub mod middleware;
pub mod policy;
pub mod sliding_window;
pub mod sorted_set;

pub use client_ip::resolve_client_ip;
pub use limiter::{Decision, Limiter};
pub use messages::Language;
pub use middleware::{rate_limit_middleware, RateLimitState};
pub use policy::{Algorithm, FailurePolicy, MethodQuota, RateLimitPolicy};
pub use sliding_window::SlidingWindowLimiter;
pub use sorted_set::AtomicRedisLimiter;
