pub mod health;
pub mod metrics;
pub mod tracing;

pub use self::tracing::init_tracing;
pub use health::{HealthChecker, HealthStatus};
pub use metrics::MetricsRecorder;
