//! Server configuration
//!
//! All settings can be overridden through environment variables:
//!
//! | Variable | Default | Purpose |
//! |----------|---------|---------|
//! | HTTP_PORT | 4000 | HTTP API port |
//! | DB_PATH | orchestrator.redb | redb database file |
//! | PHARMACY_SERVICE_URL | http://localhost:3001 | Pharmacy service base URL |
//! | LAB_SERVICE_URL | http://localhost:3002 | Laboratory service base URL |
//! | RADIOLOGY_SERVICE_URL | http://localhost:3003 | Radiology service base URL |
//! | DISPATCH_TIMEOUT_MS | 5000 | Per-dispatch request timeout |
//! | ORDER_NUMBER_PREFIX | UCO | Order number prefix |
//! | ORDER_NUMBER_MAX_ATTEMPTS | 5 | Bounded retries on number collision |
//! | PORTAL_NAME | clinical-workflow | `x-portal` header on outbound calls |
//! | ENVIRONMENT | development | Runtime environment tag |

#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API port
    pub http_port: u16,
    /// redb database file path
    pub db_path: String,
    /// Pharmacy service base URL
    pub pharmacy_service_url: String,
    /// Laboratory service base URL
    pub lab_service_url: String,
    /// Radiology service base URL
    pub radiology_service_url: String,
    /// Outbound dispatch timeout (milliseconds)
    pub dispatch_timeout_ms: u64,
    /// Order number prefix
    pub order_number_prefix: String,
    /// Bounded attempts when an order number candidate collides
    pub order_number_max_attempts: u32,
    /// Portal tag sent to downstream services
    pub portal_name: String,
    /// Runtime environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(4000),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "orchestrator.redb".into()),
            pharmacy_service_url: std::env::var("PHARMACY_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:3001".into()),
            lab_service_url: std::env::var("LAB_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:3002".into()),
            radiology_service_url: std::env::var("RADIOLOGY_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:3003".into()),
            dispatch_timeout_ms: std::env::var("DISPATCH_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            order_number_prefix: std::env::var("ORDER_NUMBER_PREFIX")
                .unwrap_or_else(|_| "UCO".into()),
            order_number_max_attempts: std::env::var("ORDER_NUMBER_MAX_ATTEMPTS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5),
            portal_name: std::env::var("PORTAL_NAME")
                .unwrap_or_else(|_| "clinical-workflow".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// Config pointing at localhost services, for tests
    pub fn default_for_tests() -> Self {
        Self {
            http_port: 0,
            db_path: String::new(),
            pharmacy_service_url: "http://localhost:3001".into(),
            lab_service_url: "http://localhost:3002".into(),
            radiology_service_url: "http://localhost:3003".into(),
            dispatch_timeout_ms: 2000,
            order_number_prefix: "UCO".into(),
            order_number_max_attempts: 5,
            portal_name: "clinical-workflow".into(),
            environment: "test".into(),
        }
    }
}
