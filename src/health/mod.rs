pub mod handler;

pub fn health_checks() -> handler::HealthCheck {
    handler::HealthCheck
}
