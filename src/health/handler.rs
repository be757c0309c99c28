use crate::utils::ApiTags;
use poem_openapi::{payload::PlainText, OpenApi};

pub struct HealthCheck;

#[OpenApi(tag = "ApiTags::HealthCheck")]
impl HealthCheck {
    #[oai(path = "/liveness", method = "get")]
    async fn liveness(&self) -> PlainText<String> {
        PlainText("OK".to_string())
    }
}
