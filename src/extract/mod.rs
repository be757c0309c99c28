use upstream::{UpstreamClient, UpstreamConfig};

pub mod error;
mod handler;
pub mod model;
mod normalize;
pub mod upstream;

pub fn extract_api(config: UpstreamConfig) -> handler::Extractor {
    handler::Extractor::new(UpstreamClient::new(config))
}
