use super::{
    error::{ExtractError, Result},
    model::{ExtractionRequest, NormalizedResult},
    normalize::normalize,
    upstream::UpstreamClient,
};
use crate::utils::{ApiTags, JsonResponse};
use poem_openapi::{payload::Json, OpenApi};
use tracing::{error, info};

pub struct Extractor {
    upstream: UpstreamClient,
}

impl Extractor {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self { upstream }
    }

    /// Validates the request, calls the upstream once and normalizes its payload.
    pub async fn extract(&self, request: &ExtractionRequest) -> Result<NormalizedResult> {
        let url = request.link().ok_or(ExtractError::InvalidInput)?;

        let payload = self.upstream.fetch(url).await?;
        Ok(normalize(&payload))
    }
}

#[OpenApi(tag = "ApiTags::Extraction")]
impl Extractor {
    /// Resolve a share link into its file name, size and stream URLs
    #[oai(path = "/extract", method = "post", operation_id = "extract::extract")]
    async fn extract_link(
        &self,
        payload: Json<ExtractionRequest>,
    ) -> JsonResponse<NormalizedResult> {
        match self.extract(&payload.0).await {
            Ok(result) => {
                info!(
                    url = %payload.url,
                    name = %result.name,
                    streams = result.streams.len(),
                    "Extracted link"
                );
                JsonResponse::ok(result)
            }
            Err(err) => {
                error!(
                    url = %payload.url,
                    endpoint = %self.upstream.config().endpoint,
                    error = %err,
                    "Failed to extract"
                );
                err.into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::upstream::{tests::FakeUpstream, UpstreamConfig};
    use poem::{
        http::StatusCode,
        test::{TestClient, TestResponse},
    };
    use serde_json::json;

    fn client_for(endpoint: &str) -> TestClient<impl poem::Endpoint> {
        TestClient::new(crate::app(UpstreamConfig::new(endpoint), "http://localhost:3000"))
    }

    #[tokio::test]
    async fn extract_normalizes_upstream_payload() {
        let upstream = FakeUpstream::start(
            StatusCode::OK,
            r#"{"title":"Movie.mp4","size_formatted":"1.2GB","fast_stream_url":"https://cdn/x.mp4"}"#,
        )
        .await;
        let cli = client_for(&upstream.endpoint);

        let resp = cli
            .post("/api/extract")
            .body_json(&json!({ "url": "https://terabox.example/s/abc" }))
            .send()
            .await;

        resp.assert_status_is_ok();
        resp.assert_header("Access-Control-Allow-Origin", "*");
        let raw = json!({
            "title": "Movie.mp4",
            "size_formatted": "1.2GB",
            "fast_stream_url": "https://cdn/x.mp4"
        });
        resp.assert_json(json!({
            "status": true,
            "name": "Movie.mp4",
            "size": "1.2GB",
            "thumbnail": null,
            "streams": [{ "quality": "direct", "url": "https://cdn/x.mp4", "raw": raw.clone() }],
            "files": null,
            "raw": raw
        }))
        .await;
    }

    async fn assert_rejected(resp: TestResponse) {
        resp.assert_status(StatusCode::BAD_REQUEST);
        resp.assert_header("Access-Control-Allow-Origin", "*");
        resp.assert_json(json!({
            "status": false,
            "message": "Missing or invalid 'url' in body"
        }))
        .await;
    }

    #[tokio::test]
    async fn missing_url_is_rejected_without_upstream_call() {
        let upstream = FakeUpstream::start(StatusCode::OK, "{}").await;
        let cli = client_for(&upstream.endpoint);

        let resp = cli.post("/api/extract").body_json(&json!({})).send().await;

        assert_rejected(resp).await;
        assert!(upstream.requests().is_empty());
    }

    #[tokio::test]
    async fn numeric_url_is_rejected_without_upstream_call() {
        let upstream = FakeUpstream::start(StatusCode::OK, "{}").await;
        let cli = client_for(&upstream.endpoint);

        let resp = cli
            .post("/api/extract")
            .body_json(&json!({ "url": 42 }))
            .send()
            .await;

        assert_rejected(resp).await;
        assert!(upstream.requests().is_empty());
    }

    #[tokio::test]
    async fn empty_url_is_rejected_without_upstream_call() {
        let upstream = FakeUpstream::start(StatusCode::OK, "{}").await;
        let cli = client_for(&upstream.endpoint);

        let resp = cli
            .post("/api/extract")
            .body_json(&json!({ "url": "" }))
            .send()
            .await;

        assert_rejected(resp).await;
        assert!(upstream.requests().is_empty());
    }

    #[tokio::test]
    async fn body_without_content_type_is_rejected() {
        let upstream = FakeUpstream::start(StatusCode::OK, "{}").await;
        let cli = client_for(&upstream.endpoint);

        let resp = cli.post("/api/extract").send().await;

        assert_rejected(resp).await;
        assert!(upstream.requests().is_empty());
    }

    #[tokio::test]
    async fn non_string_url_never_reaches_upstream() {
        let upstream = FakeUpstream::start(StatusCode::OK, "{}").await;
        let extractor = Extractor::new(UpstreamClient::new(UpstreamConfig::new(&upstream.endpoint)));

        for url in [json!(null), json!(42), json!(true), json!(["https://s/abc"]), json!("")] {
            let err = extractor.extract(&ExtractionRequest { url }).await.unwrap_err();
            assert!(matches!(err, ExtractError::InvalidInput));
        }

        assert!(upstream.requests().is_empty());
    }

    #[tokio::test]
    async fn upstream_error_status_is_bad_gateway() {
        let upstream =
            FakeUpstream::start(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"boom"}"#).await;
        let cli = client_for(&upstream.endpoint);

        let resp = cli
            .post("/api/extract")
            .body_json(&json!({ "url": "https://terabox.example/s/abc" }))
            .send()
            .await;

        resp.assert_status(StatusCode::BAD_GATEWAY);
        resp.assert_json(json!({
            "status": false,
            "message": "Upstream error",
            "code": 500,
            "raw": { "error": "boom" }
        }))
        .await;
    }

    #[tokio::test]
    async fn upstream_invalid_json_is_bad_gateway() {
        let upstream = FakeUpstream::start(StatusCode::OK, "<html>error</html>").await;
        let cli = client_for(&upstream.endpoint);

        let resp = cli
            .post("/api/extract")
            .body_json(&json!({ "url": "https://terabox.example/s/abc" }))
            .send()
            .await;

        resp.assert_status(StatusCode::BAD_GATEWAY);
        resp.assert_json(json!({
            "status": false,
            "message": "Upstream returned invalid JSON",
            "upstreamText": "<html>error</html>"
        }))
        .await;
    }

    #[tokio::test]
    async fn unreachable_upstream_is_internal_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let cli = client_for(&format!("http://{}/extract", addr));

        let resp = cli
            .post("/api/extract")
            .body_json(&json!({ "url": "https://terabox.example/s/abc" }))
            .send()
            .await;

        resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body = resp.json().await;
        body.value().object().get("status").assert_bool(false);
        assert!(!body.value().object().get("message").string().is_empty());
    }

    #[tokio::test]
    async fn extract_twice_gives_identical_results() {
        let upstream = FakeUpstream::start(
            StatusCode::OK,
            r#"{"name":"a.mkv","streams":[{"quality":"1080p","url":"https://cdn/a.mkv"}]}"#,
        )
        .await;
        let extractor = Extractor::new(UpstreamClient::new(UpstreamConfig::new(&upstream.endpoint)));
        let request = ExtractionRequest {
            url: json!("https://terabox.example/s/abc"),
        };

        let first = extractor.extract(&request).await.unwrap();
        let second = extractor.extract(&request).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(upstream.requests().len(), 2);
    }
}
