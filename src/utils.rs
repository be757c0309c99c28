use crate::extract::error::ExtractError;
use poem::{
    http::{header, HeaderValue, Method, StatusCode},
    Endpoint, Error as PoemError, IntoResponse, Middleware, Request, Response,
    Result as PoemResult,
};
use poem_openapi::{
    error::{ContentTypeError, ParseRequestPayloadError},
    payload::Json,
    types::{ParseFromJSON, ToJSON},
    {ApiResponse, Object, Tags},
};
use serde_json::Value;
use std::env;

#[derive(Tags)]
pub enum ApiTags {
    /// Share link extraction
    Extraction,
    /// Health check endpoints
    HealthCheck,
}

pub fn get_host() -> String {
    let host = env::var("HOST").unwrap_or("http://localhost:3000".to_string());
    return host;
}

pub fn get_port() -> String {
    let port = env::var("PORT").unwrap_or("3000".to_string());
    return port;
}

/// Failure body
#[derive(Debug, Object, Clone, PartialEq)]
pub struct ErrorBody {
    /// Always false
    status: bool,
    /// What went wrong
    message: String,
    /// Status code returned by the upstream
    #[oai(skip_serializing_if_is_none)]
    code: Option<u16>,
    /// Body returned by the upstream
    #[oai(skip_serializing_if_is_none)]
    raw: Option<Value>,
    /// Upstream body that could not be parsed as JSON
    #[oai(rename = "upstreamText", skip_serializing_if_is_none)]
    upstream_text: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl ToString) -> Self {
        ErrorBody {
            status: false,
            message: message.to_string(),
            code: None,
            raw: None,
            upstream_text: None,
        }
    }
}

/// Every response an operation can produce. Request-parse failures land in
/// `bad_request_handler`, so they share the JSON failure body.
#[derive(ApiResponse)]
#[oai(bad_request_handler = "bad_request_handler")]
pub enum JsonResponse<T: ParseFromJSON + ToJSON + Send + Sync> {
    #[oai(status = 200)]
    Ok(Json<T>),
    #[oai(status = 400)]
    BadRequest(Json<ErrorBody>),
    #[oai(status = 500)]
    InternalServerError(Json<ErrorBody>),
    #[oai(status = 502)]
    BadGateway(Json<ErrorBody>),
}

impl<T: ParseFromJSON + ToJSON + Send + Sync> JsonResponse<T> {
    pub fn ok(data: T) -> Self {
        JsonResponse::Ok(Json(data))
    }

    pub fn bad_request(message: impl ToString) -> Self {
        JsonResponse::BadRequest(Json(ErrorBody::new(message)))
    }

    pub fn internal_server_error(message: impl ToString) -> Self {
        JsonResponse::InternalServerError(Json(ErrorBody::new(message)))
    }
}

impl<T: ParseFromJSON + ToJSON + Send + Sync> From<ExtractError> for JsonResponse<T> {
    fn from(err: ExtractError) -> Self {
        let message = err.to_string();
        match err {
            ExtractError::InvalidInput => JsonResponse::bad_request(message),
            ExtractError::Upstream { code, raw } => JsonResponse::BadGateway(Json(ErrorBody {
                code: Some(code),
                raw: Some(raw),
                ..ErrorBody::new(message)
            })),
            ExtractError::UpstreamMalformed { text } => JsonResponse::BadGateway(Json(ErrorBody {
                upstream_text: Some(text),
                ..ErrorBody::new(message)
            })),
            ExtractError::Internal(_) => JsonResponse::internal_server_error(message),
        }
    }
}

fn bad_request_handler<T: ParseFromJSON + ToJSON + Send + Sync>(err: PoemError) -> JsonResponse<T> {
    if err.is::<ParseRequestPayloadError>() || err.is::<ContentTypeError>() {
        JsonResponse::from(ExtractError::InvalidInput)
    } else {
        JsonResponse::internal_server_error(err)
    }
}

/// Answers CORS preflight, turns away anything but `POST` and stamps
/// permissive CORS headers on every response.
pub struct PostOnly;

impl<E: Endpoint> Middleware<E> for PostOnly {
    type Output = PostOnlyEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        PostOnlyEndpoint { ep }
    }
}

pub struct PostOnlyEndpoint<E> {
    ep: E,
}

impl<E: Endpoint> Endpoint for PostOnlyEndpoint<E> {
    type Output = Response;

    async fn call(&self, req: Request) -> PoemResult<Self::Output> {
        let mut res = match *req.method() {
            Method::OPTIONS => StatusCode::NO_CONTENT.into_response(),
            Method::POST => match self.ep.call(req).await {
                Ok(res) => res.into_response(),
                Err(err) => err.into_response(),
            },
            _ => Json(ErrorBody::new("Method not allowed, use POST"))
                .with_status(StatusCode::METHOD_NOT_ALLOWED)
                .into_response(),
        };

        let headers = res.headers_mut();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        );

        Ok(res)
    }
}
