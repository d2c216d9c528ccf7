use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tfplug::context::Context;

use super::auth::{Credentials, LoginResponse};
use super::common::decode_document;
use super::error::ApiError;
use super::normalize::{MissingConfiguration, Normalizer};

pub const DEFAULT_BASE_URL: &str = "https://marketplace.otc.t-systems.com/api/v1/seller";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub missing_configuration: MissingConfiguration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            missing_configuration: MissingConfiguration::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_http_client(&self) -> Result<reqwest::Client, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .build()?;
        Ok(client)
    }

    fn validated_base_url(&self) -> Result<String, ApiError> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidEndpoint(format!("{}: {}", self.base_url, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidEndpoint(format!(
                "{}: unsupported scheme {}",
                self.base_url,
                parsed.scheme()
            )));
        }

        Ok(self.base_url.trim_end_matches('/').to_string())
    }
}

/// Marketplace seller API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    auth_header: String,
    normalizer: Normalizer,
}

impl Client {
    /// Create a client around an already issued bearer token
    pub fn new(config: &ClientConfig, token: &str) -> Result<Self, ApiError> {
        let base_url = config.validated_base_url()?;
        let http_client = config.build_http_client()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                auth_header: format!("Bearer {}", token),
                normalizer: Normalizer::new(config.missing_configuration),
            }),
        })
    }

    /// POST /login and build a client around the returned token
    pub async fn login(
        ctx: &Context,
        config: &ClientConfig,
        credentials: &Credentials,
    ) -> Result<Self, ApiError> {
        let base_url = config.validated_base_url()?;
        let http_client = config.build_http_client()?;
        let body = serde_json::to_vec(credentials).map_err(ApiError::Encode)?;

        let request = http_client
            .post(format!("{}/login", base_url))
            .header(CONTENT_TYPE, "application/json")
            .body(body);

        let text = exchange(ctx, request, |status| status == StatusCode::OK).await?;
        let response: LoginResponse = decode(&text)?;
        if response.token.is_empty() {
            return Err(ApiError::MissingToken);
        }

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                auth_header: format!("Bearer {}", response.token),
                normalizer: Normalizer::new(config.missing_configuration),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.inner.normalizer
    }

    /// Send one request and decode the body into `T`. An empty body yields
    /// `T::default()`.
    pub async fn request<T: DeserializeOwned + Default>(
        &self,
        ctx: &Context,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<T, ApiError> {
        let text = self.send(ctx, method, path, body).await?;
        decode(&text)
    }

    /// Like `request`, with the configuration normalizer applied to the
    /// outgoing body and to the response before decoding
    pub async fn request_normalized<T: DeserializeOwned + Default>(
        &self,
        ctx: &Context,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<T, ApiError> {
        let body = match body {
            Some(bytes) => {
                let document: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
                    ApiError::SchemaViolation(format!("request body is not a JSON document: {}", e))
                })?;
                let document = self.inner.normalizer.outbound(document)?;
                Some(serde_json::to_vec(&document).map_err(ApiError::Encode)?)
            }
            None => None,
        };

        let text = self.send(ctx, method, path, body).await?;
        if text.is_empty() {
            tracing::debug!("skipping decode of empty response body");
            return Ok(T::default());
        }

        let document: serde_json::Value = serde_json::from_str(&text).map_err(ApiError::Decode)?;
        let document = self.inner.normalizer.inbound(document)?;
        decode_document(document)
    }

    pub async fn get<T: DeserializeOwned + Default>(
        &self,
        ctx: &Context,
        path: &str,
    ) -> Result<T, ApiError> {
        self.request(ctx, Method::GET, path, None).await
    }

    pub async fn post<T: DeserializeOwned + Default, B: Serialize>(
        &self,
        ctx: &Context,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(ctx, Method::POST, path, Some(encode(body)?))
            .await
    }

    pub async fn patch<T: DeserializeOwned + Default, B: Serialize>(
        &self,
        ctx: &Context,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(ctx, Method::PATCH, path, Some(encode(body)?))
            .await
    }

    pub async fn delete(&self, ctx: &Context, path: &str) -> Result<(), ApiError> {
        self.request::<serde_json::Value>(ctx, Method::DELETE, path, None)
            .await
            .map(|_| ())
    }

    pub async fn get_normalized<T: DeserializeOwned + Default>(
        &self,
        ctx: &Context,
        path: &str,
    ) -> Result<T, ApiError> {
        self.request_normalized(ctx, Method::GET, path, None).await
    }

    pub async fn post_normalized<T: DeserializeOwned + Default, B: Serialize>(
        &self,
        ctx: &Context,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request_normalized(ctx, Method::POST, path, Some(encode(body)?))
            .await
    }

    pub async fn patch_normalized<T: DeserializeOwned + Default, B: Serialize>(
        &self,
        ctx: &Context,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request_normalized(ctx, Method::PATCH, path, Some(encode(body)?))
            .await
    }

    /// Run the inbound normalizer on a document decoded outside the pipeline
    pub fn normalize_inbound(&self, document: serde_json::Value) -> Result<serde_json::Value, ApiError> {
        Ok(self.inner.normalizer.inbound(document)?)
    }

    pub fn products(&self) -> crate::api::products::ProductsApi<'_> {
        crate::api::products::ProductsApi::new(self)
    }

    pub fn product_revisions(&self) -> crate::api::product_revisions::ProductRevisionsApi<'_> {
        crate::api::product_revisions::ProductRevisionsApi::new(self)
    }

    pub fn applications(&self) -> crate::api::applications::ApplicationsApi<'_> {
        crate::api::applications::ApplicationsApi::new(self)
    }

    pub fn account(&self) -> crate::api::account::AccountApi<'_> {
        crate::api::account::AccountApi::new(self)
    }

    pub fn infrastructure(&self) -> crate::api::infrastructure::InfrastructureApi<'_> {
        crate::api::infrastructure::InfrastructureApi::new(self)
    }

    pub fn categories(&self) -> crate::api::categories::CategoriesApi<'_> {
        crate::api::categories::CategoriesApi::new(self)
    }

    pub fn sales_history(&self) -> crate::api::sales_history::SalesHistoryApi<'_> {
        crate::api::sales_history::SalesHistoryApi::new(self)
    }

    async fn send(
        &self,
        ctx: &Context,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<String, ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);
        tracing::debug!("{} request to: {}", method, url);

        let mut request = self
            .inner
            .http_client
            .request(method, &url)
            .header(AUTHORIZATION, &self.inner.auth_header)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.body(body);
        }

        exchange(ctx, request, |status| status.is_success()).await
    }
}

/// Issue the request, check the status and read the body, giving up as soon
/// as the context is cancelled or its deadline passes
async fn exchange<F>(
    ctx: &Context,
    request: reqwest::RequestBuilder,
    accept: F,
) -> Result<String, ApiError>
where
    F: Fn(StatusCode) -> bool,
{
    if ctx.is_cancelled() {
        return Err(interrupted(ctx));
    }

    let call = async {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().to_string();
        if !accept(status) {
            tracing::debug!("url: {}, unexpected status: {}", url, status);
            return Err(ApiError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        tracing::debug!("url: {}, status: {}, body: {}", url, status, text);
        Ok(text)
    };

    tokio::select! {
        result = call => result,
        _ = ctx.cancelled() => Err(interrupted(ctx)),
    }
}

fn interrupted(ctx: &Context) -> ApiError {
    if ctx.deadline_exceeded() {
        ApiError::DeadlineExceeded
    } else {
        ApiError::Cancelled
    }
}

fn encode<B: Serialize>(body: &B) -> Result<Vec<u8>, ApiError> {
    serde_json::to_vec(body).map_err(ApiError::Encode)
}

fn decode<T: DeserializeOwned + Default>(text: &str) -> Result<T, ApiError> {
    if text.is_empty() {
        tracing::debug!("skipping decode of empty response body");
        return Ok(T::default());
    }
    let document: serde_json::Value = serde_json::from_str(text).map_err(ApiError::Decode)?;
    decode_document(document)
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Thing {
        id: String,
        #[serde(default)]
        weight: i64,
    }

    #[derive(Debug, Default, Deserialize)]
    struct Revision {
        configuration: Vec<Entry>,
    }

    #[derive(Debug, Default, Deserialize)]
    struct Entry {
        input_type: String,
        default_value: Option<String>,
    }

    fn client_for(server: &Server) -> Client {
        let config = ClientConfig::default().with_base_url(server.url());
        Client::new(&config, "secret-token").unwrap()
    }

    #[tokio::test]
    async fn request_sends_bearer_and_content_type() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/things/1")
            .match_header("authorization", "Bearer secret-token")
            .match_header("content-type", "application/json")
            .with_body(r#"{"id":"1","weight":3}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let thing: Thing = client.get(&Context::new(), "/things/1").await.unwrap();
        assert_eq!(
            thing,
            Thing {
                id: "1".to_string(),
                weight: 3
            }
        );

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn post_serializes_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/things")
            .match_body(Matcher::Json(json!({"name": "widget"})))
            .with_status(201)
            .with_body(r#"{"id":"new"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let thing: Thing = client
            .post(&Context::new(), "/things", &json!({"name": "widget"}))
            .await
            .unwrap();
        assert_eq!(thing.id, "new");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_body_decodes_to_default() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/things/1")
            .with_status(204)
            .create_async()
            .await;

        let client = client_for(&server);
        client.delete(&Context::new(), "/things/1").await.unwrap();

        let thing: Thing = client
            .request(&Context::new(), Method::DELETE, "/things/1", None)
            .await
            .unwrap();
        assert_eq!(thing, Thing::default());
    }

    #[tokio::test]
    async fn non_success_status_is_reported_without_decoding() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/product-revisions/1")
            .with_status(500)
            .with_body(r#"{"configuration":"not an array"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let result: Result<Revision, _> = client
            .get_normalized(&Context::new(), "/product-revisions/1")
            .await;
        assert!(matches!(
            result,
            Err(ApiError::UnexpectedStatus { status: 500 })
        ));
    }

    #[tokio::test]
    async fn redirect_range_is_not_success() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/things/1")
            .with_status(304)
            .create_async()
            .await;

        let client = client_for(&server);
        let result: Result<Thing, _> = client.get(&Context::new(), "/things/1").await;
        assert_eq!(result.unwrap_err().status(), Some(304));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/things/1")
            .with_body("{not json")
            .create_async()
            .await;

        let client = client_for(&server);
        let result: Result<Thing, _> = client.get(&Context::new(), "/things/1").await;
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[tokio::test]
    async fn normalized_request_rewrites_both_directions() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/product-revisions")
            .match_body(Matcher::Json(json!({
                "configuration": [{"input_type": "switch", "default_value": true}]
            })))
            .with_body(r#"{"configuration":[{"input_type":"switch","default_value":true}]}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let revision: Revision = client
            .post_normalized(
                &Context::new(),
                "/product-revisions",
                &json!({"configuration": [{"input_type": "switch", "default_value": "\"True\""}]}),
            )
            .await
            .unwrap();

        assert_eq!(revision.configuration[0].input_type, "switch");
        assert_eq!(
            revision.configuration[0].default_value.as_deref(),
            Some("true")
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn coercion_failure_aborts_before_sending() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/product-revisions")
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server);
        let result: Result<Revision, _> = client
            .post_normalized(
                &Context::new(),
                "/product-revisions",
                &json!({"configuration": [{"input_type": "switch", "default_value": "maybe"}]}),
            )
            .await;

        match result {
            Err(ApiError::Coercion {
                original,
                sanitized,
            }) => {
                assert_eq!(original, "maybe");
                assert_eq!(sanitized, "maybe");
            }
            other => panic!("expected coercion error, got {:?}", other.map(|_| ())),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn normalized_response_with_bad_shape_is_schema_violation() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/product-revisions/1")
            .with_body(r#"{"configuration":[{"default_value":"x"}]}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let result: Result<Revision, _> = client
            .get_normalized(&Context::new(), "/product-revisions/1")
            .await;
        assert!(matches!(result, Err(ApiError::SchemaViolation(_))));
    }

    #[tokio::test]
    async fn strict_policy_rejects_missing_configuration() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/product-revisions/1")
            .with_body(r#"{"id":"1"}"#)
            .expect(2)
            .create_async()
            .await;

        let lenient = client_for(&server);
        let value: serde_json::Value = lenient
            .get_normalized(&Context::new(), "/product-revisions/1")
            .await
            .unwrap();
        assert_eq!(value, json!({"id": "1"}));

        let config = ClientConfig {
            missing_configuration: MissingConfiguration::Reject,
            ..ClientConfig::default().with_base_url(server.url())
        };
        let strict = Client::new(&config, "secret-token").unwrap();
        let result: Result<serde_json::Value, _> = strict
            .get_normalized(&Context::new(), "/product-revisions/1")
            .await;
        assert!(matches!(result, Err(ApiError::SchemaViolation(_))));
    }

    #[tokio::test]
    async fn connection_failure_is_transport_error() {
        let config = ClientConfig::default().with_base_url("http://127.0.0.1:1");
        let client = Client::new(&config, "token").unwrap();

        let result: Result<Thing, _> = client.get(&Context::new(), "/things").await;
        assert!(matches!(result, Err(ApiError::Transport(_))));
    }

    #[tokio::test]
    async fn cancelled_context_fails_without_io() {
        let mut server = Server::new_async().await;
        let mock = server.mock("GET", "/things").expect(0).create_async().await;

        let client = client_for(&server);
        let ctx = Context::new();
        ctx.cancel();

        let result: Result<Thing, _> = client.get(&ctx, "/things").await;
        assert!(matches!(result, Err(ApiError::Cancelled)));
        mock.assert_async().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn deadline_abandons_slow_call() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/things")
            .with_chunked_body(|w| {
                std::thread::sleep(std::time::Duration::from_secs(2));
                w.write_all(b"{}")
            })
            .create_async()
            .await;

        let client = client_for(&server);
        let ctx = Context::new().with_timeout(Duration::from_millis(100));

        let start = std::time::Instant::now();
        let result: Result<Thing, _> = client.get(&ctx, "/things").await;
        assert!(matches!(result, Err(ApiError::DeadlineExceeded)));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let config = ClientConfig::default().with_base_url("not a url");
        assert!(matches!(
            Client::new(&config, "t"),
            Err(ApiError::InvalidEndpoint(_))
        ));

        let config = ClientConfig::default().with_base_url("ftp://example.com");
        assert!(matches!(
            Client::new(&config, "t"),
            Err(ApiError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = ClientConfig::default().with_base_url("https://example.com/api/v1/seller/");
        let client = Client::new(&config, "t").unwrap();
        assert_eq!(client.base_url(), "https://example.com/api/v1/seller");
    }

    #[tokio::test]
    async fn login_returns_authenticated_client() {
        let mut server = Server::new_async().await;
        let login = server
            .mock("POST", "/login")
            .match_body(Matcher::Json(json!({
                "domain_name": "OTC-EU-DE-001",
                "username": "seller",
                "password": "pw"
            })))
            .with_body(r#"{"token":"issued"}"#)
            .create_async()
            .await;
        let whoami = server
            .mock("GET", "/things/1")
            .match_header("authorization", "Bearer issued")
            .with_body(r#"{"id":"1"}"#)
            .create_async()
            .await;

        let config = ClientConfig::default().with_base_url(server.url());
        let credentials = Credentials::new("OTC-EU-DE-001", "seller", "pw");
        let client = Client::login(&Context::new(), &config, &credentials)
            .await
            .unwrap();
        let _: Thing = client.get(&Context::new(), "/things/1").await.unwrap();

        login.assert_async().await;
        whoami.assert_async().await;
    }

    #[tokio::test]
    async fn login_requires_ok_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/login")
            .with_status(201)
            .with_body(r#"{"token":"issued"}"#)
            .create_async()
            .await;

        let config = ClientConfig::default().with_base_url(server.url());
        let credentials = Credentials::new("d", "u", "p");
        let result = Client::login(&Context::new(), &config, &credentials).await;
        assert!(matches!(
            result,
            Err(ApiError::UnexpectedStatus { status: 201 })
        ));
    }

    #[tokio::test]
    async fn login_requires_token() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/login")
            .with_body(r#"{"token":""}"#)
            .create_async()
            .await;

        let config = ClientConfig::default().with_base_url(server.url());
        let credentials = Credentials::new("d", "u", "p");
        let result = Client::login(&Context::new(), &config, &credentials).await;
        assert!(matches!(result, Err(ApiError::MissingToken)));
        assert_eq!(
            result.err().map(|e| e.to_string()).as_deref(),
            Some("token is missing from the API response")
        );
    }
}
