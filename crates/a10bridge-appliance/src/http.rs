//! HTTP transport shared by both protocol versions
//!
//! Both API versions wrap failures in the same envelope:
//! `{"response":{"status":"fail","err":{"code":N,"msg":"..."}}}`. A body
//! carrying that envelope becomes an [`ApplianceError`] with the appliance's
//! code, whatever the HTTP status. Anything else that goes wrong (transport,
//! unexpected status, undecodable body) is a local error with code 0.

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use a10bridge_common::config::ApplianceInstance;
use a10bridge_common::ApplianceError;

const FAIL_STATUS: &str = "fail";

#[derive(Debug, Deserialize)]
struct Envelope {
    response: Option<EnvelopeResult>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeResult {
    #[serde(default)]
    status: String,
    err: Option<EnvelopeError>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: String,
}

/// Reqwest client bound to one appliance base URL
pub(crate) struct Transport {
    http: Client,
    base: Url,
}

impl Transport {
    /// Build a transport for `instance`
    pub(crate) fn new(
        instance: &ApplianceInstance,
        timeout: Duration,
    ) -> Result<Self, ApplianceError> {
        let base = Url::parse(&instance.api_url).map_err(|e| {
            ApplianceError::local(format!("invalid apiUrl '{}': {e}", instance.api_url))
        })?;
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .danger_accept_invalid_certs(instance.insecure_skip_verify)
            .build()
            .map_err(|e| ApplianceError::local(format!("failed to build http client: {e}")))?;
        Ok(Self { http, base })
    }

    /// Base URL extended with `segments`, each percent-encoded as one path segment
    ///
    /// An empty final segment produces a trailing slash.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, ApplianceError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ApplianceError::local(format!("apiUrl '{}' cannot be a base URL", self.base))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request with a JSON body and decode the response
    pub(crate) async fn send_json<B, R>(
        &self,
        method: Method,
        url: Url,
        authorization: Option<&str>,
        body: &B,
    ) -> Result<R, ApplianceError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.request(method, url, authorization).json(body);
        execute(request).await
    }

    /// Send a request without a body and decode the response
    pub(crate) async fn send<R>(
        &self,
        method: Method,
        url: Url,
        authorization: Option<&str>,
    ) -> Result<R, ApplianceError>
    where
        R: DeserializeOwned,
    {
        execute(self.request(method, url, authorization)).await
    }

    fn request(&self, method: Method, url: Url, authorization: Option<&str>) -> RequestBuilder {
        // The query string may carry credentials, only the path is logged
        debug!(method = %method, path = %url.path(), "appliance request");
        let request = self.http.request(method, url);
        match authorization {
            Some(value) => request.header(AUTHORIZATION, value),
            None => request,
        }
    }
}

async fn execute<R: DeserializeOwned>(request: RequestBuilder) -> Result<R, ApplianceError> {
    let response = request
        .send()
        .await
        .map_err(|e| ApplianceError::local(format!("request failed: {e}")))?;
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| ApplianceError::local(format!("failed to read response body: {e}")))?;
    decode_response(status, &body)
}

/// Turn an HTTP status and body into either the decoded payload or an error
pub(crate) fn decode_response<R: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
) -> Result<R, ApplianceError> {
    let value: Option<Value> = if body.iter().all(u8::is_ascii_whitespace) {
        Some(Value::Null)
    } else {
        serde_json::from_slice(body).ok()
    };

    if let Some(err) = value.as_ref().and_then(appliance_failure) {
        return Err(err);
    }

    if !status.is_success() {
        return Err(ApplianceError::local(format!(
            "unexpected HTTP status {status}"
        )));
    }

    let value = value.ok_or_else(|| ApplianceError::local("response body is not valid JSON"))?;
    serde_json::from_value(value)
        .map_err(|e| ApplianceError::local(format!("failed to decode response: {e}")))
}

fn appliance_failure(value: &Value) -> Option<ApplianceError> {
    let envelope = Envelope::deserialize(value).ok()?;
    let result = envelope.response?;
    if !result.status.eq_ignore_ascii_case(FAIL_STATUS) {
        return None;
    }
    let err = result.err.unwrap_or(EnvelopeError {
        code: 0,
        msg: "appliance reported failure without details".to_string(),
    });
    Some(ApplianceError::new(err.code, err.msg))
}
