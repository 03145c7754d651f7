//! Flow invocation: one POST per call, failures mapped to [`FlowError`].

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::auth::AuthContext;
use crate::error::{truncate_body, FlowError, Result, LOG_BODY_LIMIT};
use crate::request::{InvocationRequest, Tweaks};
use crate::transport::{FlowTransport, HttpRequest};

/// Raw JSON returned by the remote flow engine
pub type InvocationResult = Value;

/// Invokes flows on a Langflow deployment
pub struct FlowInvoker<T> {
    auth: AuthContext,
    transport: T,
}

impl<T: FlowTransport> FlowInvoker<T> {
    pub fn new(auth: AuthContext, transport: T) -> Self {
        Self { auth, transport }
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build the HTTP request without sending it
    pub fn build_request(&self, endpoint: &str, request: &InvocationRequest) -> Result<HttpRequest> {
        let url = self.auth.run_url(endpoint)?;

        let mut headers = Vec::with_capacity(2);
        if let Some(bearer) = self.auth.bearer() {
            headers.push(("Authorization".to_string(), bearer));
        }
        headers.push(("Content-Type".to_string(), "application/json".to_string()));

        Ok(HttpRequest {
            url,
            headers,
            body: request.to_body(),
        })
    }

    /// Run the flow behind `endpoint` (empty = default flow id).
    ///
    /// Exactly one transport call is made once the request is built. Only
    /// HTTP 200 counts as success; nothing is retried.
    #[instrument(skip_all, fields(endpoint = %endpoint, authenticated = self.auth.is_authenticated()))]
    pub async fn invoke(&self, endpoint: &str, request: &InvocationRequest) -> Result<InvocationResult> {
        let http_request = self.build_request(endpoint, request)?;
        let url = http_request.url.clone();

        if !self.auth.is_authenticated() {
            warn!("no application token configured; sending unauthenticated request");
        }
        debug!(%url, tweaks = request.tweaks.len(), "invoking flow");

        let response = self.transport.send(http_request).await?;

        if response.status != 200 {
            warn!(
                status = response.status,
                body = %truncate_body(&response.body, LOG_BODY_LIMIT),
                "flow invocation rejected"
            );
            return Err(FlowError::remote(response.status, response.body));
        }

        serde_json::from_str(&response.body).map_err(|e| FlowError::invalid_response(url, e))
    }

    /// Chat-typed invocation with tweaks given as a raw JSON string.
    ///
    /// Malformed tweaks fail with `Configuration` before the transport is touched.
    pub async fn invoke_message(
        &self,
        message: &str,
        endpoint: &str,
        tweaks_json: Option<&str>,
    ) -> Result<InvocationResult> {
        let tweaks = match tweaks_json {
            Some(raw) => Tweaks::from_json(raw)?,
            None => Tweaks::default(),
        };
        let request = InvocationRequest::new(message).with_tweaks(tweaks);
        self.invoke(endpoint, &request).await
    }
}
