use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::traits::ToRpcParams;
use jsonrpsee::http_client::HttpClient;
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_json::value::RawValue;
use std::time::Duration;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("Request failed: {0}")]
    RequestError(String),
    #[error("Call rejected by the server: {0}")]
    Rejected(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Parameters of a single JSON-RPC call.
///
/// `condenser_api` and the wallet take positional arguments, while the
/// debug node API expects a named-argument object.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcParams {
    Positional(Vec<Value>),
    ByName(Vec<(&'static str, Value)>),
}

impl RpcParams {
    pub fn none() -> Self {
        RpcParams::Positional(Vec::new())
    }

    pub fn into_value(self) -> Value {
        match self {
            RpcParams::Positional(values) => Value::Array(values),
            RpcParams::ByName(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), value))
                    .collect(),
            ),
        }
    }
}

impl ToRpcParams for RpcParams {
    // Empty positional params are still sent as `[]`, the node rejects a missing field.
    fn to_rpc_params(self) -> Result<Option<Box<RawValue>>, serde_json::Error> {
        serde_json::value::to_raw_value(&self.into_value()).map(Some)
    }
}

pub trait RpcClient: Send + Sync {
    fn call<T: DeserializeOwned + Send>(
        &self,
        method: &str,
        params: RpcParams,
    ) -> impl Future<Output = Result<T, ClientError>> + Send;
}

#[derive(Clone)]
pub struct HttpRpcClient {
    url: String,
    inner: HttpClient,
}

impl HttpRpcClient {
    pub fn new(url: &str, request_timeout: Duration) -> Result<Self, ClientError> {
        let inner = HttpClient::builder()
            .request_timeout(request_timeout)
            .build(url)
            .map_err(|e| ClientError::InvalidEndpoint(format!("{url}: {e}")))?;
        Ok(Self {
            url: url.to_string(),
            inner,
        })
    }
}

impl RpcClient for HttpRpcClient {
    async fn call<T: DeserializeOwned + Send>(
        &self,
        method: &str,
        params: RpcParams,
    ) -> Result<T, ClientError> {
        tracing::debug!(url = %self.url, method, ?params, "Sending request");
        let response: Value = self.inner.request(method, params).await?;
        tracing::trace!(method, %response, "Response received");
        serde_json::from_value(response)
            .map_err(|e| ClientError::InvalidResponse(format!("{method}: {e}")))
    }
}

impl From<jsonrpsee::core::ClientError> for ClientError {
    fn from(value: jsonrpsee::core::ClientError) -> Self {
        match value {
            jsonrpsee::core::ClientError::Call(error) => {
                let details = error.data().map(|data| data.get()).unwrap_or_default();
                ClientError::Rejected(format!("{} {}", error.message(), details).trim().to_string())
            }
            jsonrpsee::core::ClientError::ParseError(e) => ClientError::InvalidResponse(e.to_string()),
            e => ClientError::RequestError(e.to_string()),
        }
    }
}
