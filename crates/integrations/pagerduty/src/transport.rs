use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::warn;
use url::Url;

use crate::error::PagerDutyError;

/// Status and full body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A closable HTTP connection used for exactly one dispatch.
pub trait Transport: Send + Sync {
    /// POST a JSON body and read the whole response body, whatever the
    /// HTTP status.
    fn post_json(
        &self,
        url: &Url,
        body: Vec<u8>,
    ) -> impl std::future::Future<Output = Result<RawResponse, PagerDutyError>> + Send;

    /// Release the underlying client. Called once per transport.
    fn close(&mut self) -> Result<(), PagerDutyError>;
}

/// Produces a fresh [`Transport`] for each dispatch.
pub trait TransportFactory: Send + Sync {
    type Transport: Transport;

    fn create(&self) -> Result<Self::Transport, PagerDutyError>;
}

/// [`Transport`] over a `reqwest` client.
pub struct ReqwestTransport {
    client: Option<Client>,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client: Some(client),
        }
    }
}

impl Transport for ReqwestTransport {
    async fn post_json(&self, url: &Url, body: Vec<u8>) -> Result<RawResponse, PagerDutyError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| PagerDutyError::Transport("client already closed".into()))?;

        let response = client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }

    fn close(&mut self) -> Result<(), PagerDutyError> {
        // Dropping the last handle shuts down the connection pool.
        self.client.take();
        Ok(())
    }
}

/// Creates a [`ReqwestTransport`] per dispatch.
///
/// By default every dispatch builds its own client. [`with_client`](Self::with_client)
/// injects a shared client instead, so callers can reuse one connection pool.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransportFactory {
    shared: Option<Client>,
}

impl ReqwestTransportFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out clones of `client` instead of building a new client each time.
    pub fn with_client(client: Client) -> Self {
        Self {
            shared: Some(client),
        }
    }
}

impl TransportFactory for ReqwestTransportFactory {
    type Transport = ReqwestTransport;

    fn create(&self) -> Result<ReqwestTransport, PagerDutyError> {
        let client = match &self.shared {
            Some(client) => client.clone(),
            None => Client::builder().build().map_err(|e| {
                PagerDutyError::Connection(format!("failed to build HTTP client: {e}"))
            })?,
        };
        Ok(ReqwestTransport::new(client))
    }
}

/// Owns a transport for the length of one dispatch and guarantees it is
/// closed.
///
/// [`release`](Self::release) closes it and reports the result. A guard
/// dropped without being released (early return, panic, cancelled future)
/// closes the transport in `Drop` and logs a close failure.
pub struct ScopedTransport<T: Transport> {
    inner: T,
    released: bool,
}

impl<T: Transport> ScopedTransport<T> {
    /// Acquire a fresh transport from the factory.
    pub fn acquire<F>(factory: &F) -> Result<Self, PagerDutyError>
    where
        F: TransportFactory<Transport = T>,
    {
        Ok(Self::new(factory.create()?))
    }

    pub fn new(inner: T) -> Self {
        Self {
            inner,
            released: false,
        }
    }

    pub fn get(&self) -> &T {
        &self.inner
    }

    /// Close the transport and return the close result.
    pub fn release(mut self) -> Result<(), PagerDutyError> {
        self.released = true;
        self.inner.close()
    }
}

impl<T: Transport> Drop for ScopedTransport<T> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.inner.close() {
            warn!(error = %e, "failed to close PagerDuty transport");
        }
    }
}
