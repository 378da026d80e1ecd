use rpcsim::jsonrpc::Response;
use rpcsim::types::EndpointRole;
use rpcsim::{Client, RpcClientError};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ComparatorError {
    #[error("no {0} endpoint was provided")]
    MissingEndpoint(EndpointRole),
    #[error("{0} endpoint was provided more than once")]
    DuplicateEndpoint(EndpointRole),
}

/// Both answers to the same request.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponsePair {
    pub legacy: Response,
    pub bedrock: Response,
}

impl ResponsePair {
    pub fn get(&self, role: EndpointRole) -> &Response {
        match role {
            EndpointRole::Legacy => &self.legacy,
            EndpointRole::Bedrock => &self.bedrock,
        }
    }
}

/// Sends identical requests to a legacy and a bedrock endpoint. Judging the
/// responses is left to the caller.
#[derive(Clone, Debug)]
pub struct Comparator {
    legacy: Client,
    bedrock: Client,
}

impl Comparator {
    /// Picks the legacy and bedrock client out of the clients a test was
    /// started with.
    pub fn from_clients(clients: Vec<Client>) -> Result<Self, ComparatorError> {
        let mut legacy = None;
        let mut bedrock = None;
        for client in clients {
            let slot = match client.role {
                EndpointRole::Legacy => &mut legacy,
                EndpointRole::Bedrock => &mut bedrock,
            };
            if slot.is_some() {
                return Err(ComparatorError::DuplicateEndpoint(client.role));
            }
            *slot = Some(client);
        }

        Ok(Self {
            legacy: legacy.ok_or(ComparatorError::MissingEndpoint(EndpointRole::Legacy))?,
            bedrock: bedrock.ok_or(ComparatorError::MissingEndpoint(EndpointRole::Bedrock))?,
        })
    }

    pub fn legacy(&self) -> &Client {
        &self.legacy
    }

    pub fn bedrock(&self) -> &Client {
        &self.bedrock
    }

    /// Issues the request to both endpoints concurrently. Either side failing
    /// at the transport or protocol level fails the comparison.
    pub async fn compare(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<ResponsePair, RpcClientError> {
        let (legacy, bedrock) = tokio::join!(
            self.legacy.rpc.call(method, params.clone()),
            self.bedrock.rpc.call(method, params),
        );

        Ok(ResponsePair {
            legacy: legacy?,
            bedrock: bedrock?,
        })
    }

    pub async fn legacy_only(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Response, RpcClientError> {
        self.legacy.rpc.call(method, params).await
    }
}
