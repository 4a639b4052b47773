use serde_json::Value;

/// Failure to acquire the Connect Kit library itself.
///
/// Load failures are never cached by the [`SingleFlight`] loader: a later
/// call is allowed to re-attempt the acquisition.
///
/// [`SingleFlight`]: crate::loader::SingleFlight
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// The host environment has no DOM document to inject the kit into,
    /// e.g. server side rendering.
    #[error("the host environment cannot run the Connect Kit (no document available)")]
    UnsupportedHost,
    /// The kit script could not be downloaded or executed.
    #[error("failed to load the Connect Kit script: {0}")]
    Script(String),
    /// The kit script ran but did not install its global entry point.
    #[error("the Connect Kit global was not installed after the script loaded")]
    MissingGlobal,
}

/// An EIP-1193 style error returned from a provider `request` call or
/// carried by a `disconnect` event payload.
#[derive(Debug, Clone, PartialEq, thiserror::Error, serde::Deserialize)]
#[error("provider rpc error {code}: {message}")]
pub struct ProviderRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl ProviderRpcError {
    /// EIP-1193 code emitted when the user rejects a request.
    pub const USER_REJECTED: i64 = 4001;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

/// The kit's capability check rejected the requested chains or methods.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("the Connect Kit rejected the requested configuration: {reason}")]
pub struct UnsupportedConfiguration {
    pub reason: String,
}

/// The kit completed its capability check but could not produce a provider
/// object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("the Connect Kit could not produce a wallet provider: {reason}")]
pub struct ProviderUnavailable {
    pub reason: String,
}

/// A chain identifier that is neither a number nor a `0x` prefixed
/// hexadecimal string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed chain id `{0}`, expected a hexadecimal string or a number")]
pub struct ChainIdError(pub String);

/// Any failure of the connector lifecycle.
///
/// [`Connector::activate`] surfaces these to the caller; eager connection
/// recovers from all of them locally and never re-throws.
///
/// [`Connector::activate`]: crate::Connector::activate
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConnectorError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Unsupported(#[from] UnsupportedConfiguration),
    #[error(transparent)]
    ProviderUnavailable(#[from] ProviderUnavailable),
    /// Eager connection found no session to restore. Soft failure: the
    /// activation marker is rolled back and nothing is surfaced.
    #[error("no active session to restore")]
    NoActiveSession,
    #[error(transparent)]
    Request(#[from] ProviderRpcError),
    #[error(transparent)]
    ChainId(#[from] ChainIdError),
    /// The provider answered a request with a payload of an unexpected
    /// shape.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}
