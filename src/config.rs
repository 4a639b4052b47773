//! Connector configuration and the capability request derived from it.

use std::collections::BTreeMap;

/// Options forwarded to the Connect Kit when negotiating support.
///
/// Only the project id and the required chain list are mandatory; everything
/// else defaults to what the kit itself supports. The RPC endpoint map falls
/// back to [`default_rpc_map`] when unspecified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorOptions {
    pub project_id: String,
    pub chains: Vec<u64>,
    pub optional_chains: Vec<u64>,
    pub methods: Option<Vec<String>>,
    pub optional_methods: Option<Vec<String>>,
    pub events: Option<Vec<String>>,
    pub optional_events: Option<Vec<String>>,
    pub rpc_map: Option<BTreeMap<u64, String>>,
}

impl ConnectorOptions {
    pub fn new(project_id: impl Into<String>, chains: impl IntoIterator<Item = u64>) -> Self {
        Self {
            project_id: project_id.into(),
            chains: chains.into_iter().collect(),
            optional_chains: Vec::new(),
            methods: None,
            optional_methods: None,
            events: None,
            optional_events: None,
            rpc_map: None,
        }
    }

    pub fn with_optional_chains(mut self, chains: impl IntoIterator<Item = u64>) -> Self {
        self.optional_chains = chains.into_iter().collect();
        self
    }

    pub fn with_methods(mut self, methods: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.methods = Some(methods.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_optional_methods(
        mut self,
        methods: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.optional_methods = Some(methods.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_events(mut self, events: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.events = Some(events.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_optional_events(
        mut self,
        events: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.optional_events = Some(events.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_rpc_map(mut self, rpc_map: BTreeMap<u64, String>) -> Self {
        self.rpc_map = Some(rpc_map);
        self
    }

    /// Build the capability request submitted to the kit's support check.
    pub(crate) fn support_request(&self) -> SupportRequest {
        SupportRequest {
            provider_type: "Ethereum",
            wallet_connect_version: 2,
            project_id: self.project_id.clone(),
            chains: self.chains.clone(),
            optional_chains: self.optional_chains.clone(),
            methods: self.methods.clone(),
            optional_methods: self.optional_methods.clone(),
            events: self.events.clone(),
            optional_events: self.optional_events.clone(),
            rpc_map: self.rpc_map.clone().unwrap_or_else(default_rpc_map),
        }
    }
}

/// Public JSON-RPC endpoints used when no [`ConnectorOptions::rpc_map`] is
/// configured.
pub fn default_rpc_map() -> BTreeMap<u64, String> {
    BTreeMap::from([
        (1, "https://cloudflare-eth.com/".to_owned()), // Mainnet
        (5, "https://goerli.optimism.io/".to_owned()), // Goerli
        (137, "https://polygon-rpc.com/".to_owned()), // Polygon
    ])
}

/// The capability request in the wire shape the Connect Kit expects.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportRequest {
    pub provider_type: &'static str,
    pub wallet_connect_version: u32,
    pub project_id: String,
    pub chains: Vec<u64>,
    pub optional_chains: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional_methods: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional_events: Option<Vec<String>>,
    pub rpc_map: BTreeMap<u64, String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn support_request_defaults_the_rpc_map() {
        let options = ConnectorOptions::new("project", [1, 137]);
        let request = options.support_request();

        assert_eq!(request.rpc_map, default_rpc_map());
        assert_eq!(request.chains, vec![1, 137]);
    }

    #[test]
    fn support_request_keeps_a_configured_rpc_map() {
        let rpc_map = BTreeMap::from([(10, "https://mainnet.optimism.io/".to_owned())]);
        let options = ConnectorOptions::new("project", [10]).with_rpc_map(rpc_map.clone());

        assert_eq!(options.support_request().rpc_map, rpc_map);
    }

    #[test]
    fn support_request_json() {
        let request = ConnectorOptions::new("project", [1])
            .with_methods(["eth_sendTransaction"])
            .support_request();

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json! {{
                "providerType": "Ethereum",
                "walletConnectVersion": 2,
                "projectId": "project",
                "chains": [1],
                "optionalChains": [],
                "methods": ["eth_sendTransaction"],
                "rpcMap": {
                    "1": "https://cloudflare-eth.com/",
                    "5": "https://goerli.optimism.io/",
                    "137": "https://polygon-rpc.com/",
                },
            }}
        );
    }
}
