use std::sync::Arc;

use async_trait::async_trait;
use jimeng_client::ArkClient;
use tracing::info;

use super::CATEGORY;
use crate::error::{NodeError, Result};
use crate::registry::{
    InputField, InputKind, Node, NodeDescriptor, NodeInputs, NodeOutput, OutputField, OutputKind,
    Value,
};

/// Builds an authenticated client handle from an API key
pub struct ApiClientNode {
    base_url: String,
    fallback_key: Option<String>,
}

impl ApiClientNode {
    /// `fallback_key` is used when the host passes an empty key
    pub fn new(base_url: impl Into<String>, fallback_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            fallback_key,
        }
    }
}

#[async_trait]
impl Node for ApiClientNode {
    fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            name: "JimengAPIClient",
            display_name: "JimengAPIClient",
            category: CATEGORY,
            inputs: vec![InputField::new("api_key", InputKind::text(""))],
            outputs: vec![OutputField::new("client", OutputKind::Client)],
            output_node: true,
        }
    }

    async fn execute(&self, inputs: NodeInputs) -> Result<NodeOutput> {
        let given = inputs.string("api_key")?.trim();
        let api_key = match (given, &self.fallback_key) {
            ("", Some(fallback)) => fallback.as_str(),
            ("", None) => {
                return Err(NodeError::invalid_input(
                    "api_key",
                    "an API key is required (input or ARK_API_KEY)",
                ));
            }
            (key, _) => key,
        };

        info!("Created generation client for {}", self.base_url);
        let client = ArkClient::with_base_url(&self.base_url, api_key);
        Ok(NodeOutput::values(vec![Value::Client(Arc::new(client))]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::NodeRegistry;

    fn registry(fallback: Option<&str>) -> NodeRegistry {
        let mut registry = NodeRegistry::new();
        registry.register(ApiClientNode::new(
            "http://localhost:9/api/v3",
            fallback.map(str::to_string),
        ));
        registry
    }

    #[tokio::test]
    async fn test_creates_client_handle() {
        let output = registry(None)
            .invoke("JimengAPIClient", NodeInputs::new().with("api_key", "key-123"))
            .await
            .unwrap();

        assert_eq!(output.values.len(), 1);
        assert!(matches!(output.values[0], Value::Client(_)));
    }

    #[tokio::test]
    async fn test_empty_key_uses_fallback() {
        let output = registry(Some("from-env"))
            .invoke("JimengAPIClient", NodeInputs::new())
            .await
            .unwrap();
        assert!(matches!(output.values[0], Value::Client(_)));
    }

    #[tokio::test]
    async fn test_empty_key_without_fallback_is_rejected() {
        let err = registry(None)
            .invoke("JimengAPIClient", NodeInputs::new().with("api_key", "  "))
            .await
            .unwrap_err();
        assert!(matches!(err, NodeError::InvalidInput { ref input, .. } if input == "api_key"));
    }
}
