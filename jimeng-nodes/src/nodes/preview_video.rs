use std::path::PathBuf;

use async_trait::async_trait;
use jimeng_core::domain::artifact::VideoContainer;
use serde_json::json;

use crate::error::Result;
use crate::materialize::{Materialized, Materializer};
use crate::registry::{InputField, InputKind, Node, NodeDescriptor, NodeInputs, NodeOutput};

/// Saves a generated video into the output directory and shows it in the host
pub struct PreviewVideoNode {
    materializer: Materializer,
}

impl PreviewVideoNode {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_materializer(Materializer::new(output_dir))
    }

    pub fn with_materializer(materializer: Materializer) -> Self {
        Self { materializer }
    }
}

#[async_trait]
impl Node for PreviewVideoNode {
    fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            name: "PreviewVideoFromUrl",
            display_name: "PreviewVideoFromUrl",
            category: "image/video",
            inputs: vec![
                InputField::new(
                    "video_url",
                    InputKind::String {
                        multiline: false,
                        default: None,
                        force_input: true,
                    },
                ),
                InputField::new("filename_prefix", InputKind::text("tmp_preview")),
                InputField::new("save_output", InputKind::Boolean { default: true }),
                InputField::new(
                    "format",
                    InputKind::Choice {
                        options: VideoContainer::CHOICES,
                        default: "mp4",
                    },
                ),
            ],
            outputs: Vec::new(),
            output_node: true,
        }
    }

    async fn execute(&self, inputs: NodeInputs) -> Result<NodeOutput> {
        let materialized = self
            .materializer
            .materialize(
                inputs.string("video_url")?,
                inputs.string("filename_prefix")?,
                inputs.parse("format")?,
                inputs.boolean("save_output")?,
            )
            .await?;

        let ui = match materialized {
            Materialized::Saved(saved) => json!({
                "images": [{
                    "filename": saved.artifact.file_name(),
                    "subfolder": saved.subfolder,
                    "type": "output",
                }],
                "animated": [true],
            }),
            Materialized::Skipped { reference } => json!({ "video_url": [reference] }),
        };
        Ok(NodeOutput::ui(ui))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NodeError;
    use crate::materialize::MaterializeError;
    use crate::registry::NodeRegistry;
    use tempfile::TempDir;

    fn registry(output: &TempDir) -> NodeRegistry {
        let mut registry = NodeRegistry::new();
        registry.register(PreviewVideoNode::new(output.path()));
        registry
    }

    #[tokio::test]
    async fn test_saves_local_video_with_defaults() {
        let output = TempDir::new().unwrap();
        let source = TempDir::new().unwrap();
        let video = source.path().join("clip.mp4");
        std::fs::write(&video, b"video bytes").unwrap();

        let inputs = NodeInputs::new().with("video_url", video.to_str().unwrap());
        let result = registry(&output)
            .invoke("PreviewVideoFromUrl", inputs)
            .await
            .unwrap();

        assert!(result.values.is_empty());
        assert_eq!(
            result.ui,
            Some(json!({
                "images": [{
                    "filename": "tmp_preview_00001_.mp4",
                    "subfolder": "",
                    "type": "output",
                }],
                "animated": [true],
            }))
        );
        let saved = std::fs::read(output.path().join("tmp_preview_00001_.mp4")).unwrap();
        assert_eq!(saved, b"video bytes");
    }

    #[tokio::test]
    async fn test_skipped_save_echoes_reference() {
        let output = TempDir::new().unwrap();
        let inputs = NodeInputs::new()
            .with("video_url", "https://cdn.example.com/out.mp4")
            .with("save_output", false);

        let result = registry(&output)
            .invoke("PreviewVideoFromUrl", inputs)
            .await
            .unwrap();

        assert_eq!(
            result.ui,
            Some(json!({ "video_url": ["https://cdn.example.com/out.mp4"] }))
        );
        assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_local_video() {
        let output = TempDir::new().unwrap();
        let inputs = NodeInputs::new().with("video_url", "/nonexistent/clip.mp4");

        let err = registry(&output)
            .invoke("PreviewVideoFromUrl", inputs)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            NodeError::Materialize(MaterializeError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_video_url_must_be_wired() {
        let output = TempDir::new().unwrap();
        let err = registry(&output)
            .invoke("PreviewVideoFromUrl", NodeInputs::new())
            .await
            .unwrap_err();

        assert!(matches!(err, NodeError::MissingInput { ref input, .. } if input == "video_url"));
    }
}
