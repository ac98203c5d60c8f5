//! Host nodes
//!
//! The operations exposed to the node-graph host:
//! - `JimengAPIClient`: builds an authenticated client handle
//! - `JimengImage2Video`: single image to video
//! - `JimengFirstLastFrame2Video`: first/last frame pair to video
//! - `PreviewVideoFromUrl`: saves a generated video into the output directory

mod api_client;
mod first_last_frame;
mod image_to_video;
mod preview_video;

pub use api_client::ApiClientNode;
pub use first_last_frame::FirstLastFrameToVideoNode;
pub use image_to_video::ImageToVideoNode;
pub use preview_video::PreviewVideoNode;

use jimeng_client::{GenerationClient, PollPolicy, wait_for_task};
use jimeng_core::domain::generation::{ClipDuration, GenerationRequest};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{NodeError, Result};
use crate::registry::{InputField, InputKind, NodeOutput, NodeRegistry, OutputField, OutputKind, Value};

/// Category of the generation nodes
pub const CATEGORY: &str = "JimengAI";

/// Registry with every node, configured from `config`
pub fn standard_registry(config: &Config) -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    registry.register(ApiClientNode::new(
        config.api_base_url.clone(),
        config.api_key.clone(),
    ));
    registry.register(ImageToVideoNode::new(config.poll_policy()));
    registry.register(FirstLastFrameToVideoNode::new(config.poll_policy()));
    registry.register(PreviewVideoNode::new(config.output_dir.clone()));
    registry
}

// Inputs shared by both generation nodes, after the images.
fn generation_inputs(
    models: &'static [&'static str],
    resolutions: &'static [&'static str],
) -> Vec<InputField> {
    vec![
        InputField::new(
            "model",
            InputKind::Choice {
                options: models,
                default: models[0],
            },
        ),
        InputField::new(
            "prompt",
            InputKind::String {
                multiline: true,
                default: Some(""),
                force_input: false,
            },
        ),
        InputField::new(
            "duration",
            InputKind::Choice {
                options: ClipDuration::ALL,
                default: "5",
            },
        ),
        InputField::new(
            "resolution",
            InputKind::Choice {
                options: resolutions,
                default: "720p",
            },
        ),
        InputField::new("camerafixed", InputKind::Boolean { default: true }),
    ]
}

fn generation_outputs() -> Vec<OutputField> {
    vec![
        OutputField::new("url", OutputKind::String),
        OutputField::new("task_id", OutputKind::String),
    ]
}

/// Submits `request`, waits for the task and returns `(url, task_id)`
///
/// A timed-out task yields an empty url rather than an error.
async fn run_generation(
    client: &dyn GenerationClient,
    request: &GenerationRequest,
    policy: &PollPolicy,
) -> Result<NodeOutput> {
    let task_id = client.submit(request).await.map_err(NodeError::Submission)?;
    info!("Submitted task {}, polling for result", task_id);

    let outcome = wait_for_task(client, &task_id, policy)
        .await
        .map_err(NodeError::Task)?;
    if outcome.is_timed_out() {
        warn!("Task {} timed out, returning empty url", outcome.task_id());
    }

    let (url, task_id) = outcome.into_parts();
    Ok(NodeOutput::values(vec![Value::String(url), Value::String(task_id)]))
}
