use async_trait::async_trait;
use jimeng_client::PollPolicy;
use jimeng_core::domain::generation::{
    FIRST_LAST_FRAME_MODELS, FrameImages, GenerationRequest, Resolution,
};

use super::{CATEGORY, generation_inputs, generation_outputs, run_generation};
use crate::error::Result;
use crate::image::encode_image;
use crate::registry::{InputField, InputKind, Node, NodeDescriptor, NodeInputs, NodeOutput};

/// Generates a video that starts and ends on the given frames
pub struct FirstLastFrameToVideoNode {
    policy: PollPolicy,
}

impl FirstLastFrameToVideoNode {
    pub fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl Node for FirstLastFrameToVideoNode {
    fn descriptor(&self) -> NodeDescriptor {
        let mut inputs = vec![
            InputField::new("client", InputKind::Client),
            InputField::new("first_frame_image", InputKind::Image),
            InputField::new("last_frame_image", InputKind::Image),
        ];
        inputs.extend(generation_inputs(
            FIRST_LAST_FRAME_MODELS,
            Resolution::FIRST_LAST_FRAME,
        ));

        NodeDescriptor {
            name: "JimengFirstLastFrame2Video",
            display_name: "JimengFirstLastFrame2Video",
            category: CATEGORY,
            inputs,
            outputs: generation_outputs(),
            output_node: true,
        }
    }

    async fn execute(&self, inputs: NodeInputs) -> Result<NodeOutput> {
        let client = inputs.client("client")?;
        let first = encode_image(&*inputs.image("first_frame_image")?, None)?;
        let last = encode_image(&*inputs.image("last_frame_image")?, None)?;

        let request = GenerationRequest::new(
            inputs.string("model")?,
            inputs.string("prompt")?,
            inputs.parse("duration")?,
            inputs.parse("resolution")?,
            inputs.boolean("camerafixed")?,
            FrameImages::FirstLast {
                first: first.to_data_url(),
                last: last.to_data_url(),
            },
        );

        run_generation(client.as_ref(), &request, &self.policy).await
    }
}
