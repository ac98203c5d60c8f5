use async_trait::async_trait;
use jimeng_client::PollPolicy;
use jimeng_core::domain::generation::{
    FrameImages, GenerationRequest, IMAGE_TO_VIDEO_MODELS, Resolution,
};

use super::{CATEGORY, generation_inputs, generation_outputs, run_generation};
use crate::error::Result;
use crate::image::encode_image;
use crate::registry::{InputField, InputKind, Node, NodeDescriptor, NodeInputs, NodeOutput};

/// Generates a video from a single reference image
pub struct ImageToVideoNode {
    policy: PollPolicy,
}

impl ImageToVideoNode {
    pub fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl Node for ImageToVideoNode {
    fn descriptor(&self) -> NodeDescriptor {
        let mut inputs = vec![
            InputField::new("client", InputKind::Client),
            InputField::new("image", InputKind::Image),
        ];
        inputs.extend(generation_inputs(IMAGE_TO_VIDEO_MODELS, Resolution::ALL));

        NodeDescriptor {
            name: "JimengImage2Video",
            display_name: "JimengImage2Video",
            category: CATEGORY,
            inputs,
            outputs: generation_outputs(),
            output_node: true,
        }
    }

    async fn execute(&self, inputs: NodeInputs) -> Result<NodeOutput> {
        let client = inputs.client("client")?;
        let image = encode_image(&*inputs.image("image")?, None)?;

        let request = GenerationRequest::new(
            inputs.string("model")?,
            inputs.string("prompt")?,
            inputs.parse("duration")?,
            inputs.parse("resolution")?,
            inputs.boolean("camerafixed")?,
            FrameImages::Single(image.to_data_url()),
        );

        run_generation(client.as_ref(), &request, &self.policy).await
    }
}
