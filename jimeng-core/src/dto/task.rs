//! Task DTOs

use serde::{Deserialize, Serialize};

use crate::domain::generation::{FrameRole, GenerationRequest};

/// Request body for creating a generation task
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateTask {
    pub model: String,
    pub content: Vec<ContentPart>,
}

/// One element of a task's multimodal content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text {
        text: String,
    },
    ImageUrl {
        image_url: ImageUrl,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        role: Option<FrameRole>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageUrl {
    pub url: String,
}

impl From<&GenerationRequest> for CreateTask {
    fn from(req: &GenerationRequest) -> Self {
        let mut content = vec![ContentPart::Text {
            text: req.instruction_text(),
        }];
        content.extend(req.images().parts().into_iter().map(|(url, role)| {
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: url.to_string(),
                },
                role,
            }
        }));

        Self {
            model: req.model().to_string(),
            content,
        }
    }
}

/// Response to a task creation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskCreated {
    pub id: String,
}
