//! Jimeng host nodes
//!
//! Node-graph operations for Seedance video generation: an API client node,
//! image-to-video and first/last-frame-to-video generation nodes, and a
//! preview node that saves the result into the host's output directory.
//!
//! The host builds a [`NodeRegistry`] once at startup and invokes nodes by
//! name:
//!
//! ```no_run
//! use jimeng_nodes::{Config, NodeInputs, standard_registry};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     config.validate()?;
//!
//!     let registry = standard_registry(&config);
//!     let output = registry
//!         .invoke("JimengAPIClient", NodeInputs::new().with("api_key", "my-api-key"))
//!         .await?;
//!     assert_eq!(output.values.len(), 1);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod folder_paths;
pub mod image;
pub mod materialize;
pub mod nodes;
pub mod registry;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{NodeError, Result};
pub use crate::image::{ImageTensor, Mask, encode_image, image_to_data_url};
pub use materialize::{Materialized, Materializer};
pub use nodes::standard_registry;
pub use registry::{Node, NodeDescriptor, NodeInputs, NodeOutput, NodeRegistry, Value};
