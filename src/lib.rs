//! # Image Metadata Pipeline
//!
//! Two activities that an orchestrator runs in order for every uploaded image:
//!
//! - **Extract**: resolve `"<container>/<object path>"`, read the object from
//!   blob storage and decode its header into a [`dto::MetadataRecord`]
//! - **Store**: append that record as one row of the `"ImageMetadata"` table
//!
//! ## Architecture Layers
//!
//! - **Domain**: blob references, size rounding, the metadata entity
//! - **Application**: use cases, ports, the error taxonomy and a local runner
//! - **Infrastructure**: Azure/local blob stores, image decoding, Postgres
//!
//! ## Example Usage
//!
//! ```no_run
//! use image_metadata_pipeline::{application::builder::ApplicationBuilder, Config};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let runner = ApplicationBuilder::new(config).build_runner()?;
//! let outcome = runner.run("images-input/pets.jpeg").await?;
//! println!("{} is {}x{}", outcome.record.file_name, outcome.record.width, outcome.record.height);
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::errors::{Classify, ErrorKind};
pub use application::{dto, ports, use_cases};
pub use config::Config;
pub use domain::errors as domain_errors;
pub use domain::{entities, value_objects};
