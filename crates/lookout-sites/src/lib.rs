//! Lookout Sites - Site catalogue and probe units for email account checks.
//!
//! This crate turns declarative site definitions into probe units the engine
//! can run against an email address.
//!
//! # Architecture
//!
//! - **Definition Types** ([`definition`]): Request templates and response rules
//! - **Loader** ([`loader`]): TOML file loading from `site-definitions/`
//! - **Registry** ([`registry`]): In-memory cache of definitions
//! - **Probe** ([`probe`]): The [`ProbeUnit`] trait and the HTTP implementation
//! - **Catalogue** ([`catalogue`]): Where a search gets its units from
//! - **Errors** ([`error`]): Site-specific error types
//!
//! # Example
//!
//! ```rust,no_run
//! use lookout_sites::{ProbeCatalogue, SiteLoader};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = SiteLoader::with_default_dir()?;
//! for unit in loader.load_units()? {
//!     println!("{} ({})", unit.site().name, unit.site().domain);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod catalogue;
pub mod definition;
pub mod error;
pub mod loader;
pub mod probe;
pub mod registry;

// Re-export commonly used types
pub use catalogue::{ProbeCatalogue, StaticCatalogue};
pub use definition::{
    ExtractRules, HttpMethod, RequestTemplate, ResponseRules, SiteDefinition, SiteMetadata,
    Verdict,
};
pub use error::{Result, SiteError};
pub use loader::SiteLoader;
pub use probe::{render, HttpProbe, ProbeUnit};
pub use registry::SiteRegistry;
