//! Catalog API access
//!
//! The `ProductFetchPort` trait is the seam between the orchestrator and the
//! network; `HttpProductClient` implements it over reqwest.

pub mod errors;
pub mod http;
pub mod port;
pub mod types;

pub use errors::*;
pub use http::*;
pub use port::*;
pub use types::*;
