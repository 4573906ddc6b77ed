//! Backend API access
//!
//! The trait/remote split mirrors the rest of the crate's seams: everything
//! above this module depends on [`ArchlensApi`], never on reqwest directly.

pub mod client;
pub mod error;

pub use client::{ArchlensApi, RemoteClient};
pub use error::{ApiError, ApiResult};
