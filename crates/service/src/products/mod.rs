//! Products module: three-layer architecture (domain, repository, service).
//!
//! Listing, creation, editing and deletion of catalog products live here,
//! independent of the web layer that renders them.

pub mod domain;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::{ProductPolicy, ProductService};
