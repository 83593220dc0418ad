//! Adapters implementing domain ports.
//!
//! This module contains infrastructure implementations of the traits defined
//! in the ports module. Following hexagonal architecture, adapters depend on
//! domain ports, not the other way around.

pub mod catalog;
pub mod declarative;
pub mod json_source;
pub mod static_source;

pub use catalog::TypeCatalog;
pub use declarative::{AdviceDecl, AdvisorDecl, HandlerCatalog, PointcutDecl};
pub use json_source::JsonAdvisorSource;
pub use static_source::StaticAdvisorSource;
