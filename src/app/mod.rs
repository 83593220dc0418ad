//! Application layer: the container wiring sources, introspection and the
//! interception core together.
//!
//! This module is the composition root, following hexagonal architecture
//! principles: the container owns the infrastructure dependencies (advisor
//! sources, the introspector), freezes the advisor registry at build time
//! and hands out proxies over it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │           Application Layer (app)           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │       App (composition root)         │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ owns                       │
//! │                 ▼                            │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Infrastructure (adapters)           │   │
//! │  │  - StaticAdvisorSource               │   │
//! │  │  - JsonAdvisorSource                 │   │
//! │  │  - TypeCatalog                       │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ implements                 │
//! │                 ▼                            │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Domain Ports (ports)                │   │
//! │  │  - AdvisorSource trait               │   │
//! │  │  - Introspector trait                │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ used by                    │
//! │                 ▼                            │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Interception core                   │   │
//! │  │  - AdvisorRegistry / ChainBuilder    │   │
//! │  │  - Dispatcher / Proxy                │   │
//! │  └──────────────────────────────────────┘   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use weft::adapters::{StaticAdvisorSource, TypeCatalog};
//! use weft::advice::Advice;
//! use weft::advisor::Advisor;
//! use weft::app::App;
//! use weft::descriptor::{MethodDescriptor, TypeDescriptor};
//! use weft::pointcut::Pointcut;
//!
//! let catalog =
//!     TypeCatalog::new().with_type(TypeDescriptor::new("Ledger").method(MethodDescriptor::new("post")))?;
//!
//! let app = App::builder()
//!     .with_source(StaticAdvisorSource::new(vec![Advisor::new(
//!         "trace_posts",
//!         "tracing",
//!         Pointcut::method_glob("post")?,
//!         Advice::before(|_| Ok(())),
//!     )]))
//!     .with_introspector(catalog)
//!     .build()?;
//!
//! assert_eq!(app.chain_for("Ledger", "post")?.len(), 1);
//! # Ok::<(), weft::Error>(())
//! ```

pub mod config;
pub mod container;

pub use config::ContainerConfig;
pub use container::{App, AppBuilder};
