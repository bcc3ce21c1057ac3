//! Per-item dispatch to downstream domain services
//!
//! - `payload`: closed tagged union of per-domain payload shapes
//! - `registry`: item type -> role/URL capability mapping
//! - `client`: reqwest transport with identity headers and timeout

pub mod client;
pub mod payload;
pub mod registry;

pub use client::{DispatchClient, DispatchError, DispatchOutcome};
pub use payload::{ClinicalContext, ItemPayload, PayloadShapeError};
pub use registry::{CapabilityRegistry, DomainCapability};
