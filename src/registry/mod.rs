//! Contract registry subsystem.
//!
//! # Data Flow
//! ```text
//! deployment manifest (JSON) + [registry.positions] (TOML)
//!     → manifest.rs (parse, merge, reject conflicts)
//!     → ContractRegistry (immutable, shared via Arc)
//!     → verify.rs (optional startup check against the chain)
//! ```

pub mod contracts;
pub mod manifest;
pub mod verify;

pub use contracts::{ContractRegistry, RegistryError};
pub use manifest::{build_registry, load_registry, parse_manifest};
pub use verify::verify_deployments;
