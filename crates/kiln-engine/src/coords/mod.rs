//! Integer coordinate types shared between the runtime, resources and tasks.
//!
//! Canonical space:
//! - Physical pixels
//! - Origin top-left
//! - +X right, +Y down

mod uvec2;

pub use uvec2::UVec2;
