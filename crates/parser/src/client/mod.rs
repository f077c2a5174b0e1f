//! Client module — the external fallback-model boundary.
//!
//! Every miss path talks to the model through the [`ModelOps`] trait.
//! `live.rs` provides the real HTTP-backed implementation.
//! `fake.rs` provides a deterministic test double.

pub mod model;
pub mod error;
pub mod live;
pub mod fake;

pub use model::{ModelOps, ModelReply};
pub use error::ModelError;
pub use live::LiveModel;
pub use fake::FakeModel;
