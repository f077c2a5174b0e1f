//! Runtime module — run lifecycle: boot (seed) and run (stream).

pub mod boot;
pub mod run;

pub use boot::RunState;
