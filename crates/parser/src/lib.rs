// Domain-driven module structure for the streaming template parser.

// Core infrastructure
pub mod cache;
pub mod client;

// Domain modules
pub mod conf;
pub mod data;
pub mod stream;
pub mod runtime;
