// Gateway authentication
pub mod credential;

// Push job identity and endpoint
pub mod push_job;

// Domain-specific error types
pub mod errors;
