//! Sovereign/cloud routing
//!
//! The engine picks a route from the inspection outcome and calls one of two
//! [`InferenceBackend`]s: an OpenAI-compatible cloud client or an
//! Ollama-compatible local client.

pub mod backend;
pub mod cloud;
pub mod engine;
pub mod sovereign;

pub use backend::{is_error_response, BackendError, InferenceBackend, ERROR_MARKER};
pub use cloud::CloudClient;
pub use engine::{select_route, RoutedResponse, RoutingEngine};
pub use sovereign::SovereignClient;
