//! # sovereign-gateway
//!
//! Jurisdiction-aware inference gateway: inspects prompts for sensitive
//! personal information, routes them to a local ("sovereign") or remote
//! ("cloud") model, and keeps an append-only compliance record of every
//! routing decision.
//!
//! ## Quick Start
//!
//! ```rust
//! use sovereign_gateway::privacy::{ContentInspector, PiiKind};
//!
//! # fn example() -> sovereign_gateway::Result<()> {
//! let inspector = ContentInspector::australian()?;
//! let result = inspector.inspect("My Medicare number is 1234 567 890");
//!
//! assert!(result.kinds().contains(&PiiKind::Medicare));
//! assert!(result.score() >= 0.3);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **PatternCatalog**: ordered table of identifier detectors
//! - **ContentInspector**: detections plus one sensitivity score in `[0, 1]`
//! - **RoutingEngine**: binding cloud/sovereign choice and the backend call
//! - **ComplianceLog**: JSONL audit records, replayed newest first
//! - **Gateway**: the inspect → route → audit pipeline

pub mod api;
pub mod audit;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod gateway;
pub mod privacy;
pub mod routing;
pub mod types;

// Re-export core types
pub use audit::{AuditRecord, AuditSummary, ComplianceLog};
pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use gateway::Gateway;
pub use privacy::{ContentInspector, Detection, InspectionResult, PatternCatalog, PiiKind};
pub use routing::{InferenceBackend, RoutedResponse, RoutingEngine};
pub use types::{GatewayRequest, GatewayResponse, Route};
