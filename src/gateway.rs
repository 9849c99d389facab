//! Request pipeline: inspect → route → audit

use crate::audit::{AuditRecord, ComplianceLog};
use crate::error::{GatewayError, Result};
use crate::privacy::ContentInspector;
use crate::routing::RoutingEngine;
use crate::types::{GatewayRequest, GatewayResponse};
use std::sync::Arc;
use tracing::Instrument;

/// The gateway core, shared by the HTTP surface and the CLI
pub struct Gateway {
    inspector: ContentInspector,
    engine: RoutingEngine,
    audit: Arc<ComplianceLog>,
    max_request_size: usize,
}

impl Gateway {
    pub fn new(
        inspector: ContentInspector,
        engine: RoutingEngine,
        audit: Arc<ComplianceLog>,
        max_request_size: usize,
    ) -> Self {
        Self {
            inspector,
            engine,
            audit,
            max_request_size,
        }
    }

    pub fn inspector(&self) -> &ContentInspector {
        &self.inspector
    }

    pub fn engine(&self) -> &RoutingEngine {
        &self.engine
    }

    pub fn audit(&self) -> &Arc<ComplianceLog> {
        &self.audit
    }

    pub fn max_request_size(&self) -> usize {
        self.max_request_size
    }

    /// Process one request end to end.
    ///
    /// Rejected requests (blank or oversized prompts) are not audited. Every
    /// request that reaches a backend is audited exactly once, including ones
    /// whose backend call failed.
    pub async fn process(
        &self,
        request: GatewayRequest,
        source_address: Option<String>,
    ) -> Result<GatewayResponse> {
        let span = tracing::info_span!(
            "gateway.request",
            request_id = %uuid::Uuid::new_v4(),
            route = tracing::field::Empty,
        );
        self.process_inner(request, source_address)
            .instrument(span)
            .await
    }

    async fn process_inner(
        &self,
        request: GatewayRequest,
        source_address: Option<String>,
    ) -> Result<GatewayResponse> {
        let prompt = request.prompt.as_str();
        if prompt.trim().is_empty() {
            return Err(GatewayError::InvalidArgument(
                "Prompt cannot be empty".to_string(),
            ));
        }
        if prompt.len() > self.max_request_size {
            return Err(GatewayError::RequestTooLarge {
                size: prompt.len(),
                limit: self.max_request_size,
            });
        }

        tracing::info!(
            source = source_address.as_deref().unwrap_or("unknown"),
            prompt_len = prompt.chars().count(),
            "Processing request"
        );

        let inspection = self.inspector.inspect(prompt);
        let detected_kinds = inspection.kinds();
        let (detections, score) = inspection.into_parts();

        let routed = self.engine.decide(prompt, &detections, score).await?;
        tracing::Span::current().record("route", routed.route.as_str());
        tracing::info!(
            route = %routed.route,
            model = %routed.model_identifier,
            processing_ms = routed.processing_time_ms,
            "Request processed"
        );

        let record = AuditRecord::new(
            routed.route,
            score,
            detected_kinds,
            routed.model_identifier.clone(),
            prompt.chars().count(),
            routed.response_text.chars().count(),
            routed.processing_time_ms,
        )
        .with_caller(request.caller_id.clone())
        .with_session(request.session_id.clone())
        .with_source_address(source_address);
        self.audit.append(&record).await;

        Ok(GatewayResponse {
            response: routed.response_text,
            route: routed.route,
            score,
            detections,
            model_identifier: routed.model_identifier,
            processing_time_ms: routed.processing_time_ms,
            timestamp: record.timestamp,
        })
    }
}
