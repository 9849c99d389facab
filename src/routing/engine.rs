//! Routing decision engine
//!
//! Turns an inspection outcome into a binding route and drives the selected
//! backend. There is no retry and no fallback between backends: a failed
//! call comes back as an inline `[ERROR] ...` response on the chosen route.

use super::backend::InferenceBackend;
use super::cloud::CloudClient;
use super::sovereign::SovereignClient;
use crate::config::RoutingConfig;
use crate::error::{GatewayError, Result};
use crate::privacy::Detection;
use crate::types::Route;
use std::sync::Arc;
use std::time::Instant;

/// Outcome of one routed backend call
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedResponse {
    /// Backend text, or an inline error message
    pub response_text: String,
    pub route: Route,
    /// Wall-clock time of the backend call
    pub processing_time_ms: f64,
    pub model_identifier: String,
}

/// Pick a route. Any detection forces sovereign regardless of score.
pub fn select_route(score: f64, detection_count: usize, threshold: f64) -> Route {
    if score >= threshold || detection_count > 0 {
        Route::Sovereign
    } else {
        Route::Cloud
    }
}

fn check_threshold(threshold: f64) -> Result<()> {
    if threshold.is_finite() && (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(GatewayError::Config(format!(
            "Routing threshold must be between 0.0 and 1.0, got {}",
            threshold
        )))
    }
}

/// Selects a backend per request and calls it
pub struct RoutingEngine {
    threshold: f64,
    cloud: Arc<dyn InferenceBackend>,
    sovereign: Arc<dyn InferenceBackend>,
}

impl RoutingEngine {
    pub fn new(
        threshold: f64,
        cloud: Arc<dyn InferenceBackend>,
        sovereign: Arc<dyn InferenceBackend>,
    ) -> Result<Self> {
        check_threshold(threshold)?;
        tracing::info!(
            threshold,
            cloud_model = cloud.model(),
            sovereign_model = sovereign.model(),
            "Routing engine initialized"
        );
        Ok(Self {
            threshold,
            cloud,
            sovereign,
        })
    }

    /// Build the engine with HTTP clients for both backends
    pub fn from_config(config: &RoutingConfig) -> Result<Self> {
        Self::new(
            config.threshold,
            Arc::new(CloudClient::from_config(&config.cloud)),
            Arc::new(SovereignClient::from_config(&config.sovereign)),
        )
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    fn backend(&self, route: Route) -> &Arc<dyn InferenceBackend> {
        match route {
            Route::Cloud => &self.cloud,
            Route::Sovereign => &self.sovereign,
        }
    }

    /// Model identifier reported for a route. Local models are annotated.
    pub fn model_identifier(&self, route: Route) -> String {
        match route {
            Route::Cloud => self.cloud.model().to_string(),
            Route::Sovereign => format!("{} (local)", self.sovereign.model()),
        }
    }

    /// Route a prompt and call the selected backend.
    ///
    /// Fails only on malformed arguments; backend failures are returned as
    /// the response text.
    pub async fn decide(
        &self,
        prompt: &str,
        detections: &[Detection],
        score: f64,
    ) -> Result<RoutedResponse> {
        if prompt.is_empty() {
            return Err(GatewayError::InvalidArgument(
                "Prompt must be a non-empty string".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&score) {
            return Err(GatewayError::InvalidArgument(format!(
                "Score must be between 0.0 and 1.0, got {}",
                score
            )));
        }

        let route = select_route(score, detections.len(), self.threshold);
        let backend = self.backend(route);
        tracing::info!(
            route = %route,
            score,
            detections = detections.len(),
            threshold = self.threshold,
            backend = backend.name(),
            "Routing decision"
        );

        let started = Instant::now();
        let response_text = match backend.generate(prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(route = %route, backend = backend.name(), error = %e, "Backend call failed");
                e.inline_message()
            }
        };
        let processing_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        Ok(RoutedResponse {
            response_text,
            route,
            processing_time_ms,
            model_identifier: self.model_identifier(route),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::privacy::PiiKind;
    use crate::routing::backend::{is_error_response, BackendError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Scripted {
        model: &'static str,
        reply: std::result::Result<&'static str, ()>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn ok(model: &'static str, reply: &'static str) -> Arc<Self> {
            Arc::new(Self {
                model,
                reply: Ok(reply),
                calls: AtomicUsize::new(0),
            })
        }

        fn timing_out(model: &'static str) -> Arc<Self> {
            Arc::new(Self {
                model,
                reply: Err(()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl InferenceBackend for Scripted {
        async fn generate(&self, _prompt: &str) -> std::result::Result<String, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Ok(text) => Ok(text.to_string()),
                Err(()) => Err(BackendError::Timeout {
                    backend: self.model.to_string(),
                    timeout: Duration::from_secs(1),
                }),
            }
        }

        fn model(&self) -> &str {
            self.model
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn engine(threshold: f64) -> (RoutingEngine, Arc<Scripted>, Arc<Scripted>) {
        let cloud = Scripted::ok("gpt-4o", "cloud says hi");
        let sovereign = Scripted::ok("llama3", "local says hi");
        let engine = RoutingEngine::new(threshold, cloud.clone(), sovereign.clone()).unwrap();
        (engine, cloud, sovereign)
    }

    #[test]
    fn test_select_route() {
        assert_eq!(select_route(0.4, 0, 0.5), Route::Cloud);
        assert_eq!(select_route(0.4, 0, 0.3), Route::Sovereign);
        assert_eq!(select_route(0.5, 0, 0.5), Route::Sovereign);
        assert_eq!(select_route(0.0, 1, 1.0), Route::Sovereign);
    }

    #[tokio::test]
    async fn test_below_threshold_goes_to_cloud() {
        let (engine, cloud, sovereign) = engine(0.5);
        let routed = engine.decide("What is 2+2?", &[], 0.4).await.unwrap();
        assert_eq!(routed.route, Route::Cloud);
        assert_eq!(routed.response_text, "cloud says hi");
        assert_eq!(routed.model_identifier, "gpt-4o");
        assert_eq!(cloud.calls.load(Ordering::SeqCst), 1);
        assert_eq!(sovereign.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_at_or_above_threshold_goes_sovereign() {
        let (engine, _, sovereign) = engine(0.3);
        let routed = engine.decide("What is 2+2?", &[], 0.4).await.unwrap();
        assert_eq!(routed.route, Route::Sovereign);
        assert_eq!(routed.model_identifier, "llama3 (local)");
        assert_eq!(sovereign.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_detections_force_sovereign() {
        let (engine, cloud, _) = engine(1.0);
        let detections = vec![Detection::new(PiiKind::Postcode, "2000", 0.7, (0, 4))];
        let routed = engine.decide("2000", &detections, 0.0).await.unwrap();
        assert_eq!(routed.route, Route::Sovereign);
        assert_eq!(cloud.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let (engine, cloud, sovereign) = engine(0.3);
        for (prompt, score) in [("", 0.1), ("hi", 1.1), ("hi", -0.1), ("hi", f64::NAN)] {
            let err = engine.decide(prompt, &[], score).await.unwrap_err();
            assert!(matches!(err, GatewayError::InvalidArgument(_)));
        }
        assert_eq!(cloud.calls.load(Ordering::SeqCst), 0);
        assert_eq!(sovereign.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_whitespace_prompt_is_routed() {
        let (engine, cloud, _) = engine(0.5);
        let routed = engine.decide("   ", &[], 0.0).await.unwrap();
        assert_eq!(routed.route, Route::Cloud);
        assert_eq!(cloud.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_backend_failure_is_inline_without_fallback() {
        let cloud = Scripted::ok("gpt-4o", "cloud says hi");
        let sovereign = Scripted::timing_out("llama3");
        let engine = RoutingEngine::new(0.3, cloud.clone(), sovereign.clone()).unwrap();

        let routed = engine.decide("hello", &[], 0.9).await.unwrap();
        assert_eq!(routed.route, Route::Sovereign);
        assert!(is_error_response(&routed.response_text));
        assert!(routed.response_text.contains("timeout"));
        assert_eq!(sovereign.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cloud.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let cloud = Scripted::ok("a", "a");
        let sovereign = Scripted::ok("b", "b");
        assert!(RoutingEngine::new(1.2, cloud.clone(), sovereign.clone()).is_err());
        assert!(RoutingEngine::new(f64::NAN, cloud, sovereign).is_err());
    }

    #[test]
    fn test_from_config() {
        let engine = RoutingEngine::from_config(&RoutingConfig::default()).unwrap();
        assert_eq!(engine.threshold(), 0.3);
        assert_eq!(engine.model_identifier(Route::Cloud), "gpt-4o");
        assert_eq!(engine.model_identifier(Route::Sovereign), "llama3 (local)");
    }
}
