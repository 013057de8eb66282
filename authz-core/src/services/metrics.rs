use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

use crate::models::RevocationReason;
use crate::services::checker::AccessDecision;

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

// Metrics
pub static AUTHZ_DECISIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static SESSIONS_REVOKED_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static INVALIDATION_FAILURES_TOTAL: OnceLock<IntCounter> = OnceLock::new();

pub fn init_metrics() {
    let registry = Registry::new();

    let decisions_total = match IntCounterVec::new(
        Opts::new("authz_decisions_total", "Authorization decisions"),
        &["outcome", "scope"],
    ) {
        Ok(metric) => metric,
        Err(e) => {
            tracing::error!("Failed to create authz_decisions_total metric: {}", e);
            panic!("Failed to initialize metrics: {}", e);
        }
    };

    let revoked_total = match IntCounterVec::new(
        Opts::new("sessions_revoked_total", "Sessions revoked by reason"),
        &["reason"],
    ) {
        Ok(metric) => metric,
        Err(e) => {
            tracing::error!("Failed to create sessions_revoked_total metric: {}", e);
            panic!("Failed to initialize metrics: {}", e);
        }
    };

    let failures_total = match IntCounter::new(
        "invalidation_failures_total",
        "Per-user revocation failures inside role-change fan-outs",
    ) {
        Ok(metric) => metric,
        Err(e) => {
            tracing::error!("Failed to create invalidation_failures_total metric: {}", e);
            panic!("Failed to initialize metrics: {}", e);
        }
    };

    if let Err(e) = registry.register(Box::new(decisions_total.clone())) {
        tracing::error!("Failed to register authz_decisions_total collector: {}", e);
        panic!("Failed to initialize metrics: {}", e);
    }
    if let Err(e) = registry.register(Box::new(revoked_total.clone())) {
        tracing::error!("Failed to register sessions_revoked_total collector: {}", e);
        panic!("Failed to initialize metrics: {}", e);
    }
    if let Err(e) = registry.register(Box::new(failures_total.clone())) {
        tracing::error!(
            "Failed to register invalidation_failures_total collector: {}",
            e
        );
        panic!("Failed to initialize metrics: {}", e);
    }

    // Initialize globals
    let _ = REGISTRY.set(registry);
    let _ = AUTHZ_DECISIONS_TOTAL.set(decisions_total);
    let _ = SESSIONS_REVOKED_TOTAL.set(revoked_total);
    let _ = INVALIDATION_FAILURES_TOTAL.set(failures_total);
}

/// Count one authorization decision. No-op until `init_metrics` runs.
pub fn record_decision(decision: &AccessDecision) {
    if let Some(counter) = AUTHZ_DECISIONS_TOTAL.get() {
        let outcome = if decision.allowed { "granted" } else { "denied" };
        let scope = decision
            .scope_evaluated()
            .map(|s| s.as_str())
            .unwrap_or("none");
        counter.with_label_values(&[outcome, scope]).inc();
    }
}

/// Count sessions revoked under a reason. No-op until `init_metrics` runs.
pub fn record_revocations(reason: RevocationReason, count: usize) {
    if let Some(counter) = SESSIONS_REVOKED_TOTAL.get() {
        counter
            .with_label_values(&[reason.as_str()])
            .inc_by(count as u64);
    }
}

/// Count one per-user revocation failure. No-op until `init_metrics` runs.
pub fn record_invalidation_failure() {
    if let Some(counter) = INVALIDATION_FAILURES_TOTAL.get() {
        counter.inc();
    }
}

/// Render the registry in Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let registry = match REGISTRY.get() {
        Some(r) => r,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    let metric_families = registry.gather();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to convert metrics to UTF-8: {}", e);
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::checker::DecisionReason;

    #[test]
    fn decisions_land_in_the_registry() {
        init_metrics();

        let decision = AccessDecision {
            allowed: false,
            permission: "analytics:read:organization".parse().unwrap(),
            reason: DecisionReason::MissingOrganizationContext,
        };
        record_decision(&decision);
        record_revocations(RevocationReason::Security, 2);
        record_invalidation_failure();

        let rendered = gather_metrics();
        assert!(rendered.contains("authz_decisions_total"));
        assert!(rendered.contains("sessions_revoked_total"));
        assert!(rendered.contains("invalidation_failures_total"));
    }
}
