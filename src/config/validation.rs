//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, multipliers >= 1)
//! - Validate URLs and socket addresses before anything binds or connects
//! - Keep the request timeout above the worst-case chain round trip, so it
//!   never cuts a relay off after its transaction was broadcast
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Registry contents are checked by the registry loader, which owns the
//!   manifest format

use std::net::SocketAddr;

use crate::config::schema::{ChainConfig, RelayConfig, PLACEHOLDER_ADMIN_KEY};

/// RPC calls one relay makes outside the confirmation wait: the nonce read,
/// gas price, gas estimate, balance, account nonce, broadcast, and the
/// account nonce resync after a failed broadcast.
pub const RPC_CALLS_PER_RELAY: u64 = 7;

/// Longest a relay can spend on the chain before it resolves.
///
/// Each RPC call may time out on every provider before failing over.
pub fn chain_budget_secs(chain: &ChainConfig) -> u64 {
    let providers = 1 + chain.failover_urls.len() as u64;
    chain.confirmation_timeout_secs
        + RPC_CALLS_PER_RELAY * chain.rpc_timeout_secs * providers
}

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.is_empty() || tls.key_path.is_empty() {
            errors.push(ValidationError::new(
                "listener.tls",
                "cert_path and key_path are both required",
            ));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    let chain = &config.chain;
    if url::Url::parse(&chain.rpc_url).is_err() {
        errors.push(ValidationError::new(
            "chain.rpc_url",
            format!("'{}' is not a valid URL", chain.rpc_url),
        ));
    }
    for (i, failover) in chain.failover_urls.iter().enumerate() {
        if url::Url::parse(failover).is_err() {
            errors.push(ValidationError::new(
                &format!("chain.failover_urls[{}]", i),
                format!("'{}' is not a valid URL", failover),
            ));
        }
    }
    if chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("chain.rpc_timeout_secs", "must be greater than 0"));
    }
    if chain.confirmation_blocks == 0 {
        errors.push(ValidationError::new(
            "chain.confirmation_blocks",
            "at least one confirmation is required",
        ));
    }
    if chain.confirmation_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "chain.confirmation_timeout_secs",
            "must be greater than 0",
        ));
    }
    if chain.poll_interval_ms == 0 {
        errors.push(ValidationError::new("chain.poll_interval_ms", "must be greater than 0"));
    }
    if !(chain.gas_limit_multiplier >= 1.0) {
        errors.push(ValidationError::new("chain.gas_limit_multiplier", "must be >= 1.0"));
    }
    if !(chain.gas_price_multiplier >= 1.0) {
        errors.push(ValidationError::new("chain.gas_price_multiplier", "must be >= 1.0"));
    }
    if chain.max_gas_price_gwei == 0 {
        errors.push(ValidationError::new("chain.max_gas_price_gwei", "must be greater than 0"));
    }

    if config.relayer.private_key_env.trim().is_empty() {
        errors.push(ValidationError::new("relayer.private_key_env", "must name an environment variable"));
    }

    if config.registry.manifest_path.is_none() && config.registry.positions.is_empty() {
        errors.push(ValidationError::new(
            "registry",
            "either manifest_path or inline positions must be configured",
        ));
    }

    if config.rate_limit.enabled
        && (config.rate_limit.requests_per_second == 0 || config.rate_limit.burst_size == 0)
    {
        errors.push(ValidationError::new(
            "rate_limit",
            "requests_per_second and burst_size must be greater than 0 when enabled",
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    if config.health.enabled && config.health.interval_secs == 0 {
        errors.push(ValidationError::new("health.interval_secs", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if config.admin.enabled
        && (config.admin.api_key.is_empty() || config.admin.api_key == PLACEHOLDER_ADMIN_KEY)
    {
        errors.push(ValidationError::new(
            "admin.api_key",
            "admin API is enabled with an empty or placeholder key",
        ));
    }

    let budget = chain_budget_secs(chain);
    if config.timeouts.request_secs > 0 && config.timeouts.request_secs <= budget {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            format!(
                "{} s does not cover the chain budget of {} s (confirmation_timeout_secs + {} RPC calls x rpc_timeout_secs x providers)",
                config.timeouts.request_secs, budget, RPC_CALLS_PER_RELAY
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
