//! Relayer health state.
//!
//! # States
//! ```text
//! ok          RPC reachable, balance above the low-funds threshold
//! degraded    RPC reachable, balance below the threshold
//! unavailable RPC unreachable
//! ```
//!
//! Written by the health monitor, read by `/health` and the admin API.

use alloy::primitives::{Address, U256};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Overall status reported by `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Ok,
    Degraded,
    Unavailable,
}

impl HealthStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HealthStatus::Ok => "ok",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unavailable => "unavailable",
        }
    }
}

/// Shared relayer health, updated in place by the monitor.
#[derive(Debug)]
pub struct RelayerHealth {
    relayer: Address,
    rpc_healthy: AtomicBool,
    low_funds: AtomicBool,
    balance_wei: RwLock<Option<U256>>,
    /// Unix seconds of the last completed check; 0 before the first one.
    last_check: AtomicU64,
}

impl RelayerHealth {
    /// Starts optimistic: healthy RPC, balance unknown.
    pub fn new(relayer: Address) -> Self {
        Self {
            relayer,
            rpc_healthy: AtomicBool::new(true),
            low_funds: AtomicBool::new(false),
            balance_wei: RwLock::new(None),
            last_check: AtomicU64::new(0),
        }
    }

    pub fn relayer(&self) -> Address {
        self.relayer
    }

    pub fn rpc_healthy(&self) -> bool {
        self.rpc_healthy.load(Ordering::Relaxed)
    }

    pub fn low_funds(&self) -> bool {
        self.low_funds.load(Ordering::Relaxed)
    }

    pub fn balance_wei(&self) -> Option<U256> {
        *self.balance_wei.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn last_check(&self) -> Option<u64> {
        match self.last_check.load(Ordering::Relaxed) {
            0 => None,
            ts => Some(ts),
        }
    }

    pub fn status(&self) -> HealthStatus {
        if !self.rpc_healthy() {
            HealthStatus::Unavailable
        } else if self.low_funds() {
            HealthStatus::Degraded
        } else {
            HealthStatus::Ok
        }
    }

    /// Record an RPC probe; logs on transitions only.
    pub fn set_rpc_healthy(&self, healthy: bool) {
        let was = self.rpc_healthy.swap(healthy, Ordering::Relaxed);
        if was != healthy {
            if healthy {
                tracing::info!("Chain RPC reachable again");
            } else {
                tracing::warn!("Chain RPC unreachable");
            }
        }
        self.touch();
    }

    /// Record the relayer balance against the low-funds threshold.
    pub fn set_balance(&self, balance: U256, threshold: U256) {
        *self.balance_wei.write().unwrap_or_else(|e| e.into_inner()) = Some(balance);
        let low = balance < threshold;
        let was = self.low_funds.swap(low, Ordering::Relaxed);
        if low && !was {
            tracing::warn!(
                relayer = %self.relayer,
                balance_wei = %balance,
                threshold_wei = %threshold,
                "Relayer balance below threshold"
            );
        } else if !low && was {
            tracing::info!(relayer = %self.relayer, balance_wei = %balance, "Relayer balance restored");
        }
        self.touch();
    }

    fn touch(&self) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        self.last_check.store(now, Ordering::Relaxed);
    }
}
