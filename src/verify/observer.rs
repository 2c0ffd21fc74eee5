use tracing::{debug, info, warn};

use super::types::{Stage, VerificationResult};

/// Receives progress events from the [`Verifier`](super::Verifier).
///
/// Both hooks default to no-ops.
pub trait VerifyObserver {
    /// `stage` is the state just reached; `detail` explains it.
    fn on_stage(&self, _address: &str, _stage: Stage, _detail: &str) {}

    /// Called once per address. `index` is 1-based; `total` is 1 for
    /// single verifications.
    fn on_result(&self, _index: usize, _total: usize, _result: &VerificationResult) {}
}

/// Default observer: stage details at debug level, verdicts at info
/// (negative ones at warn).
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl VerifyObserver for TracingObserver {
    fn on_stage(&self, address: &str, stage: Stage, detail: &str) {
        debug!(%address, %stage, "{detail}");
    }

    fn on_result(&self, index: usize, total: usize, result: &VerificationResult) {
        if result.is_valid {
            info!(
                index,
                total,
                address = %result.address,
                "{}",
                result.message
            );
        } else {
            warn!(
                index,
                total,
                address = %result.address,
                "{}",
                result.message
            );
        }
    }
}

impl<T: VerifyObserver + ?Sized> VerifyObserver for &T {
    fn on_stage(&self, address: &str, stage: Stage, detail: &str) {
        (**self).on_stage(address, stage, detail)
    }

    fn on_result(&self, index: usize, total: usize, result: &VerificationResult) {
        (**self).on_result(index, total, result)
    }
}
