//! Synthetic latency and failure injection.
//!
//! The delay is a busy-wait: the thread spins on the clock instead of
//! sleeping, so the node's CPU utilisation reflects the injected latency.
//! Autoscalers and load-aware balancers watching CPU see the load.

use std::time::{Duration, Instant};

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::endpoints::query_params;
use crate::http::{AppError, AppState};
use crate::observability::metrics;

pub const MAX_MS: u64 = 5_000;
pub const MAX_JITTER_MS: u64 = 2_000;
pub const DEFAULT_MS: u64 = 10;

/// Query parameters accepted by `/work`.
#[derive(Debug, Default, Deserialize)]
pub struct WorkParams {
    pub ms: Option<i64>,
    pub jitter: Option<i64>,
    pub fail_prob: Option<f64>,
}

/// Validated `/work` request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkPlan {
    pub ms: u64,
    pub jitter: u64,
    pub fail_prob: f64,
}

fn bounded_ms(param: &'static str, value: i64, max: u64) -> Result<u64, AppError> {
    if value < 0 || value as u64 > max {
        return Err(AppError::validation(
            param,
            format!("must be between 0 and {}, got {}", max, value),
        ));
    }
    Ok(value as u64)
}

impl WorkParams {
    pub fn resolve(&self) -> Result<WorkPlan, AppError> {
        let ms = bounded_ms("ms", self.ms.unwrap_or(DEFAULT_MS as i64), MAX_MS)?;
        let jitter = bounded_ms("jitter", self.jitter.unwrap_or(0), MAX_JITTER_MS)?;

        let fail_prob = self.fail_prob.unwrap_or(0.0);
        // NaN fails the range check too.
        if !(0.0..=1.0).contains(&fail_prob) {
            return Err(AppError::validation(
                "fail_prob",
                format!("must be between 0.0 and 1.0, got {}", fail_prob),
            ));
        }

        Ok(WorkPlan { ms, jitter, fail_prob })
    }
}

impl WorkPlan {
    /// Single uniform draw against `fail_prob`. No draw happens when it is zero.
    pub fn should_fail<R: Rng>(&self, rng: &mut R) -> bool {
        self.fail_prob > 0.0 && rng.gen::<f64>() < self.fail_prob
    }

    /// Base delay plus a uniform extra in `[0, jitter]`.
    pub fn target_ms<R: Rng>(&self, rng: &mut R) -> u64 {
        let extra = if self.jitter > 0 {
            rng.gen_range(0..=self.jitter)
        } else {
            0
        };
        self.ms + extra
    }
}

/// Spin until `duration` of wall-clock time has passed.
///
/// Returns the number of loop iterations.
pub fn spin_for(duration: Duration) -> u64 {
    let start = Instant::now();
    let mut spins: u64 = 0;
    while start.elapsed() < duration {
        spins = spins.wrapping_add(1);
        std::hint::spin_loop();
    }
    spins
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WorkResponse {
    pub node_id: String,
    pub target_ms: u64,
    pub spin: u64,
}

/// `GET /work?ms=<ms>&jitter=<ms>&fail_prob=<p>`.
pub async fn work(
    State(state): State<AppState>,
    query: Result<Query<WorkParams>, QueryRejection>,
) -> Result<Json<WorkResponse>, AppError> {
    let plan = query_params(query)?.resolve()?;

    let target_ms = {
        let mut rng = rand::thread_rng();
        if plan.should_fail(&mut rng) {
            metrics::record_injected_failure();
            return Err(AppError::InjectedFailure);
        }
        plan.target_ms(&mut rng)
    };

    let spin =
        tokio::task::spawn_blocking(move || spin_for(Duration::from_millis(target_ms))).await?;

    Ok(Json(WorkResponse {
        node_id: state.config.node.node_id.clone(),
        target_ms,
        spin,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_defaults() {
        let plan = WorkParams::default().resolve().unwrap();
        assert_eq!(plan, WorkPlan { ms: 10, jitter: 0, fail_prob: 0.0 });
    }

    #[test]
    fn test_rejects_out_of_range() {
        let cases = [
            (WorkParams { ms: Some(-1), ..Default::default() }, "ms"),
            (WorkParams { ms: Some(5_001), ..Default::default() }, "ms"),
            (WorkParams { jitter: Some(2_001), ..Default::default() }, "jitter"),
            (WorkParams { jitter: Some(-5), ..Default::default() }, "jitter"),
            (WorkParams { fail_prob: Some(1.5), ..Default::default() }, "fail_prob"),
            (WorkParams { fail_prob: Some(-0.1), ..Default::default() }, "fail_prob"),
            (WorkParams { fail_prob: Some(f64::NAN), ..Default::default() }, "fail_prob"),
        ];

        for (params, expected) in cases {
            match params.resolve() {
                Err(AppError::Validation { param, .. }) => assert_eq!(param, expected),
                other => panic!("expected validation error on {}, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn test_accepts_bounds() {
        let plan = WorkParams { ms: Some(5_000), jitter: Some(2_000), fail_prob: Some(1.0) }
            .resolve()
            .unwrap();
        assert_eq!(plan.ms, 5_000);
        assert_eq!(plan.jitter, 2_000);
    }

    #[test]
    fn test_failure_extremes() {
        let mut rng = StdRng::seed_from_u64(7);
        let always = WorkPlan { ms: 0, jitter: 0, fail_prob: 1.0 };
        let never = WorkPlan { ms: 0, jitter: 0, fail_prob: 0.0 };

        for _ in 0..1_000 {
            assert!(always.should_fail(&mut rng));
            assert!(!never.should_fail(&mut rng));
        }
    }

    #[test]
    fn test_target_within_jitter() {
        let mut rng = StdRng::seed_from_u64(42);
        let plan = WorkPlan { ms: 100, jitter: 25, fail_prob: 0.0 };

        for _ in 0..1_000 {
            let target = plan.target_ms(&mut rng);
            assert!((100..=125).contains(&target), "target {}", target);
        }

        let flat = WorkPlan { ms: 40, jitter: 0, fail_prob: 0.0 };
        assert_eq!(flat.target_ms(&mut rng), 40);
    }

    #[test]
    fn test_spin_waits_for_duration() {
        let start = Instant::now();
        let spins = spin_for(Duration::from_millis(20));
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert!(spins > 0);
    }

    #[test]
    fn test_zero_spin_returns_immediately() {
        assert_eq!(spin_for(Duration::ZERO), 0);
    }
}
