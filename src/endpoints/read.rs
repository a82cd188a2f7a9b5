//! Synthetic read cost.
//!
//! Stands in for disk or network reads: `n` bytes are drawn from the OS
//! random source and hashed, so CPU and memory cost scale with `n` and do
//! not depend on the host's storage.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::{READ_BYTES_MAX, READ_BYTES_MIN};
use crate::endpoints::query_params;
use crate::http::{AppError, AppState};

/// Query parameters accepted by `/read`.
#[derive(Debug, Default, Deserialize)]
pub struct ReadParams {
    pub n: Option<i64>,
}

impl ReadParams {
    /// Resolve the byte count, falling back to `default` when `n` is absent.
    pub fn resolve(&self, default: u64) -> Result<usize, AppError> {
        let n = self.n.unwrap_or(default as i64);
        if n < READ_BYTES_MIN as i64 || n > READ_BYTES_MAX as i64 {
            return Err(AppError::validation(
                "n",
                format!("must be between {} and {}, got {}", READ_BYTES_MIN, READ_BYTES_MAX, n),
            ));
        }
        Ok(n as usize)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadResponse {
    pub node_id: String,
    pub bytes: usize,
    pub sha256: String,
}

/// Generate `n` random bytes and return their SHA-256 as lowercase hex.
pub fn digest_random_bytes(n: usize) -> String {
    let mut data = vec![0u8; n];
    OsRng.fill_bytes(&mut data);
    hex::encode(Sha256::digest(&data))
}

/// `GET /read?n=<bytes>`.
pub async fn read(
    State(state): State<AppState>,
    query: Result<Query<ReadParams>, QueryRejection>,
) -> Result<Json<ReadResponse>, AppError> {
    let n = query_params(query)?.resolve(state.config.node.read_bytes_default)?;

    let sha256 = tokio::task::spawn_blocking(move || digest_random_bytes(n)).await?;

    Ok(Json(ReadResponse {
        node_id: state.config.node.node_id.clone(),
        bytes: n,
        sha256,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_used_when_absent() {
        let params = ReadParams::default();
        assert_eq!(params.resolve(65_536).unwrap(), 65_536);
    }

    #[test]
    fn test_bounds() {
        for n in [0, -1, 5_000_001, 10_000_000] {
            let err = ReadParams { n: Some(n) }.resolve(1).unwrap_err();
            assert!(matches!(err, AppError::Validation { param: "n", .. }), "n = {}", n);
        }
        assert_eq!(ReadParams { n: Some(1) }.resolve(10).unwrap(), 1);
        assert_eq!(ReadParams { n: Some(5_000_000) }.resolve(10).unwrap(), 5_000_000);
    }

    #[test]
    fn test_digest_format() {
        let digest = digest_random_bytes(1024);
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }

    #[test]
    fn test_digests_differ_between_draws() {
        assert_ne!(digest_random_bytes(32), digest_random_bytes(32));
    }
}
