//! Cancellation checkpoints.

use crate::types::{AppError, Result};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Await `fut` unless `token` fires first.
///
/// Returns `AppError::Cancelled` without polling `fut` when the token is
/// already cancelled.
pub async fn checkpoint<T, F>(token: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if token.is_cancelled() {
        return Err(AppError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(AppError::Cancelled),
        result = fut => result,
    }
}
