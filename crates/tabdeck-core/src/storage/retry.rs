//! Retry helpers for key/value reads and writes
//!
//! The TUI and one-shot CLI commands can hold the same database file open,
//! so a statement may briefly see a locked database.

use std::future::Future;
use std::time::Duration;

/// Maximum number of retry attempts for a store operation
pub const MAX_RETRIES: u32 = 4;

/// Primary SQLite result codes worth retrying
const SQLITE_BUSY: i64 = 5;
const SQLITE_LOCKED: i64 = 6;

/// Whether an error is a lock contention that should clear on its own
///
/// Extended codes carry the primary code in the low byte, so
/// `SQLITE_BUSY_SNAPSHOT` (517) and friends match as well.
pub fn is_transient_error(err: &sqlx::Error) -> bool {
    let sqlx::Error::Database(db_err) = err else {
        return false;
    };
    db_err
        .code()
        .and_then(|code| code.parse::<i64>().ok())
        .map(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
        .unwrap_or(false)
}

/// Exponential backoff: 50ms, 100ms, 200ms, 400ms
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(50 * 2u64.pow(attempt.saturating_sub(1)))
}

/// Run a store operation, retrying lock contention with exponential backoff
pub async fn with_retry<F, Fut, T>(label: &str, operation: F) -> std::result::Result<T, sqlx::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = std::result::Result<T, sqlx::Error>>,
{
    let mut attempts = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if is_transient_error(&e) && attempts < MAX_RETRIES => {
                attempts += 1;
                let delay = backoff_delay(attempts);
                tracing::debug!(
                    error = %e,
                    operation = label,
                    attempt = attempts,
                    delay_ms = delay.as_millis(),
                    "Store busy, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_delay() {
        assert_eq!(backoff_delay(1), Duration::from_millis(50));
        assert_eq!(backoff_delay(2), Duration::from_millis(100));
        assert_eq!(backoff_delay(4), Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_non_transient_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: std::result::Result<(), sqlx::Error> = with_retry("test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(sqlx::Error::RowNotFound) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_success_passes_value_through() {
        let value = with_retry("test", || async { Ok::<_, sqlx::Error>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }
}
