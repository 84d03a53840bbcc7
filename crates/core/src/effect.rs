use std::fmt::Display;
use std::future::Future;

/// Run a secondary side effect whose failure must not affect the caller.
///
/// Errors are logged at `warn` under the side effect's name and turned into `None`.
pub async fn best_effort<T, E, F>(name: &'static str, action: F) -> Option<T>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match action.await {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(side_effect = name, error = %e, "Side effect failed (non-critical)");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_success() {
        let out = best_effort("noop", async { Ok::<_, String>(7) }).await;
        assert_eq!(out, Some(7));
    }

    #[tokio::test]
    async fn swallows_failure() {
        let out: Option<()> = best_effort("newsletter", async { Err("db down") }).await;
        assert!(out.is_none());
    }
}
