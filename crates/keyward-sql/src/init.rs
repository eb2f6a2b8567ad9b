// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! All-or-nothing execution of a provider's setup statements.

use keyward_core::{Backend, BatchFailure, StoreError};
use tracing::{debug, info, warn};

/// Run `statements` in order inside one transaction.
///
/// Blank statements are skipped. If a statement fails the transaction is
/// rolled back and the failure returned; if the rollback fails too, both
/// failures are returned in [`StoreError::Rollback`].
pub async fn run_init_statements<B>(
    backend: &B,
    statements: &[String],
    table: &'static str,
) -> Result<(), StoreError>
where
    B: Backend + ?Sized,
{
    let batch: Vec<String> = statements
        .iter()
        .filter(|s| !s.trim().is_empty())
        .cloned()
        .collect();
    debug!(table, statements = batch.len(), "running init statements");

    match backend.run_batch(&batch).await {
        Ok(()) => {
            info!(table, "storage initialized");
            Ok(())
        }
        Err(BatchFailure::Begin(err)) => Err(StoreError::Driver(err)),
        Err(BatchFailure::Statement(err)) => {
            warn!(table, error = %err, "init statement failed, rolled back");
            Err(StoreError::Driver(err))
        }
        Err(BatchFailure::Rollback { initial, rollback }) => {
            warn!(table, error = %initial, rollback_error = %rollback, "init rollback failed");
            Err(StoreError::Rollback {
                initial: Box::new(StoreError::Driver(initial)),
                rollback: Box::new(StoreError::Driver(rollback)),
            })
        }
        Err(BatchFailure::Commit(err)) => Err(StoreError::Commit(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockBackend;

    fn statements(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn commits_when_every_statement_succeeds() {
        let backend = MockBackend::new();
        run_init_statements(&backend, &statements(&["CREATE a", "", "  ", "CREATE b"]), "users")
            .await
            .unwrap();

        assert_eq!(backend.tx_statements(), vec!["CREATE a", "CREATE b"]);
        assert_eq!(backend.tx_events(), vec!["begin", "commit"]);
    }

    #[tokio::test]
    async fn rolls_back_and_stops_on_failure() {
        let backend = MockBackend::new().fail_tx_statement("CREATE b");
        let err = run_init_statements(&backend, &statements(&["CREATE a", "CREATE b", "CREATE c"]), "users")
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Driver(_)));
        assert_eq!(backend.tx_statements(), vec!["CREATE a", "CREATE b"]);
        assert_eq!(backend.tx_events(), vec!["begin", "rollback"]);
    }

    #[tokio::test]
    async fn failed_rollback_keeps_both_errors() {
        let backend = MockBackend::new().fail_tx_statement("CREATE a").fail_rollback();
        let err = run_init_statements(&backend, &statements(&["CREATE a"]), "sessions")
            .await
            .unwrap_err();

        match err {
            StoreError::Rollback { initial, rollback } => {
                assert!(initial.to_string().contains("CREATE a"));
                assert!(rollback.to_string().contains("rollback"));
            }
            other => panic!("expected Rollback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn commit_failure_is_reported() {
        let backend = MockBackend::new().fail_commit();
        let err = run_init_statements(&backend, &statements(&["CREATE a"]), "users")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Commit(_)));
    }
}
