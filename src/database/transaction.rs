use crate::database::get_pool;
use sqlx::{Postgres, Transaction};

#[derive(Debug)]
pub struct DatabaseTransaction;

impl DatabaseTransaction {
    /// Run `f` inside one transaction, committing on success and rolling
    /// back on any error. Invitation reissue and acceptance go through here
    /// so their multi-table writes land together or not at all.
    pub async fn run<T, F>(f: F) -> Result<T, crate::error::AppError>
    where
        F: for<'a> FnOnce(
            &'a mut Transaction<'_, Postgres>,
        ) -> std::pin::Pin<
            Box<dyn std::future::Future<Output = Result<T, crate::error::AppError>> + Send + 'a>,
        >,
        T: Send,
    {
        let mut tx = get_pool().begin().await.map_err(crate::error::AppError::from)?;

        match f(&mut tx).await {
            Ok(value) => {
                tx.commit().await.map_err(crate::error::AppError::from)?;
                Ok(value)
            }
            Err(err) => {
                log::warn!("Rolling back transaction: {}", err);
                if let Err(rollback_err) = tx.rollback().await {
                    log::error!(
                        "Rollback failed: {} (original error: {})",
                        rollback_err,
                        err
                    );
                }
                Err(err)
            }
        }
    }
}
