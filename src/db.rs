use sqlx::{PgConnection, PgPool, Postgres, Transaction};

/// Request-scoped transactional session.
///
/// Every write path acquires one of these, runs its statements through
/// [`SessionScope::conn`], and calls [`SessionScope::commit`] on success.
/// Dropping the scope without committing rolls the transaction back, so
/// early returns, auth failures and cancelled requests all release the
/// connection through the same path.
pub struct SessionScope {
    tx: Transaction<'static, Postgres>,
}

impl SessionScope {
    pub async fn begin(pool: &PgPool) -> sqlx::Result<Self> {
        Ok(Self {
            tx: pool.begin().await?,
        })
    }

    pub fn conn(&mut self) -> &mut PgConnection {
        &mut self.tx
    }

    pub async fn commit(self) -> sqlx::Result<()> {
        self.tx.commit().await
    }
}
