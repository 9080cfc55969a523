use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::transactions::TransactionEntity;

#[automock]
#[async_trait]
pub trait TransactionRepository {
    async fn list_transactions(&self) -> Result<Vec<TransactionEntity>>;
    async fn insert(&self, transaction: TransactionEntity) -> Result<()>;
    /// Next value of the sequence used for `TXN-<n>` ids.
    async fn next_sequence(&self) -> Result<u64>;
}
