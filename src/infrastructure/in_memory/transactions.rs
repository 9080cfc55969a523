use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{
    entities::transactions::TransactionEntity, repositories::transactions::TransactionRepository,
};

#[derive(Default)]
pub struct TransactionInMemory {
    transactions: RwLock<Vec<TransactionEntity>>,
    sequence: AtomicU64,
}

impl TransactionInMemory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionRepository for TransactionInMemory {
    async fn list_transactions(&self) -> Result<Vec<TransactionEntity>> {
        Ok(self.transactions.read().await.clone())
    }

    async fn insert(&self, transaction: TransactionEntity) -> Result<()> {
        self.transactions.write().await.push(transaction);
        Ok(())
    }

    async fn next_sequence(&self) -> Result<u64> {
        Ok(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }
}
