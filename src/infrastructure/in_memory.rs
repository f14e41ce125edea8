use crate::domain::chat::UserId;
use crate::domain::order::{NewOrder, Order, OrderId, OrderStatus, TransitionPolicy};
use crate::domain::ports::OrderStore;
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct OrderTable {
    last_id: i64,
    rows: BTreeMap<OrderId, Order>,
}

/// A thread-safe in-memory order store.
///
/// Ids are handed out from a counter starting at 1, like an autoincrement
/// column. Ideal for testing or for runs where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    table: Arc<RwLock<OrderTable>>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, order: NewOrder) -> Result<OrderId> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let id = OrderId(table.last_id);
        table.rows.insert(id, Order::from_new(id, order, Utc::now()));
        Ok(id)
    }

    async fn set_status(
        &self,
        user_id: UserId,
        status: OrderStatus,
        policy: TransitionPolicy,
    ) -> Result<u64> {
        let mut table = self.table.write().await;
        let changed = table
            .rows
            .values_mut()
            .filter(|order| order.user_id == user_id)
            .map(|order| order.apply(status, policy))
            .filter(|applied| *applied)
            .count();
        Ok(changed as u64)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect())
    }
}
