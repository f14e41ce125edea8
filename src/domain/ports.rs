use super::chat::{Outbound, UserId};
use super::order::{NewOrder, Order, OrderId, OrderStatus, TransitionPolicy};
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new `Pending` order and returns its id.
    async fn create(&self, order: NewOrder) -> Result<OrderId>;
    /// Moves the user's orders to `status` where `policy` permits it.
    /// Returns the number of orders that changed.
    async fn set_status(
        &self,
        user_id: UserId,
        status: OrderStatus,
        policy: TransitionPolicy,
    ) -> Result<u64>;
    async fn get(&self, id: OrderId) -> Result<Option<Order>>;
    /// All orders of a user, oldest first.
    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Order>>;
}

/// Outbound side of the chat transport.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, message: Outbound) -> Result<()>;
}

pub type OrderStoreBox = Box<dyn OrderStore>;
pub type NotifierBox = Box<dyn Notifier>;
pub type OrderStoreFactory = Box<dyn Fn() -> OrderStoreBox + Send + Sync>;
