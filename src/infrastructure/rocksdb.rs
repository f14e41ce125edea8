use crate::domain::chat::UserId;
use crate::domain::order::{NewOrder, Order, OrderId, OrderStatus, TransitionPolicy};
use crate::domain::ports::OrderStore;
use crate::error::{BotError, Result};
use async_trait::async_trait;
use chrono::Utc;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing orders, keyed by big-endian order id.
pub const CF_ORDERS: &str = "orders";
/// Column Family for bookkeeping such as the id sequence.
pub const CF_META: &str = "meta";

const LAST_ID_KEY: &[u8] = b"last_order_id";

fn internal(message: impl Into<String>) -> BotError {
    BotError::StorageError(Box::new(std::io::Error::other(message.into())))
}

/// A persistent order store implementation using RocksDB.
///
/// Orders are serialized as JSON under their id. Id allocation and status
/// updates are read-modify-write sequences, so they run under a shared write
/// lock; reads go straight to the database.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBOrderStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBOrderStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("orders" and "meta") exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());
        let cf_meta = ColumnFamilyDescriptor::new(CF_META, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_orders, cf_meta])?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| internal(format!("{name} column family not found")))
    }

    fn last_id(&self) -> Result<i64> {
        let meta = self.cf(CF_META)?;
        match self.db.get_cf(meta, LAST_ID_KEY)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| internal("corrupt order id sequence"))?;
                Ok(i64::from_be_bytes(raw))
            }
            None => Ok(0),
        }
    }

    fn decode(bytes: &[u8]) -> Result<Order> {
        serde_json::from_slice(bytes).map_err(|e| internal(format!("Deserialization error: {e}")))
    }

    fn encode(order: &Order) -> Result<Vec<u8>> {
        serde_json::to_vec(order).map_err(|e| internal(format!("Serialization error: {e}")))
    }

    fn all_orders(&self) -> Result<Vec<Order>> {
        let orders = self.cf(CF_ORDERS)?;
        let mut result = Vec::new();
        for item in self.db.iterator_cf(orders, IteratorMode::Start) {
            let (_key, value) = item.map_err(|e| internal(format!("RocksDB iteration error: {e}")))?;
            result.push(Self::decode(&value)?);
        }
        Ok(result)
    }
}

#[async_trait]
impl OrderStore for RocksDBOrderStore {
    async fn create(&self, order: NewOrder) -> Result<OrderId> {
        let _guard = self.write_lock.lock().await;

        let id = OrderId(self.last_id()? + 1);
        let order = Order::from_new(id, order, Utc::now());

        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf(CF_ORDERS)?, id.0.to_be_bytes(), Self::encode(&order)?);
        batch.put_cf(self.cf(CF_META)?, LAST_ID_KEY, id.0.to_be_bytes());
        self.db.write(batch)?;

        Ok(id)
    }

    async fn set_status(
        &self,
        user_id: UserId,
        status: OrderStatus,
        policy: TransitionPolicy,
    ) -> Result<u64> {
        let _guard = self.write_lock.lock().await;

        let orders_cf = self.cf(CF_ORDERS)?;
        let mut batch = WriteBatch::default();
        let mut changed = 0;
        for mut order in self.all_orders()? {
            if order.user_id == user_id && order.apply(status, policy) {
                batch.put_cf(orders_cf, order.id.0.to_be_bytes(), Self::encode(&order)?);
                changed += 1;
            }
        }
        self.db.write(batch)?;

        Ok(changed)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let orders = self.cf(CF_ORDERS)?;
        match self.db.get_cf(orders, id.0.to_be_bytes())? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        Ok(self
            .all_orders()?
            .into_iter()
            .filter(|order| order.user_id == user_id)
            .collect())
    }
}
