use mockall::mock;
use order_engine::{order_types::OrderRecord, MirrorError, OrderMirror, OrderStore, StoreError};
use serde_json::Value;

mock! {
    pub OrderCache {}
    impl OrderStore for OrderCache {
        async fn append_order(&self, subject: &str, order: OrderRecord) -> Result<(), StoreError>;
        async fn fetch_orders(&self, subject: &str) -> Result<Vec<OrderRecord>, StoreError>;
    }
}

mock! {
    pub ProfileMirror {}
    impl OrderMirror for ProfileMirror {
        async fn append_mirrored_order(&self, subject: &str, order: &OrderRecord) -> Result<(), MirrorError>;
        async fn fetch_mirrored_orders(&self, subject: &str) -> Result<Vec<Value>, MirrorError>;
    }
}
