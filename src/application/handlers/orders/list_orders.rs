//! ListOrdersHandler - Query handler for a user's orders.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::marketplace::Order;
use crate::domain::payment::PaymentError;
use crate::ports::OrderRepository;

#[derive(Debug, Clone)]
pub struct ListOrdersQuery {
    pub user_id: UserId,
}

pub struct ListOrdersHandler {
    orders: Arc<dyn OrderRepository>,
}

impl ListOrdersHandler {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    /// Orders the user bought or sold, newest first.
    pub async fn handle(&self, query: ListOrdersQuery) -> Result<Vec<Order>, PaymentError> {
        Ok(self.orders.list_for_user(&query.user_id).await?)
    }
}
