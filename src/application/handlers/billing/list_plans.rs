//! ListPlansHandler - Query handler for the plan catalogue.

use std::sync::Arc;

use crate::domain::billing::{Plan, UserType};
use crate::domain::payment::PaymentError;
use crate::ports::PlanRepository;

#[derive(Debug, Clone, Default)]
pub struct ListPlansQuery {
    /// Restrict to plans sold to this account type.
    pub user_type: Option<UserType>,
}

pub struct ListPlansHandler {
    plans: Arc<dyn PlanRepository>,
}

impl ListPlansHandler {
    pub fn new(plans: Arc<dyn PlanRepository>) -> Self {
        Self { plans }
    }

    pub async fn handle(&self, query: ListPlansQuery) -> Result<Vec<Plan>, PaymentError> {
        let plans = self.plans.list().await?;
        Ok(match query.user_type {
            Some(user_type) => plans.into_iter().filter(|p| p.user_type == user_type).collect(),
            None => plans,
        })
    }
}
