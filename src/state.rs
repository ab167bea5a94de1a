use std::sync::Arc;

use sqlx::PgPool;

use crate::store::{postgres::PgAccountStore, AccountStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AccountStore>,
}

impl AppState {
    pub fn new(db: PgPool) -> Self {
        Self::from_parts(Arc::new(PgAccountStore::new(db)))
    }

    pub fn from_parts(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }
}
