//! Application state for dependency injection.

use std::sync::Arc;

use account_service_lib::AccountStore;
use auth_service_lib::AuthService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthService>,
    pub store: Arc<dyn AccountStore>,
}

impl AppState {
    pub fn new(auth: Arc<dyn AuthService>, store: Arc<dyn AccountStore>) -> Self {
        Self { auth, store }
    }
}
