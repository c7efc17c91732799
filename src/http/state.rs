//! Application state for the HTTP server.

use std::sync::Arc;

use crate::auth::AuthService;
use crate::broadcast::EventBus;
use crate::coordinator::AssignmentCoordinator;
use crate::db::repository::FullRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn FullRepository>,
    pub coordinator: Arc<AssignmentCoordinator>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(repository: Arc<dyn FullRepository>, auth: Arc<AuthService>) -> Self {
        let bus = EventBus::default();
        let coordinator = Arc::new(AssignmentCoordinator::new(repository.clone(), bus));
        Self {
            repository,
            coordinator,
            auth,
        }
    }

    pub fn event_bus(&self) -> &EventBus {
        self.coordinator.event_bus()
    }
}
