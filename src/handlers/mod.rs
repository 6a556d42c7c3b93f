pub mod common;
pub mod dashboard;
pub mod inventory;
pub mod locations;
pub mod orders;
pub mod products;
pub mod session;
pub mod staff;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::events::EventSender;
use crate::media::MediaStore;
use crate::provisioning::CredentialProvisioner;
use crate::services::dashboard::DashboardService;
use crate::services::inventory::InventoryService;
use crate::services::locations::LocationService;
use crate::services::orders::OrderService;
use crate::services::products::ProductService;
use crate::services::staff::StaffService;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub orders: Arc<OrderService>,
    pub inventory: Arc<InventoryService>,
    pub products: Arc<ProductService>,
    pub locations: Arc<LocationService>,
    pub staff: Arc<StaffService>,
    pub dashboard: Arc<DashboardService>,
    pub media: Arc<dyn MediaStore>,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: EventSender,
        provisioner: Arc<dyn CredentialProvisioner>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        let orders = Arc::new(OrderService::new(db.clone(), event_sender.clone()));
        let inventory = Arc::new(InventoryService::new(db.clone(), event_sender.clone()));
        let products = Arc::new(ProductService::new(db.clone(), event_sender.clone()));
        let locations = Arc::new(LocationService::new(db.clone(), event_sender.clone()));
        let staff = Arc::new(StaffService::new(db.clone(), provisioner, event_sender));
        let dashboard = Arc::new(DashboardService::new(db));

        Self {
            orders,
            inventory,
            products,
            locations,
            staff,
            dashboard,
            media,
        }
    }
}
