pub mod dashboard;
pub mod inventory;
pub mod locations;
pub mod orders;
pub mod products;
pub mod staff;
