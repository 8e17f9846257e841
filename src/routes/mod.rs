//! Route definitions for the PinStock API

mod accounts;
mod funding;
mod inventory;
mod reservation;
mod settlement;

pub use accounts::account_routes;
pub use funding::funding_routes;
pub use inventory::inventory_routes;
pub use reservation::reservation_routes;
pub use settlement::settlement_routes;
