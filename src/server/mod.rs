//! HTTP facade for the kiosk page.

mod routes;

pub use routes::{create_router, KioskState};
