pub mod catalog_handlers;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
