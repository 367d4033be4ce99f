pub mod catalog_repo;
pub mod local_store;
pub mod models;
pub mod order_repo;
