pub mod catalog;
pub mod delivery;
pub mod errors;
pub mod order;
pub mod pincode;
pub mod ports;
