//! Entity services: each operation validates its payload, runs the shared
//! conflict checks, and commits or rolls back exactly one transaction at the
//! service boundary.

pub mod customers;
pub mod inventory;
pub mod mechanics;
pub mod payload;
pub mod relationships;
pub mod tickets;
pub mod users;
pub mod validate;
pub mod vehicles;
