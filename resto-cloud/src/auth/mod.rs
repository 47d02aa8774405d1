//! Authentication for kitchen staff and customers

pub mod customer;
pub mod staff_auth;

pub use customer::OptionalCustomer;
pub use staff_auth::{StaffIdentity, staff_auth_middleware};
