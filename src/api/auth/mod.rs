/*
* Accounts: registration, login sessions, profile and password change.
*/

pub mod handler;
pub mod routes;
pub mod service;

pub use routes::{account_routes, auth_routes};
