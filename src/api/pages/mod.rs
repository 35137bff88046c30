/*
* Legal and informational pages.
*/

pub mod handler;
pub mod routes;

pub use routes::page_routes;
