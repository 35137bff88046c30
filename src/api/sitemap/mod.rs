/*
* sitemap.xml for search engines.
*/

pub mod handler;
pub mod render;
pub mod routes;

pub use routes::sitemap_routes;
