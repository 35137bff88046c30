/*
* Book catalogue uploaded by teachers.
*/

pub mod handler;
pub mod price;
pub mod routes;

pub use routes::book_routes;
