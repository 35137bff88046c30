/*
* Quizzes: authoring, attempts with grading, one-shot results, public profiles.
*/

pub mod handler;
pub mod routes;
pub mod scoring;

pub use routes::quiz_routes;
