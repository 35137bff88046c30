/*
* Teacher videos: YouTube links with embeds, linked to quizzes.
*/

pub mod embed;
pub mod handler;
pub mod routes;

pub use routes::video_routes;
