/*
* Assistant endpoints: keyword-routed chat answers and a feedback inbox.
*/

pub mod feedback;
pub mod handler;
pub mod intent;
pub mod routes;

pub use feedback::FeedbackLog;
pub use routes::assistant_routes;
