/*
* Management commands shared by the CLI and the bootstrap pipeline.
*/

pub mod collectstatic;
pub mod createadmin;
pub mod migrate;

pub use collectstatic::collectstatic;
pub use createadmin::{createadmin, AdminOutcome};
pub use migrate::migrate;
