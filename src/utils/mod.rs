// Start of file: /src/utils/mod.rs

/*
    * Error handling, the unified response format and shared helpers.
*/

pub mod error_handler;
pub mod response_handler;
pub mod utils;

// End of file: /src/utils/mod.rs
