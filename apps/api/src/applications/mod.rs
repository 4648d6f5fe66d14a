pub mod filter;
pub mod handlers;
pub mod resume;
