pub mod handlers;
pub mod saved;
pub mod search;
