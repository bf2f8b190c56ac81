pub mod handler;
pub mod requests;
