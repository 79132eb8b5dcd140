pub mod error;
pub mod jwt;
