pub mod admin;
pub mod upload;
pub mod volunteer;
