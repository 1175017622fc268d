pub mod config;
pub mod request;
pub mod response;
pub mod value;
