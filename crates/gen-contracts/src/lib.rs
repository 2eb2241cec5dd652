pub mod models;
pub mod request;
pub mod sizing;
