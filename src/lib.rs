pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod request;
pub mod search;
pub mod session;
pub mod thumbnail;
pub mod viewer;
pub use dotenv::dotenv;
