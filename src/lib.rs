pub mod board;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod projector;

pub use board::{Board, LoadTicket};
pub use client::StoreClient;
pub use config::ClientConfig;
pub use errors::{BoardError, StoreError};
