pub mod client;

pub use client::PostmanClient;
