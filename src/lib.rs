//! Library crate for trivia-night-back, exposing modules for binaries and integration tests.

pub mod aggregate;
pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
