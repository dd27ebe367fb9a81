//! digo - command line client for the DigitalOcean v1 API

pub mod api;
pub mod config;
