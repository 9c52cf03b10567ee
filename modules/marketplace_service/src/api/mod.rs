//! API layer - HTTP transport

pub mod rest;
