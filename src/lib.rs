//! Core library for plconv
pub mod config;
pub mod models;
pub mod metadata;
pub mod naming;
pub mod preset;
pub mod convert;
pub mod pipeline;
