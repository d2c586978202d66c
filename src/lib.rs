// src/lib.rs

//! Municipal events → schema.org JSON-LD library

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
