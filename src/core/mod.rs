//! Core functionality: documents, settings, search, persistence and the session

pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod search;
pub mod session;
pub mod storage;
