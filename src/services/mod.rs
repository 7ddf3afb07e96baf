pub mod access;
pub mod backend;
pub mod config;
pub mod context;
pub mod logger;
pub mod normalizer;
pub mod tool_executor;
pub mod translator;
pub mod transport;
pub mod validation;
