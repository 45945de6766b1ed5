pub mod cancel;
pub mod checkpoint;
pub mod config;
pub mod consts;
pub mod dataset;
pub mod error;
pub mod model;
pub mod search;
// cmd and reports are binary modules (in main.rs or distinct files).
