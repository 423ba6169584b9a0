pub mod config;
pub mod data;
pub mod identity_string;
pub mod lib_constants;
pub mod logging;
pub mod rng;
pub mod session;
pub mod storage;
