pub mod classifier;
pub mod config;
pub mod flash;
pub mod mail;
pub mod pages;
pub mod routes;
pub mod storage;
