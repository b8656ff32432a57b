pub mod config;
pub mod init;
pub mod install;
pub mod manage;
pub mod serve;
