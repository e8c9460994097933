pub mod dto;
pub mod monitor;
pub mod ports;
pub mod services;
