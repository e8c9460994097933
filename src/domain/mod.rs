pub mod advice;
pub mod alert;
pub mod camera;
pub mod dedup;
pub mod detection;
pub mod errors;
pub mod monitor;
pub mod severity;
