//! barn-sentry: vigilancia de gallineros por cámara.
//!
//! Detecta gallinas enfermas o muertas con un modelo YOLO (ONNX), deduplica
//! las detecciones en espacio y tiempo y avisa al backend de la granja con
//! un consejo según la severidad.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod logging;
