pub mod model_bootstrap;
pub mod yolo_engine;
