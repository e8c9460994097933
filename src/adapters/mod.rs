pub mod ffmpeg;
pub mod http;
pub mod notify;
pub mod onnx;
pub mod source;
pub mod storage;
pub mod v4l2;
