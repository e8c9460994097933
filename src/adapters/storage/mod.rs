pub mod camera_file;
