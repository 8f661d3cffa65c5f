pub mod onnx_landmark_detector;
