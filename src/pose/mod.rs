pub mod detector;
pub mod landmark;
pub mod preprocess;

pub use detector::PoseDetector;
pub use landmark::{Body, Landmark, LandmarkIndex};
pub use preprocess::{preprocess_for_blazepose, BLAZEPOSE_INPUT_SIZE};
