// Wave surfing core: wave tracking, danger statistics and trajectory prediction

pub mod danger;
pub mod predictor;
pub mod wave;

pub use danger::DangerModel;
pub use predictor::{MotionState, Prediction, predict_position};
pub use wave::{SurfHistory, SurfSample, Wave, WaveTracker};
