// Role prediction: skill vectorization, inference, top-k formatting, and the
// HTTP handlers that drive them.

pub mod features;
pub mod handlers;
pub mod predictor;
pub mod ranking;
