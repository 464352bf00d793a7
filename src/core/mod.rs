pub mod diagnostics;
pub mod error;
pub mod fusion;
pub mod kmeans;
pub mod metric;
pub mod normalize;
pub mod quantization;
pub mod ranking;
pub mod runtime;
pub mod vector;
