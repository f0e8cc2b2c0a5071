// q15 x q7 fully-connected kernel with dual-MAC and scalar strategies
pub mod q7q15;
pub mod status;
pub mod kernel;
pub mod layer;

pub use kernel::{dense_quantized, try_dense_quantized, DenseKernel, Strategy, SELECTED};
pub use layer::{DenseParams, QuantDense};
pub use status::{DenseError, Status};
