use thiserror::Error;

/// Status code shared across the kernel family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[repr(i32)]
pub enum Status {
    Success = 0,
    ArgError = -1,
    /// Not produced by the dense kernel; kept so codes line up with sibling kernels.
    NoImplError = -2,
}

impl Status {
    pub fn code(self) -> i32 { self as i32 }
    pub fn is_success(self) -> bool { self == Status::Success }
}

/// Contract violations caught by the validated entry points.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DenseError {
    #[error("vector has {actual} elements, dim_vec is {expected}")]
    VectorLength { expected: usize, actual: usize },
    #[error("matrix has {actual} elements, expected {expected} (num_of_rows x dim_vec)")]
    MatrixLength { expected: usize, actual: usize },
    #[error("bias has {actual} elements, num_of_rows is {expected}")]
    BiasLength { expected: usize, actual: usize },
    #[error("output has room for {actual} elements, num_of_rows is {expected}")]
    OutputLength { expected: usize, actual: usize },
    #[error("bias_shift {0} exceeds accumulator width")]
    BiasShiftOutOfRange(u16),
    #[error("out_shift {0} exceeds accumulator width")]
    OutShiftOutOfRange(u16),
}

impl DenseError {
    pub fn status(&self) -> Status { Status::ArgError }
}

impl From<&DenseError> for Status {
    fn from(e: &DenseError) -> Self { e.status() }
}
