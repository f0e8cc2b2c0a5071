//! Quantized dense kernel: `output[i] = sat16(((bias[i] << bias_shift) + round + Σ v[j]*m[i][j]) >> out_shift)`.
//!
//! Two strategies share one contract. `DualMac` pairs rows and consumes packed
//! q15 pairs with a dual multiply-accumulate; `Scalar` is a plain double loop.
//! Which one backs [`dense_quantized`] is fixed per build by the `simd-dsp`
//! feature.

pub mod dual_mac;
pub mod scalar;

use crate::q7q15::{Q15, Q7};
use crate::status::{DenseError, Status};

pub use dual_mac::DualMac;
pub use scalar::Scalar;

/// Strategy interface. Implementations are stateless and reentrant.
pub trait DenseKernel {
    const NAME: &'static str;

    /// Writes exactly `num_of_rows` values into `output`. Never reports failure.
    #[allow(clippy::too_many_arguments)]
    fn run(
        vector: &[Q15],
        matrix: &[Q7],
        dim_vec: u16,
        num_of_rows: u16,
        bias_shift: u16,
        out_shift: u16,
        bias: &[Q7],
        output: &mut [Q15],
    ) -> Status;
}

#[cfg(feature = "simd-dsp")]
pub type Selected = DualMac;
#[cfg(not(feature = "simd-dsp"))]
pub type Selected = Scalar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    DualMac,
    Scalar,
}

/// Strategy this build was configured with.
pub const SELECTED: Strategy = if cfg!(feature = "simd-dsp") { Strategy::DualMac } else { Strategy::Scalar };

impl Strategy {
    pub fn name(self) -> &'static str {
        match self {
            Strategy::DualMac => DualMac::NAME,
            Strategy::Scalar => Scalar::NAME,
        }
    }

    /// By-value dispatch for tools that pick a strategy once at startup.
    #[allow(clippy::too_many_arguments)]
    pub fn run(
        self,
        vector: &[Q15],
        matrix: &[Q7],
        dim_vec: u16,
        num_of_rows: u16,
        bias_shift: u16,
        out_shift: u16,
        bias: &[Q7],
        output: &mut [Q15],
    ) -> Status {
        match self {
            Strategy::DualMac => DualMac::run(vector, matrix, dim_vec, num_of_rows, bias_shift, out_shift, bias, output),
            Strategy::Scalar => Scalar::run(vector, matrix, dim_vec, num_of_rows, bias_shift, out_shift, bias, output),
        }
    }
}

impl Default for Strategy {
    fn default() -> Self { SELECTED }
}

/// Mixed q15 x q7 fully-connected layer using the build's selected strategy.
///
/// `scratch` is accepted for calling-convention parity with sibling kernels and
/// is never touched. Always returns [`Status::Success`]; buffer sizes and shift
/// ranges are the caller's responsibility (checked only in debug builds).
#[allow(clippy::too_many_arguments)]
#[inline]
pub fn dense_quantized(
    vector: &[Q15],
    matrix: &[Q7],
    dim_vec: u16,
    num_of_rows: u16,
    bias_shift: u16,
    out_shift: u16,
    bias: &[Q7],
    output: &mut [Q15],
    scratch: Option<&mut [Q15]>,
) -> Status {
    let _ = scratch;
    Selected::run(vector, matrix, dim_vec, num_of_rows, bias_shift, out_shift, bias, output)
}

/// Same as [`dense_quantized`] but rejects inconsistent buffers and shifts.
#[allow(clippy::too_many_arguments)]
pub fn try_dense_quantized(
    vector: &[Q15],
    matrix: &[Q7],
    dim_vec: u16,
    num_of_rows: u16,
    bias_shift: u16,
    out_shift: u16,
    bias: &[Q7],
    output: &mut [Q15],
    scratch: Option<&mut [Q15]>,
) -> Result<Status, DenseError> {
    check_args(vector.len(), matrix.len(), bias.len(), output.len(), dim_vec, num_of_rows, bias_shift, out_shift)?;
    Ok(dense_quantized(vector, matrix, dim_vec, num_of_rows, bias_shift, out_shift, bias, output, scratch))
}

const ACC_BITS: u16 = i32::BITS as u16;

/// Scratch requirement in bytes. This kernel needs none.
pub fn scratch_buffer_size(_dim_vec: u16) -> usize { 0 }

#[allow(clippy::too_many_arguments)]
pub(crate) fn check_args(
    vector_len: usize,
    matrix_len: usize,
    bias_len: usize,
    output_len: usize,
    dim_vec: u16,
    num_of_rows: u16,
    bias_shift: u16,
    out_shift: u16,
) -> Result<(), DenseError> {
    let (d, r) = (dim_vec as usize, num_of_rows as usize);
    // nothing is read or written for zero rows
    if r == 0 { return Ok(()); }
    if vector_len < d { return Err(DenseError::VectorLength { expected: d, actual: vector_len }); }
    if matrix_len < d * r { return Err(DenseError::MatrixLength { expected: d * r, actual: matrix_len }); }
    if bias_len < r { return Err(DenseError::BiasLength { expected: r, actual: bias_len }); }
    if output_len < r { return Err(DenseError::OutputLength { expected: r, actual: output_len }); }
    check_shifts(bias_shift, out_shift)
}

/// Both shifts must stay below the i32 accumulator width. Whether a shifted
/// bias still fits is up to the bias values.
pub(crate) fn check_shifts(bias_shift: u16, out_shift: u16) -> Result<(), DenseError> {
    if bias_shift >= ACC_BITS { return Err(DenseError::BiasShiftOutOfRange(bias_shift)); }
    if out_shift >= ACC_BITS { return Err(DenseError::OutShiftOutOfRange(out_shift)); }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
#[inline]
pub(crate) fn debug_check(vector: &[Q15], matrix: &[Q7], bias: &[Q7], output: &[Q15], dim_vec: u16, num_of_rows: u16, bias_shift: u16, out_shift: u16) {
    if cfg!(debug_assertions) {
        if let Err(e) = check_args(vector.len(), matrix.len(), bias.len(), output.len(), dim_vec, num_of_rows, bias_shift, out_shift) {
            panic!("dense kernel contract violated: {e}");
        }
    }
}

/// Exact 64-bit model of the pre-saturation accumulator for row `row`.
pub fn reference_accumulator(vector: &[Q15], matrix: &[Q7], dim_vec: u16, row: usize, bias_shift: u16, bias: &[Q7]) -> i64 {
    let d = dim_vec as usize;
    let w = &matrix[row * d..(row + 1) * d];
    let dot: i64 = vector[..d].iter().zip(w).map(|(&v, &m)| v as i64 * m as i64).sum();
    ((bias[row] as i64) << bias_shift) + dot
}
