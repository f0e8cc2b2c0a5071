use super::{debug_check, DenseKernel};
use crate::q7q15::{initial_acc, mac, requantize, Q15, Q7};
use crate::status::Status;

/// Portable reference path: one multiply-accumulate per element, no unrolling.
pub struct Scalar;

impl DenseKernel for Scalar {
    const NAME: &'static str = "scalar";

    fn run(
        vector: &[Q15],
        matrix: &[Q7],
        dim_vec: u16,
        num_of_rows: u16,
        bias_shift: u16,
        out_shift: u16,
        bias: &[Q7],
        output: &mut [Q15],
    ) -> Status {
        debug_check(vector, matrix, bias, output, dim_vec, num_of_rows, bias_shift, out_shift);
        let d = dim_vec as usize;
        for i in 0..num_of_rows as usize {
            let mut acc = initial_acc(bias[i], bias_shift, out_shift);
            let row = &matrix[i * d..(i + 1) * d];
            for j in 0..d { acc = mac(vector[j], row[j], acc); }
            output[i] = requantize(acc, out_shift);
        }
        Status::Success
    }
}
