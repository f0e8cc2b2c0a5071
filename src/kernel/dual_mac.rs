use super::{debug_check, DenseKernel};
use crate::q7q15::{initial_acc, mac, read_and_pad, read_q15x2, requantize, smlad, Q15, Q7};
use crate::status::Status;

/// Packed dual-MAC path.
///
/// Rows are processed two at a time so every packed read of the shared q15
/// vector feeds two weight rows. Columns go four per step (two `smlad` per row),
/// then a scalar tail covers `dim_vec % 4`. An odd trailing row goes through the
/// single-row loop with the same unrolling.
pub struct DualMac;

impl DenseKernel for DualMac {
    const NAME: &'static str = "dual-mac";

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
        let rows = num_of_rows as usize;
        let blocks = d >> 2;
        let tail = d & 0x3;

        let mut r = 0usize;
        while r + 1 < rows {
            let w1 = &matrix[r * d..(r + 1) * d];
            let w2 = &matrix[(r + 1) * d..(r + 2) * d];
            let mut sum = initial_acc(bias[r], bias_shift, out_shift);
            let mut sum2 = initial_acc(bias[r + 1], bias_shift, out_shift);

            let mut c = 0usize;
            for _ in 0..blocks {
                let (m11, m12) = read_and_pad(w1, c);
                let (m21, m22) = read_and_pad(w2, c);

                let v = read_q15x2(vector, c);
                sum = smlad(v, m11, sum);
                sum2 = smlad(v, m21, sum2);

                let v = read_q15x2(vector, c + 2);
                sum = smlad(v, m12, sum);
                sum2 = smlad(v, m22, sum2);

                c += 4;
            }
            for _ in 0..tail {
                sum = mac(vector[c], w1[c], sum);
                sum2 = mac(vector[c], w2[c], sum2);
                c += 1;
            }

            output[r] = requantize(sum, out_shift);
            output[r + 1] = requantize(sum2, out_shift);
            r += 2;
        }

        if rows & 0x1 == 1 {
            let w = &matrix[r * d..(r + 1) * d];
            let mut sum = initial_acc(bias[r], bias_shift, out_shift);
            let mut c = 0usize;
            for _ in 0..blocks {
                let (m1, m2) = read_and_pad(w, c);
                sum = smlad(read_q15x2(vector, c), m1, sum);
                sum = smlad(read_q15x2(vector, c + 2), m2, sum);
                c += 4;
            }
            for _ in 0..tail {
                sum = mac(vector[c], w[c], sum);
                c += 1;
            }
            output[r] = requantize(sum, out_shift);
        }

        Status::Success
    }
}
