use crate::kernel::{self, check_shifts, DenseKernel, Selected, Strategy};
use crate::q7q15::{Q15, Q7};
use crate::status::{DenseError, Status};
use log::{debug, trace};
use rayon::prelude::*;

/// Shape and scaling of one dense layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DenseParams {
    pub dim_vec: u16,
    pub num_of_rows: u16,
    pub bias_shift: u16,
    pub out_shift: u16,
}

/// Owned q7 weights and bias for one layer.
#[derive(Debug, Clone)]
pub struct QuantDense {
    pub params: DenseParams,
    pub weights: Vec<Q7>, // num_of_rows x dim_vec, row-major
    pub bias: Vec<Q7>,    // num_of_rows
}

impl QuantDense {
    pub fn new(params: DenseParams, weights: Vec<Q7>, bias: Vec<Q7>) -> Result<Self, DenseError> {
        let (d, r) = (params.dim_vec as usize, params.num_of_rows as usize);
        if weights.len() != d * r { return Err(DenseError::MatrixLength { expected: d * r, actual: weights.len() }); }
        if bias.len() != r { return Err(DenseError::BiasLength { expected: r, actual: bias.len() }); }
        check_shifts(params.bias_shift, params.out_shift)?;
        debug!(
            "dense layer {}x{} bias_shift={} out_shift={} strategy={}",
            r, d, params.bias_shift, params.out_shift, Selected::NAME
        );
        Ok(Self { params, weights, bias })
    }

    pub fn dim_vec(&self) -> usize { self.params.dim_vec as usize }
    pub fn num_of_rows(&self) -> usize { self.params.num_of_rows as usize }

    /// Runs the build's selected kernel. Slice lengths are the caller's to match.
    pub fn forward(&self, input: &[Q15], output: &mut [Q15]) -> Status {
        let p = self.params;
        kernel::dense_quantized(input, &self.weights, p.dim_vec, p.num_of_rows, p.bias_shift, p.out_shift, &self.bias, output, None)
    }

    pub fn forward_with(&self, strategy: Strategy, input: &[Q15], output: &mut [Q15]) -> Status {
        let p = self.params;
        strategy.run(input, &self.weights, p.dim_vec, p.num_of_rows, p.bias_shift, p.out_shift, &self.bias, output)
    }

    pub fn try_forward(&self, input: &[Q15], output: &mut [Q15]) -> Result<Status, DenseError> {
        let p = self.params;
        kernel::try_dense_quantized(input, &self.weights, p.dim_vec, p.num_of_rows, p.bias_shift, p.out_shift, &self.bias, output, None)
    }

    /// Independent calls over consecutive `dim_vec`-long input vectors, each
    /// writing its own `num_of_rows` slice of `outputs`.
    ///
    /// With `dim_vec == 0` every input vector is empty, so the batch size is
    /// `outputs.len() / num_of_rows` and each slice gets the bias-only result.
    pub fn forward_batch(&self, inputs: &[Q15], outputs: &mut [Q15]) -> Result<Status, DenseError> {
        let (d, r) = (self.dim_vec(), self.num_of_rows());
        if r == 0 { return Ok(Status::Success); }
        let n = if d == 0 { outputs.len() / r } else { inputs.len() / d };
        if d != 0 && inputs.len() % d != 0 {
            return Err(DenseError::VectorLength { expected: inputs.len().next_multiple_of(d), actual: inputs.len() });
        }
        if outputs.len() < n * r {
            return Err(DenseError::OutputLength { expected: n * r, actual: outputs.len() });
        }
        trace!("dense batch of {} vectors", n);
        let statuses: Vec<Status> = outputs[..n * r]
            .par_chunks_mut(r)
            .enumerate()
            .map(|(k, out)| self.forward(&inputs[k * d..(k + 1) * d], out))
            .collect();
        Ok(statuses.into_iter().find(|s| !s.is_success()).unwrap_or(Status::Success))
    }
}
