use pretty_assertions::assert_eq;
use qdense::kernel::{self, reference_accumulator, DenseKernel, DualMac, Scalar, Strategy};
use qdense::q7q15::saturate16;
use qdense::{DenseError, Status};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn run_both(v: &[i16], m: &[i8], dim_vec: u16, rows: u16, bias_shift: u16, out_shift: u16, bias: &[i8]) -> Vec<i16> {
    let mut a = vec![0x5a5a_u16 as i16; rows as usize];
    let mut b = vec![-1i16; rows as usize];
    assert_eq!(DualMac::run(v, m, dim_vec, rows, bias_shift, out_shift, bias, &mut a), Status::Success);
    assert_eq!(Scalar::run(v, m, dim_vec, rows, bias_shift, out_shift, bias, &mut b), Status::Success);
    assert_eq!(a, b, "dual-mac and scalar disagree");
    a
}

#[test]
fn end_to_end_two_rows() {
    let v = [1i16, 2, 3, 4];
    let m = [1i8, 1, 1, 1, 2, 2, 2, 2];
    let out = run_both(&v, &m, 4, 2, 0, 0, &[0, 0]);
    assert_eq!(out, vec![10, 20]);
}

#[test]
fn end_to_end_rounds_on_shift() {
    let v = [1i16, 2, 3, 4];
    let m = [1i8, 1, 1, 1, 2, 2, 2, 2];
    let out = run_both(&v, &m, 4, 2, 0, 1, &[0, 0]);
    assert_eq!(out, vec![5, 10]);
}

#[test]
fn selected_entry_point_matches_strategies() {
    let v = [1i16, 2, 3, 4];
    let m = [1i8, 1, 1, 1, 2, 2, 2, 2];
    let mut out = [0i16; 2];
    let mut scratch = [0i16; 8];
    let st = kernel::dense_quantized(&v, &m, 4, 2, 0, 1, &[0, 0], &mut out, Some(&mut scratch[..]));
    assert_eq!(st, Status::Success);
    assert_eq!(out, [5, 10]);
    assert_eq!(scratch, [0i16; 8], "scratch must be left untouched");
    assert_eq!(kernel::scratch_buffer_size(4), 0);
}

#[test]
fn saturation_boundaries() {
    // one row per target: 32767, 32768, -32768, -32769
    let v = [32767i16, 16384, 16384, -32768, 1];
    let m = [
        1i8, 0, 0, 0, 0,
        0, 1, 1, 0, 0,
        0, 0, 0, 1, 0,
        0, 0, 0, 1, -1,
    ];
    let out = run_both(&v, &m, 5, 4, 0, 0, &[0; 4]);
    assert_eq!(out, vec![32767, 32767, -32768, -32768]);
}

#[test]
fn bias_only_when_dim_vec_zero() {
    let bias = [3i8, -3, 100];
    let out = run_both(&[], &[], 0, 3, 2, 1, &bias);
    assert_eq!(out, vec![6, -6, 200]);
    let out = run_both(&[], &[], 0, 3, 0, 0, &bias);
    assert_eq!(out, vec![3, -3, 100]);
}

#[test]
fn zero_rows_writes_nothing() {
    let v = [7i16; 6];
    let mut out: [i16; 0] = [];
    for s in [Strategy::DualMac, Strategy::Scalar] {
        assert_eq!(s.run(&v, &[], 6, 0, 40, 40, &[], &mut out), Status::Success);
    }
    let mut spare = [123i16; 2];
    assert_eq!(kernel::dense_quantized(&v, &[], 6, 0, 0, 0, &[], &mut spare, None), Status::Success);
    assert_eq!(spare, [123, 123]);
}

#[test]
fn odd_rows_use_trailing_single_row() {
    let mut rng = SmallRng::seed_from_u64(11);
    for rows in [1u16, 3, 5, 7] {
        for dim in [4u16, 5, 6, 7, 8] {
            let v: Vec<i16> = (0..dim).map(|_| rng.gen()).collect();
            let m: Vec<i8> = (0..dim * rows).map(|_| rng.gen()).collect();
            let b: Vec<i8> = (0..rows).map(|_| rng.gen()).collect();
            let out = run_both(&v, &m, dim, rows, 3, 10, &b);
            let last = rows as usize - 1;
            let acc = reference_accumulator(&v, &m, dim, last, 3, &b) + (1 << 9);
            assert_eq!(out[last], saturate16((acc >> 10) as i32));
        }
    }
}

#[test]
fn column_remainders_match_scalar() {
    let mut rng = SmallRng::seed_from_u64(5);
    for dim in 1u16..=13 {
        let rows = 4u16;
        let v: Vec<i16> = (0..dim).map(|_| rng.gen()).collect();
        let m: Vec<i8> = (0..dim * rows).map(|_| rng.gen()).collect();
        let b: Vec<i8> = (0..rows).map(|_| rng.gen()).collect();
        run_both(&v, &m, dim, rows, 4, 12, &b);
    }
}

#[test]
fn rounding_law_against_wide_reference() {
    let mut rng = SmallRng::seed_from_u64(0xfeed);
    for _ in 0..200 {
        let dim: u16 = rng.gen_range(0..=64);
        let rows: u16 = rng.gen_range(1..=9);
        let bias_shift: u16 = rng.gen_range(0..=8);
        let out_shift: u16 = rng.gen_range(0..=16);
        let v: Vec<i16> = (0..dim).map(|_| rng.gen()).collect();
        let m: Vec<i8> = (0..dim * rows).map(|_| rng.gen()).collect();
        let b: Vec<i8> = (0..rows).map(|_| rng.gen()).collect();
        let out = run_both(&v, &m, dim, rows, bias_shift, out_shift, &b);
        for i in 0..rows as usize {
            let acc = reference_accumulator(&v, &m, dim, i, bias_shift, &b);
            let rounded = if out_shift > 0 { (acc + (1i64 << (out_shift - 1))) >> out_shift } else { acc };
            let want = rounded.clamp(i16::MIN as i64, i16::MAX as i64) as i16;
            assert_eq!(out[i], want, "row {i} dim {dim} bs {bias_shift} os {out_shift}");
        }
    }
}

#[test]
fn strategies_agree_on_wrapping_accumulators() {
    // extreme products over a long row overflow i32; both paths wrap identically
    let dim = 4099u16;
    let v = vec![i16::MIN; dim as usize];
    let m = vec![i8::MIN; dim as usize * 3];
    run_both(&v, &m, dim, 3, 0, 0, &[127, -128, 0]);
}

#[test]
fn strategy_names_and_default() {
    assert_eq!(Strategy::DualMac.name(), "dual-mac");
    assert_eq!(Strategy::Scalar.name(), "scalar");
    assert_eq!(Strategy::default(), kernel::SELECTED);
    let expected = if cfg!(feature = "simd-dsp") { Strategy::DualMac } else { Strategy::Scalar };
    assert_eq!(kernel::SELECTED, expected);
    assert_eq!(serde_json::to_string(&Strategy::DualMac).unwrap(), "\"dual-mac\"");
}

#[test]
fn wide_bias_shift_saturates_instead_of_panicking() {
    let mut out = [0i16; 1];
    assert_eq!(Scalar::run(&[], &[], 0, 1, 25, 10, &[1], &mut out), Status::Success);
    assert_eq!(out, [32767]);
    let out = run_both(&[], &[], 0, 2, 25, 10, &[1, -1]);
    assert_eq!(out, vec![32767, -32768]);
}

#[test]
fn shift_limits_near_accumulator_width() {
    let mut rng = SmallRng::seed_from_u64(0x31);
    for bias_shift in [24u16, 25, 31] {
        for out_shift in [17u16, 30, 31] {
            // biases that keep (bias << bias_shift) + round + dot inside i32
            let bias: Vec<i8> = if bias_shift == 31 { vec![0, -1, 0, -1, 0] } else { vec![2, -2, 1, -1, 0] };
            let rows = bias.len() as u16;
            let dim = 6u16;
            let v: Vec<i16> = (0..dim).map(|_| rng.gen_range(-100..=100)).collect();
            let m: Vec<i8> = (0..dim * rows).map(|_| rng.gen_range(-10..=10)).collect();
            let out = run_both(&v, &m, dim, rows, bias_shift, out_shift, &bias);

            let mut checked = vec![0i16; rows as usize];
            let st = kernel::try_dense_quantized(&v, &m, dim, rows, bias_shift, out_shift, &bias, &mut checked, None);
            assert_eq!(st, Ok(Status::Success));
            assert_eq!(checked, out);

            for i in 0..rows as usize {
                let acc = reference_accumulator(&v, &m, dim, i, bias_shift, &bias);
                let rounded = (acc + (1i64 << (out_shift - 1))) >> out_shift;
                let want = rounded.clamp(i16::MIN as i64, i16::MAX as i64) as i16;
                assert_eq!(out[i], want, "row {i} bs {bias_shift} os {out_shift}");
            }
        }
    }
}

#[test]
fn checked_call_rejects_shifts_at_accumulator_width() {
    let mut out = [0i16; 1];
    let st = kernel::try_dense_quantized(&[1], &[1], 1, 1, 32, 0, &[0], &mut out, None);
    assert_eq!(st, Err(DenseError::BiasShiftOutOfRange(32)));
    let st = kernel::try_dense_quantized(&[1], &[1], 1, 1, 0, 32, &[0], &mut out, None);
    assert_eq!(st, Err(DenseError::OutShiftOutOfRange(32)));
}
