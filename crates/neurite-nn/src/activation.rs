//! Activation functions, floating point and fixed point.
//!
//! Each neuron carries a 2-bit activation selector and one activation
//! weight acting as the slope of the nonlinearity. The quantized lanes
//! use the PLAN piecewise-linear approximation of the logistic function
//! (breaks at |z| = 1, 2.375 and 5), which stays within ~0.019 of the
//! real curve using only shifts and adds.

use serde::{Deserialize, Serialize};

/// Activation selected by a neuron's 2-bit type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ActivationKind {
    /// Pass-through. The f32 lane forwards the accumulator unchanged;
    /// quantized lanes saturate into the unsigned neuron range.
    Identity = 0,
    /// Logistic sigmoid of `slope * x`.
    Sigmoid = 1,
    /// `(1 + tanh(slope * x)) / 2`, evaluated as the sigmoid of a
    /// doubled argument.
    TanhUnit = 2,
    /// `clamp(slope * x, 0, 1)`.
    UnitClamp = 3,
}

impl ActivationKind {
    /// Decode from a 2-bit type code.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::Identity,
            1 => Self::Sigmoid,
            2 => Self::TanhUnit,
            _ => Self::UnitClamp,
        }
    }
}

/// Unpack a 2-bit-per-neuron activation mask (4 codes per byte,
/// low bits first) into one kind per neuron.
pub fn unpack_mask(mask: &[u8], neurons: usize) -> Vec<ActivationKind> {
    (0..neurons)
        .map(|i| {
            let byte = mask.get(i / 4).copied().unwrap_or(0);
            ActivationKind::from_bits(byte >> ((i % 4) * 2))
        })
        .collect()
}

/// Logistic sigmoid, f32.
#[inline]
pub fn sigmoid_f32(z: f32) -> f32 {
    1.0 / (1.0 + (-z).exp())
}

/// PLAN piecewise-linear sigmoid over a Q15 argument (`32768 == 1.0`).
///
/// Returns the sigmoid in the unsigned neuron range `[0, 32767]`.
pub fn plan_sigmoid_q15(z: i32) -> u16 {
    const ONE: i64 = 32768;
    let a = z.unsigned_abs() as i64;
    let s = if a >= 5 * ONE {
        32767
    } else if a >= ONE * 19 / 8 {
        // 0.03125 * z + 0.84375
        (a >> 5) + 27648
    } else if a >= ONE {
        // 0.125 * z + 0.625
        (a >> 3) + 20480
    } else {
        // 0.25 * z + 0.5
        (a >> 2) + 16384
    }
    .min(32767);
    if z < 0 {
        (32768 - s).min(32767) as u16
    } else {
        s as u16
    }
}

/// PLAN piecewise-linear sigmoid over a Q7 argument (`128 == 1.0`).
///
/// Returns the sigmoid in the unsigned neuron range `[0, 127]`.
pub fn plan_sigmoid_q7(z: i32) -> u8 {
    const ONE: i64 = 128;
    let a = z.unsigned_abs() as i64;
    let s = if a >= 5 * ONE {
        127
    } else if a >= ONE * 19 / 8 {
        (a >> 5) + 108
    } else if a >= ONE {
        (a >> 3) + 80
    } else {
        (a >> 2) + 64
    }
    .min(127);
    if z < 0 {
        (128 - s).min(127) as u8
    } else {
        s as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bits_covers_all_codes() {
        assert_eq!(ActivationKind::from_bits(0), ActivationKind::Identity);
        assert_eq!(ActivationKind::from_bits(1), ActivationKind::Sigmoid);
        assert_eq!(ActivationKind::from_bits(2), ActivationKind::TanhUnit);
        assert_eq!(ActivationKind::from_bits(3), ActivationKind::UnitClamp);
        assert_eq!(ActivationKind::from_bits(0b111), ActivationKind::UnitClamp);
    }

    #[test]
    fn test_unpack_mask_low_bits_first() {
        // codes 0,1,2,3 packed into one byte, then 3,2 into the next
        let mask = [0b11_10_01_00u8, 0b00_00_10_11];
        let kinds = unpack_mask(&mask, 6);
        assert_eq!(
            kinds,
            [
                ActivationKind::Identity,
                ActivationKind::Sigmoid,
                ActivationKind::TanhUnit,
                ActivationKind::UnitClamp,
                ActivationKind::UnitClamp,
                ActivationKind::TanhUnit,
            ]
        );
    }

    #[test]
    fn test_plan_q15_tracks_true_sigmoid() {
        // sweep z in [-8, 8] and compare against the float curve
        for step in -64..=64i32 {
            let z = step * 4096; // 0.125 increments in Q15
            let approx = plan_sigmoid_q15(z) as f32 / 32768.0;
            let exact = sigmoid_f32(z as f32 / 32768.0);
            assert!(
                (approx - exact).abs() < 0.02,
                "z={z}: plan {approx} vs {exact}"
            );
        }
    }

    #[test]
    fn test_plan_q15_fixed_points() {
        assert_eq!(plan_sigmoid_q15(0), 16384); // 0.5
        assert_eq!(plan_sigmoid_q15(i32::MAX / 2), 32767);
        assert_eq!(plan_sigmoid_q15(i32::MIN / 2), 1);
        // symmetry: sigma(-z) == 1 - sigma(z)
        for z in [1000i32, 40000, 200000] {
            let p = plan_sigmoid_q15(z) as i32;
            let n = plan_sigmoid_q15(-z) as i32;
            assert!((p + n - 32768).abs() <= 1, "z={z}");
        }
    }

    #[test]
    fn test_plan_q7_tracks_true_sigmoid() {
        for step in -40..=40i32 {
            let z = step * 16; // 0.125 increments in Q7
            let approx = plan_sigmoid_q7(z) as f32 / 128.0;
            let exact = sigmoid_f32(z as f32 / 128.0);
            assert!(
                (approx - exact).abs() < 0.03,
                "z={z}: plan {approx} vs {exact}"
            );
        }
    }
}
