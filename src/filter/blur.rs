//! Separable Gaussian blur over premultiplied RGBA8.
//!
//! Weights are quantised to 16.16 fixed point and normalised to sum to exactly
//! `1 << 16`, so a flat region stays flat and the premultiplied invariant
//! (`channel <= alpha`) survives both passes. Edges clamp.

use super::{FilterSettings, FilterStage, SlotArena};

/// Sigma ceiling; beyond this the kernel grows without a visible difference.
pub const MAX_SIGMA: f32 = 50.0;

const Q16_ONE: i64 = 1 << 16;

/// Gaussian blur with `sigma = settings.blur` pixels.
#[derive(Debug, Clone, Copy)]
pub struct Blur;

impl FilterStage for Blur {
    fn name(&self) -> &'static str {
        "blur"
    }

    fn is_active(&self, settings: &FilterSettings) -> bool {
        settings.blur.is_finite() && settings.blur > 0.0
    }

    fn apply(&self, arena: &mut SlotArena, settings: &FilterSettings) {
        let (width, height) = (arena.pixmap.width(), arena.pixmap.height());
        blur_premultiplied(arena.pixmap.data_mut(), width, height, settings.blur);
    }
}

/// Blurs a premultiplied RGBA8 buffer in place.
///
/// Does nothing for a non-positive or non-finite `sigma`, or if `data` does
/// not match the dimensions.
pub fn blur_premultiplied(data: &mut [u8], width: u32, height: u32, sigma: f32) {
    let len = width as usize * height as usize * 4;
    if data.len() != len || len == 0 {
        return;
    }
    let Some(kernel) = gaussian_kernel_q16(sigma) else {
        return;
    };

    let mut tmp = vec![0u8; len];
    convolve(data, &mut tmp, width, height, &kernel, Axis::Horizontal);
    convolve(&tmp, data, width, height, &kernel, Axis::Vertical);
}

/// Kernel of `2 * ceil(3 * sigma) + 1` taps.
fn gaussian_kernel_q16(sigma: f32) -> Option<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return None;
    }
    let sigma = f64::from(sigma.min(MAX_SIGMA));
    let radius = (3.0 * sigma).ceil() as i32;

    let denom = 2.0 * sigma * sigma;
    let raw: Vec<f64> = (-radius..=radius)
        .map(|i| (-f64::from(i * i) / denom).exp())
        .collect();
    let sum: f64 = raw.iter().sum();
    if sum <= 0.0 {
        return None;
    }

    let mut weights: Vec<i64> = raw
        .iter()
        .map(|w| ((w / sum) * Q16_ONE as f64).round() as i64)
        .collect();

    // Rounding drift goes to the centre tap.
    let drift = Q16_ONE - weights.iter().sum::<i64>();
    let mid = weights.len() / 2;
    weights[mid] = (weights[mid] + drift).clamp(0, Q16_ONE);

    Some(weights.into_iter().map(|w| w as u32).collect())
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

fn convolve(src: &[u8], dst: &mut [u8], width: u32, height: u32, kernel: &[u32], axis: Axis) {
    let radius = (kernel.len() / 2) as i32;
    let (w, h) = (width as i32, height as i32);

    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (k, &weight) in kernel.iter().enumerate() {
                let d = k as i32 - radius;
                let (sx, sy) = match axis {
                    Axis::Horizontal => ((x + d).clamp(0, w - 1), y),
                    Axis::Vertical => (x, (y + d).clamp(0, h - 1)),
                };
                let idx = (sy * w + sx) as usize * 4;
                for (c, slot) in acc.iter_mut().enumerate() {
                    *slot += u64::from(weight) * u64::from(src[idx + c]);
                }
            }

            let out = (y * w + x) as usize * 4;
            for (c, value) in acc.into_iter().enumerate() {
                dst[out + c] = q16_to_u8(value);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + (1 << 15)) >> 16).min(255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::{gradient, render_slot};
    use image::{Rgba, RgbaImage};

    #[test]
    fn kernel_sums_to_one() {
        for sigma in [0.3, 1.0, 2.5, 10.0, 500.0] {
            let kernel = gaussian_kernel_q16(sigma).unwrap();
            let sum: u64 = kernel.iter().map(|&w| u64::from(w)).sum();
            assert_eq!(sum, 1 << 16, "sigma {sigma}");
            assert_eq!(kernel.len() % 2, 1);
        }
    }

    #[test]
    fn oversized_sigma_is_capped() {
        let capped = gaussian_kernel_q16(MAX_SIGMA).unwrap();
        let huge = gaussian_kernel_q16(10_000.0).unwrap();
        assert_eq!(capped.len(), huge.len());
    }

    #[test]
    fn invalid_sigma_has_no_kernel() {
        assert!(gaussian_kernel_q16(0.0).is_none());
        assert!(gaussian_kernel_q16(-1.0).is_none());
        assert!(gaussian_kernel_q16(f32::NAN).is_none());
    }

    #[test]
    fn flat_buffer_is_unchanged() {
        let (w, h) = (6u32, 5u32);
        let px = [40u8, 80, 20, 200];
        let mut data = px.repeat((w * h) as usize);
        let original = data.clone();
        blur_premultiplied(&mut data, w, h, 2.0);
        assert_eq!(data, original);
    }

    #[test]
    fn single_pixel_energy_spreads_and_is_conserved() {
        let (w, h) = (9u32, 9u32);
        let mut data = vec![0u8; (w * h * 4) as usize];
        let centre = ((4 * w + 4) * 4) as usize;
        data[centre..centre + 4].copy_from_slice(&[255, 255, 255, 255]);

        blur_premultiplied(&mut data, w, h, 1.0);

        let lit = data.chunks_exact(4).filter(|px| px[3] != 0).count();
        assert!(lit > 1);
        let alpha: i32 = data.chunks_exact(4).map(|px| i32::from(px[3])).sum();
        assert!((alpha - 255).abs() <= 8, "alpha sum {alpha}");
        assert!(data.chunks_exact(4).all(|px| px[0] <= px[3]));
    }

    #[test]
    fn blur_stage_softens_a_hard_edge() {
        let source = RgbaImage::from_fn(20, 6, |x, _| {
            if x < 10 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        let settings = FilterSettings {
            blur: 2.0,
            ..FilterSettings::default()
        };
        let out = render_slot(&source, &settings);
        let just_left = out.get_pixel(9, 3)[0];
        let just_right = out.get_pixel(10, 3)[0];
        assert!(just_left > 0 && just_right < 255);
        assert_eq!(out.get_pixel(0, 3)[0], 0);
    }

    #[test]
    fn blur_keeps_dimensions() {
        let source = gradient(13, 7);
        let settings = FilterSettings {
            blur: 1.0,
            ..FilterSettings::default()
        };
        assert_eq!(render_slot(&source, &settings).dimensions(), (13, 7));
    }
}
