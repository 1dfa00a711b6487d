//! Interpolators:
//! - LinearApproximation (straight line through exactly two points)
//! - LagrangeApproximation (Lagrange basis through every window point)
//! - HermiteApproximation (Newton divided-difference tableau, order zero)
//!
//! All operate on packed tables: `x_table[i]` is the offset of point `i`,
//! `y_table[i * width .. (i + 1) * width]` its value.

use super::{InterpolationAlgorithm, Interpolator};
use crate::error::TemporalError;

fn check_tables(
    x_table: &[f64],
    y_table: &[f64],
    width: usize,
    result: &[f64],
) -> Result<(), TemporalError> {
    if x_table.is_empty() {
        return Err(TemporalError::Interpolation {
            reason: "empty interpolation window".into(),
        });
    }
    if y_table.len() < x_table.len() * width || result.len() < width {
        return Err(TemporalError::Interpolation {
            reason: format!(
                "tables too small: {} points of width {width}, y_table {}, result {}",
                x_table.len(),
                y_table.len(),
                result.len()
            ),
        });
    }
    Ok(())
}

#[inline]
fn coincident(a: f64, b: f64) -> TemporalError {
    TemporalError::Interpolation {
        reason: format!("coincident abscissae {a} and {b}"),
    }
}

#[inline]
fn required_for_degree(degree: u32) -> usize {
    (degree as usize + 1).max(2)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LinearApproximation;

impl Interpolator for LinearApproximation {
    fn algorithm(&self) -> InterpolationAlgorithm {
        InterpolationAlgorithm::Linear
    }

    fn required_point_count(&self, _degree: u32) -> usize {
        2
    }

    fn interpolate(
        &self,
        x: f64,
        x_table: &[f64],
        y_table: &[f64],
        width: usize,
        result: &mut [f64],
    ) -> Result<(), TemporalError> {
        check_tables(x_table, y_table, width, result)?;
        if x_table.len() != 2 {
            return Err(TemporalError::Interpolation {
                reason: format!("linear needs 2 points, got {}", x_table.len()),
            });
        }
        let (x0, x1) = (x_table[0], x_table[1]);
        if x0 == x1 {
            return Err(coincident(x0, x1));
        }
        let span = x1 - x0;
        for i in 0..width {
            let y0 = y_table[i];
            let y1 = y_table[width + i];
            result[i] = (y0 * (x1 - x) + y1 * (x - x0)) / span;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LagrangeApproximation;

impl Interpolator for LagrangeApproximation {
    fn algorithm(&self) -> InterpolationAlgorithm {
        InterpolationAlgorithm::Lagrange
    }

    fn required_point_count(&self, degree: u32) -> usize {
        required_for_degree(degree)
    }

    fn interpolate(
        &self,
        x: f64,
        x_table: &[f64],
        y_table: &[f64],
        width: usize,
        result: &mut [f64],
    ) -> Result<(), TemporalError> {
        check_tables(x_table, y_table, width, result)?;
        let result = &mut result[..width];
        result.fill(0.0);

        for (i, &xi) in x_table.iter().enumerate() {
            let mut basis = 1.0;
            for (j, &xj) in x_table.iter().enumerate() {
                if i == j {
                    continue;
                }
                if xi == xj {
                    return Err(coincident(xi, xj));
                }
                basis *= (x - xj) / (xi - xj);
            }
            let point = &y_table[i * width..(i + 1) * width];
            for (out, y) in result.iter_mut().zip(point) {
                *out += basis * y;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HermiteApproximation;

impl Interpolator for HermiteApproximation {
    fn algorithm(&self) -> InterpolationAlgorithm {
        InterpolationAlgorithm::Hermite
    }

    fn required_point_count(&self, degree: u32) -> usize {
        required_for_degree(degree)
    }

    fn interpolate(
        &self,
        x: f64,
        x_table: &[f64],
        y_table: &[f64],
        width: usize,
        result: &mut [f64],
    ) -> Result<(), TemporalError> {
        check_tables(x_table, y_table, width, result)?;
        let n = x_table.len();
        // coefficients[j] ends up as f[x_0, .., x_j] after the tableau passes.
        let mut coefficients = vec![0.0; n];

        for s in 0..width {
            for (j, c) in coefficients.iter_mut().enumerate() {
                *c = y_table[j * width + s];
            }
            for level in 1..n {
                for j in (level..n).rev() {
                    let dx = x_table[j] - x_table[j - level];
                    if dx == 0.0 {
                        return Err(coincident(x_table[j], x_table[j - level]));
                    }
                    coefficients[j] = (coefficients[j] - coefficients[j - 1]) / dx;
                }
            }
            // Newton form, evaluated Horner-style.
            let mut value = coefficients[n - 1];
            for k in (0..n - 1).rev() {
                value = value * (x - x_table[k]) + coefficients[k];
            }
            result[s] = value;
        }
        Ok(())
    }
}
