//! Value-type adapters.
//!
//! An adapter converts between the packed numbers stored in sample tables and
//! a typed value, and decides how values are laid out for interpolation. The
//! set is closed: scalar, Cartesian3, quaternion and color. Adapters are
//! stateless unit types chosen when a property is created.

use nalgebra::{UnitQuaternion, Vector3};

use crate::error::TemporalError;
use crate::packet::{decode_raw, Packet, RawInterval};
use crate::value::{Cartesian3, Color, Quaternion, Value, ValueKind};

pub trait ValueAdapter {
    type Value: Clone + std::fmt::Debug + PartialEq + Into<Value>;

    const KIND: ValueKind;
    /// Packet field holding the raw value.
    const FIELD: &'static str;
    /// Numbers per stored sample.
    const DOUBLES_PER_VALUE: usize;
    /// Numbers per sample in the interpolation tables.
    const DOUBLES_PER_INTERPOLATION_VALUE: usize;

    /// Extract and decode this kind's value field; `None` when the packet
    /// carries nothing for it.
    fn unwrap_interval(&self, packet: &Packet) -> Result<Option<RawInterval>, TemporalError> {
        packet
            .field(Self::FIELD)
            .map(|raw| decode_raw(raw, Self::DOUBLES_PER_VALUE))
            .transpose()
    }

    #[inline]
    fn is_sampled(&self, raw: &RawInterval) -> bool {
        raw.is_sampled()
    }

    /// Typed value of a packed constant.
    #[inline]
    fn create_value(&self, packed: &[f64]) -> Self::Value {
        self.create_value_from_array(packed, 0)
    }

    fn create_value_from_array(&self, values: &[f64], offset: usize) -> Self::Value;

    /// Fill `y_table` with samples `first..=last` in interpolation layout.
    fn pack_values_for_interpolation(
        &self,
        values: &[f64],
        y_table: &mut [f64],
        first: usize,
        last: usize,
    ) {
        let w = Self::DOUBLES_PER_VALUE;
        let source = &values[first * w..(last + 1) * w];
        y_table[..source.len()].copy_from_slice(source);
    }

    /// Typed value of an interpolation result. `values`, `first` and `last`
    /// describe the window the result was computed from.
    fn create_value_from_interpolation_result(
        &self,
        result: &[f64],
        _values: &[f64],
        _first: usize,
        _last: usize,
    ) -> Self::Value {
        self.create_value_from_array(result, 0)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScalarAdapter;

impl ValueAdapter for ScalarAdapter {
    type Value = f64;

    const KIND: ValueKind = ValueKind::Scalar;
    const FIELD: &'static str = "number";
    const DOUBLES_PER_VALUE: usize = 1;
    const DOUBLES_PER_INTERPOLATION_VALUE: usize = 1;

    #[inline]
    fn create_value_from_array(&self, values: &[f64], offset: usize) -> f64 {
        values[offset]
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Cartesian3Adapter;

impl ValueAdapter for Cartesian3Adapter {
    type Value = Cartesian3;

    const KIND: ValueKind = ValueKind::Cartesian3;
    const FIELD: &'static str = "cartesian";
    const DOUBLES_PER_VALUE: usize = 3;
    const DOUBLES_PER_INTERPOLATION_VALUE: usize = 3;

    #[inline]
    fn create_value_from_array(&self, values: &[f64], offset: usize) -> Cartesian3 {
        Cartesian3::new(values[offset], values[offset + 1], values[offset + 2])
    }
}

/// Quaternions are stored as (x, y, z, w) but interpolated as rotation
/// vectors (axis * angle) relative to the window's last sample, so the
/// interpolation tables are 3 wide.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QuaternionAdapter;

impl QuaternionAdapter {
    #[inline]
    fn unit_at(values: &[f64], offset: usize) -> UnitQuaternion<f64> {
        UnitQuaternion::from_quaternion(nalgebra::Quaternion::new(
            values[offset + 3],
            values[offset],
            values[offset + 1],
            values[offset + 2],
        ))
    }
}

impl ValueAdapter for QuaternionAdapter {
    type Value = Quaternion;

    const KIND: ValueKind = ValueKind::Quaternion;
    const FIELD: &'static str = "unitQuaternion";
    const DOUBLES_PER_VALUE: usize = 4;
    const DOUBLES_PER_INTERPOLATION_VALUE: usize = 3;

    #[inline]
    fn create_value_from_array(&self, values: &[f64], offset: usize) -> Quaternion {
        Quaternion::new(
            values[offset],
            values[offset + 1],
            values[offset + 2],
            values[offset + 3],
        )
    }

    fn pack_values_for_interpolation(
        &self,
        values: &[f64],
        y_table: &mut [f64],
        first: usize,
        last: usize,
    ) {
        let reference_inverse = Self::unit_at(values, last * 4).inverse();
        for (i, index) in (first..=last).enumerate() {
            let relative = Self::unit_at(values, index * 4) * reference_inverse;
            // scaled_axis takes the shortest arc.
            let v = relative.scaled_axis();
            y_table[i * 3] = v.x;
            y_table[i * 3 + 1] = v.y;
            y_table[i * 3 + 2] = v.z;
        }
    }

    fn create_value_from_interpolation_result(
        &self,
        result: &[f64],
        values: &[f64],
        _first: usize,
        last: usize,
    ) -> Quaternion {
        let rotation = UnitQuaternion::from_scaled_axis(Vector3::new(result[0], result[1], result[2]));
        let q = (rotation * Self::unit_at(values, last * 4)).into_inner().coords;
        Quaternion::new(q.x, q.y, q.z, q.w)
    }
}

/// Colors arrive as `rgbaf` (floats in [0, 1]) or `rgba` (0-255 integers,
/// scaled on unwrap). Interpolated colors are clamped to [0, 1].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ColorAdapter;

impl ValueAdapter for ColorAdapter {
    type Value = Color;

    const KIND: ValueKind = ValueKind::Color;
    const FIELD: &'static str = "rgbaf";
    const DOUBLES_PER_VALUE: usize = 4;
    const DOUBLES_PER_INTERPOLATION_VALUE: usize = 4;

    fn unwrap_interval(&self, packet: &Packet) -> Result<Option<RawInterval>, TemporalError> {
        if let Some(raw) = packet.fields.get("rgba") {
            let mut decoded = decode_raw(raw, Self::DOUBLES_PER_VALUE)?;
            decoded.map_numbers(|byte| byte / 255.0);
            return Ok(Some(decoded));
        }
        packet
            .field(Self::FIELD)
            .map(|raw| decode_raw(raw, Self::DOUBLES_PER_VALUE))
            .transpose()
    }

    #[inline]
    fn create_value_from_array(&self, values: &[f64], offset: usize) -> Color {
        Color::new(
            values[offset],
            values[offset + 1],
            values[offset + 2],
            values[offset + 3],
        )
    }

    fn create_value_from_interpolation_result(
        &self,
        result: &[f64],
        _values: &[f64],
        _first: usize,
        _last: usize,
    ) -> Color {
        Color::new(
            result[0].clamp(0.0, 1.0),
            result[1].clamp(0.0, 1.0),
            result[2].clamp(0.0, 1.0),
            result[3].clamp(0.0, 1.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;
    use std::f64::consts::FRAC_PI_2;

    fn packet(v: serde_json::Value) -> Packet {
        Packet::from_json(&v).unwrap()
    }

    #[test]
    fn scalar_constant_and_samples() {
        let raw = ScalarAdapter
            .unwrap_interval(&packet(json!({"number": 7.5})))
            .unwrap()
            .unwrap();
        assert!(!ScalarAdapter.is_sampled(&raw));

        let raw = ScalarAdapter
            .unwrap_interval(&packet(json!({"number": [0, 1.0, 10, 2.0]})))
            .unwrap()
            .unwrap();
        assert!(ScalarAdapter.is_sampled(&raw));

        assert!(ScalarAdapter
            .unwrap_interval(&packet(json!({"cartesian": [1, 2, 3]})))
            .unwrap()
            .is_none());
    }

    #[test]
    fn cartesian_reads_offsets() {
        let values = [0.0, 0.0, 0.0, 1.0, 2.0, 3.0];
        assert_eq!(
            Cartesian3Adapter.create_value_from_array(&values, 3),
            Cartesian3::new(1.0, 2.0, 3.0)
        );
        let mut y = [0.0; 6];
        Cartesian3Adapter.pack_values_for_interpolation(&values, &mut y, 0, 1);
        assert_eq!(y, values);
    }

    #[test]
    fn color_bytes_are_scaled() {
        let raw = ColorAdapter
            .unwrap_interval(&packet(json!({"rgba": [255, 0, 51, 255]})))
            .unwrap()
            .unwrap();
        let RawInterval::Constant(values) = raw else {
            panic!("expected constant");
        };
        assert_eq!(
            ColorAdapter.create_value(&values),
            Color::new(1.0, 0.0, 0.2, 1.0)
        );
    }

    #[test]
    fn color_results_are_clamped() {
        let c = ColorAdapter.create_value_from_interpolation_result(&[1.2, -0.1, 0.5, 1.0], &[], 0, 0);
        assert_eq!(c, Color::new(1.0, 0.0, 0.5, 1.0));
    }

    #[test]
    fn quaternion_packs_relative_rotation_vectors() {
        let half = (FRAC_PI_2 / 2.0).sin();
        let cos = (FRAC_PI_2 / 2.0).cos();
        // identity, then 90 degrees about z
        let values = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, half, cos];
        let mut y = [0.0; 6];
        QuaternionAdapter.pack_values_for_interpolation(&values, &mut y, 0, 1);
        assert_relative_eq!(y[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(y[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(y[2], -FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(y[5], 0.0, epsilon = 1e-12);

        // Halfway back toward identity is 45 degrees about z.
        let q = QuaternionAdapter.create_value_from_interpolation_result(
            &[0.0, 0.0, -FRAC_PI_2 / 2.0],
            &values,
            0,
            1,
        );
        let eighth = (FRAC_PI_2 / 4.0).sin();
        assert_relative_eq!(q.z, eighth, epsilon = 1e-12);
        assert_relative_eq!(q.w, (FRAC_PI_2 / 4.0).cos(), epsilon = 1e-12);
        assert_relative_eq!(q.x, 0.0, epsilon = 1e-12);
    }
}
