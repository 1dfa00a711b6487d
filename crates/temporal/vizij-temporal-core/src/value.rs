//! Typed values produced by property queries.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ValueKind {
    Scalar,
    Cartesian3,
    Quaternion,
    Color,
}

/// Position or direction in 3D.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Cartesian3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Cartesian3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Rotation quaternion (x, y, z, w).
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// RGBA color with components in [0, 1].
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub const fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Build from 0-255 byte components.
    pub fn from_bytes(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self::new(red / 255.0, green / 255.0, blue / 255.0, alpha / 255.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }
}

/// Any value a dynamic property can yield.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    Scalar(f64),
    Cartesian3(Cartesian3),
    Quaternion(Quaternion),
    Color(Color),
}

impl Value {
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Scalar(_) => ValueKind::Scalar,
            Value::Cartesian3(_) => ValueKind::Cartesian3,
            Value::Quaternion(_) => ValueKind::Quaternion,
            Value::Color(_) => ValueKind::Color,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Scalar(v)
    }
}

impl From<Cartesian3> for Value {
    fn from(v: Cartesian3) -> Self {
        Value::Cartesian3(v)
    }
}

impl From<Quaternion> for Value {
    fn from(v: Quaternion) -> Self {
        Value::Quaternion(v)
    }
}

impl From<Color> for Value {
    fn from(v: Color) -> Self {
        Value::Color(v)
    }
}
