//! Wire packets: the JSON description of one property over a time range,
//! and the sample batches decoded from it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::TemporalError;
use crate::interp::InterpolationAlgorithm;
use crate::interval::TimeInterval;
use crate::time::{TimeDesignator, TimeStamp};

/// One incoming description of a property over a time range.
///
/// Notes:
/// - `interval` absent means the packet covers all time.
/// - `epoch` is required only when sample times are numeric offsets.
/// - The value itself lives under a kind-specific field (`number`,
///   `cartesian`, `unitQuaternion`, `rgbaf`/`rgba`) collected in `fields`,
///   or the packet may be a bare value (see [`Packet::from_json`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch: Option<String>,
    #[serde(
        default,
        rename = "interpolationAlgorithm",
        skip_serializing_if = "Option::is_none"
    )]
    pub interpolation_algorithm: Option<String>,
    #[serde(
        default,
        rename = "interpolationDegree",
        skip_serializing_if = "Option::is_none"
    )]
    pub interpolation_degree: Option<u32>,
    #[serde(flatten)]
    pub fields: Map<String, JsonValue>,
    /// Value given directly instead of wrapped in an object.
    #[serde(skip)]
    pub bare: Option<JsonValue>,
}

impl Packet {
    /// Decode a packet from JSON. Anything that is not an object is taken as a
    /// bare value covering all time.
    pub fn from_json(value: &JsonValue) -> Result<Self, TemporalError> {
        match value {
            JsonValue::Object(_) => serde_json::from_value(value.clone())
                .map_err(|e| TemporalError::malformed(format!("packet: {e}"))),
            other => Ok(Packet {
                bare: Some(other.clone()),
                ..Packet::default()
            }),
        }
    }

    /// Parse one packet or an array of packets.
    pub fn parse_many(text: &str) -> Result<Vec<Self>, TemporalError> {
        let value: JsonValue = serde_json::from_str(text)?;
        Self::from_json_many(&value)
    }

    /// Split a JSON array into packets; any other value is a single packet.
    pub fn from_json_many(value: &JsonValue) -> Result<Vec<Self>, TemporalError> {
        match value {
            JsonValue::Array(items) if items.iter().all(JsonValue::is_object) => {
                items.iter().map(Self::from_json).collect()
            }
            other => Ok(vec![Self::from_json(other)?]),
        }
    }

    /// Validity window of the packet.
    pub fn interval(&self) -> Result<TimeInterval, TemporalError> {
        match &self.interval {
            None => Ok(TimeInterval::INFINITE),
            Some(text) => TimeInterval::from_iso8601(text),
        }
    }

    pub fn epoch(&self) -> Result<Option<TimeStamp>, TemporalError> {
        self.epoch
            .as_deref()
            .map(|text| {
                TimeStamp::from_iso8601(text)
                    .map_err(|e| TemporalError::malformed(format!("epoch: {e}")))
            })
            .transpose()
    }

    pub fn algorithm(&self) -> Result<Option<InterpolationAlgorithm>, TemporalError> {
        self.interpolation_algorithm
            .as_deref()
            .map(str::parse)
            .transpose()
    }

    /// The raw value under `field`, falling back to a bare value.
    pub fn field(&self, field: &str) -> Option<&JsonValue> {
        self.fields.get(field).or(self.bare.as_ref())
    }
}

/// A batch of new samples: one time designator per entry and `width`
/// numbers per entry, stored flat.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBatch {
    times: Vec<TimeDesignator>,
    values: Vec<f64>,
    width: usize,
}

impl SampleBatch {
    pub fn new(width: usize) -> Self {
        Self {
            times: Vec::new(),
            values: Vec::new(),
            width,
        }
    }

    /// Build from `(time, value)` pairs. Each value must have `width` numbers.
    pub fn from_pairs<D, V>(width: usize, pairs: impl IntoIterator<Item = (D, V)>) -> Result<Self, TemporalError>
    where
        D: Into<TimeDesignator>,
        V: AsRef<[f64]>,
    {
        let mut batch = Self::new(width);
        for (time, value) in pairs {
            batch.push(time, value.as_ref())?;
        }
        Ok(batch)
    }

    pub fn push(&mut self, time: impl Into<TimeDesignator>, value: &[f64]) -> Result<(), TemporalError> {
        if value.len() != self.width {
            return Err(TemporalError::malformed(format!(
                "sample has {} numbers, expected {}",
                value.len(),
                self.width
            )));
        }
        self.times.push(time.into());
        self.values.extend_from_slice(value);
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn time(&self, index: usize) -> &TimeDesignator {
        &self.times[index]
    }

    #[inline]
    pub fn value(&self, index: usize) -> &[f64] {
        &self.values[index * self.width..(index + 1) * self.width]
    }

    pub(crate) fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }
}

/// Decoded value field of a packet.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInterval {
    Constant(Vec<f64>),
    Sampled(SampleBatch),
}

impl RawInterval {
    #[inline]
    pub fn is_sampled(&self) -> bool {
        matches!(self, RawInterval::Sampled(_))
    }

    /// Apply `f` to every number (not to times).
    pub(crate) fn map_numbers(&mut self, f: impl Fn(f64) -> f64) {
        let numbers = match self {
            RawInterval::Constant(values) => values.as_mut_slice(),
            RawInterval::Sampled(batch) => batch.values_mut(),
        };
        for n in numbers {
            *n = f(*n);
        }
    }
}

fn number(v: &JsonValue, what: &str) -> Result<f64, TemporalError> {
    v.as_f64()
        .ok_or_else(|| TemporalError::malformed(format!("{what} must be a number, got {v}")))
}

/// Decode a raw value field for a kind `width` numbers wide.
///
/// An array longer than `width` is a flat sample list
/// `[time_0, v0.., time_1, v1.., ..]`; otherwise it is a constant.
pub fn decode_raw(raw: &JsonValue, width: usize) -> Result<RawInterval, TemporalError> {
    match raw {
        JsonValue::Number(_) if width == 1 => Ok(RawInterval::Constant(vec![number(raw, "value")?])),
        JsonValue::Array(items) if items.len() > width => {
            let stride = width + 1;
            if items.len() % stride != 0 {
                return Err(TemporalError::malformed(format!(
                    "sample list of length {} is not a multiple of {stride}",
                    items.len()
                )));
            }
            let mut batch = SampleBatch::new(width);
            let mut value = Vec::with_capacity(width);
            for chunk in items.chunks(stride) {
                let time = match &chunk[0] {
                    JsonValue::String(text) => TimeDesignator::Iso8601(text.clone()),
                    JsonValue::Number(n) => TimeDesignator::EpochOffset(n.as_f64().unwrap_or(f64::NAN)),
                    other => {
                        return Err(TemporalError::malformed(format!(
                            "sample time must be a string or number, got {other}"
                        )))
                    }
                };
                value.clear();
                for v in &chunk[1..] {
                    value.push(number(v, "sample value")?);
                }
                batch.push(time, &value)?;
            }
            Ok(RawInterval::Sampled(batch))
        }
        JsonValue::Array(items) if items.len() == width => items
            .iter()
            .map(|v| number(v, "value"))
            .collect::<Result<Vec<_>, _>>()
            .map(RawInterval::Constant),
        other => Err(TemporalError::malformed(format!(
            "expected {width} numbers or a sample list, got {other}"
        ))),
    }
}
