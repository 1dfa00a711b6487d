//! DynamicObject: an identified entity holding a fixed set of optional
//! dynamic properties plus an availability window.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::adapter::{Cartesian3Adapter, ColorAdapter, QuaternionAdapter, ScalarAdapter, ValueAdapter};
use crate::error::TemporalError;
use crate::interval::TimeInterval;
use crate::packet::Packet;
use crate::property::DynamicProperty;
use crate::time::TimeStamp;
use crate::value::{Value, ValueKind};

/// Named property slots of a [`DynamicObject`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertySlot {
    Position,
    Orientation,
    Color,
    Scale,
}

impl PropertySlot {
    pub const ALL: [PropertySlot; 4] = [
        PropertySlot::Position,
        PropertySlot::Orientation,
        PropertySlot::Color,
        PropertySlot::Scale,
    ];

    /// Packet field feeding this slot.
    pub fn field(&self) -> &'static str {
        match self {
            PropertySlot::Position => "position",
            PropertySlot::Orientation => "orientation",
            PropertySlot::Color => "color",
            PropertySlot::Scale => "scale",
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            PropertySlot::Position => Cartesian3Adapter::KIND,
            PropertySlot::Orientation => QuaternionAdapter::KIND,
            PropertySlot::Color => ColorAdapter::KIND,
            PropertySlot::Scale => ScalarAdapter::KIND,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DynamicObject {
    id: String,
    pub position: Option<DynamicProperty<Cartesian3Adapter>>,
    pub orientation: Option<DynamicProperty<QuaternionAdapter>>,
    pub color: Option<DynamicProperty<ColorAdapter>>,
    pub scale: Option<DynamicProperty<ScalarAdapter>>,
    /// Unset means always available.
    pub availability: Option<TimeInterval>,
}

/// Feed every packet under `data` (one packet or an array of them) into
/// `slot`. Returns whether the slot was created.
fn process_slot<A: ValueAdapter + Default>(
    slot: &mut Option<DynamicProperty<A>>,
    data: &JsonValue,
) -> Result<bool, TemporalError> {
    let mut created = false;
    for packet in Packet::from_json_many(data)? {
        created |= DynamicProperty::process_packet(slot, &packet, None)?;
    }
    Ok(created)
}

impl DynamicObject {
    pub fn new(id: impl Into<String>) -> Result<Self, TemporalError> {
        let id = id.into();
        if id.is_empty() {
            return Err(TemporalError::malformed("object id is required"));
        }
        Ok(Self {
            id,
            position: None,
            orientation: None,
            color: None,
            scale: None,
            availability: None,
        })
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the object exists at `time`.
    #[inline]
    pub fn is_available(&self, time: TimeStamp) -> bool {
        self.availability
            .as_ref()
            .map_or(true, |interval| interval.contains(time))
    }

    /// Route the fields of an object packet to their slots.
    ///
    /// Returns true if the packet created a property or carried an
    /// availability. Every slot is attempted; the first failure is returned
    /// after the others have been applied.
    pub fn process_packet(&mut self, packet: &JsonValue) -> Result<bool, TemporalError> {
        let JsonValue::Object(fields) = packet else {
            return Err(TemporalError::malformed(format!(
                "object packet must be a JSON object, got {packet}"
            )));
        };

        let mut changed = false;
        let mut first_error = None;
        for slot in PropertySlot::ALL {
            let Some(data) = fields.get(slot.field()) else {
                continue;
            };
            let outcome = match slot {
                PropertySlot::Position => process_slot(&mut self.position, data),
                PropertySlot::Orientation => process_slot(&mut self.orientation, data),
                PropertySlot::Color => process_slot(&mut self.color, data),
                PropertySlot::Scale => process_slot(&mut self.scale, data),
            };
            match outcome {
                Ok(created) => {
                    if created {
                        debug!("object {}: created {:?}", self.id, slot);
                    }
                    changed |= created;
                }
                Err(err) => {
                    warn!("object {}: {:?} packet dropped: {err}", self.id, slot);
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }

        if let Some(availability) = fields.get("availability") {
            changed = true;
            match availability.as_str().map(TimeInterval::from_iso8601) {
                Some(Ok(interval)) => self.availability = Some(interval),
                Some(Err(err)) => warn!("object {}: ignoring availability: {err}", self.id),
                None => warn!("object {}: availability must be a string", self.id),
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(changed),
        }
    }

    /// Fill every empty slot of `self` from `other`.
    pub fn merge_properties(&mut self, other: &DynamicObject) {
        if self.position.is_none() {
            self.position = other.position.clone();
        }
        if self.orientation.is_none() {
            self.orientation = other.orientation.clone();
        }
        if self.color.is_none() {
            self.color = other.color.clone();
        }
        if self.scale.is_none() {
            self.scale = other.scale.clone();
        }
        if self.availability.is_none() {
            self.availability = other.availability.clone();
        }
    }

    /// Clear every slot and the availability.
    pub fn undefine_properties(&mut self) {
        self.position = None;
        self.orientation = None;
        self.color = None;
        self.scale = None;
        self.availability = None;
    }

    #[inline]
    pub fn has(&self, slot: PropertySlot) -> bool {
        match slot {
            PropertySlot::Position => self.position.is_some(),
            PropertySlot::Orientation => self.orientation.is_some(),
            PropertySlot::Color => self.color.is_some(),
            PropertySlot::Scale => self.scale.is_some(),
        }
    }

    /// Value of `slot` at `time`. Availability is not consulted.
    pub fn value_at(&mut self, slot: PropertySlot, time: TimeStamp) -> Option<Value> {
        match slot {
            PropertySlot::Position => self.position.as_mut()?.value_at(time),
            PropertySlot::Orientation => self.orientation.as_mut()?.value_at(time),
            PropertySlot::Color => self.color.as_mut()?.value_at(time),
            PropertySlot::Scale => self.scale.as_mut()?.value_at(time),
        }
    }
}
