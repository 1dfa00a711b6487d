//! Vizij Temporal Core (engine-agnostic)
//!
//! In-memory store for time-varying properties. Packets describe a value over
//! validity intervals, either as a constant or as time-tagged samples that
//! may arrive out of order. Samples are merged into sorted tables in place and
//! queries return the constant, an exact sample, or an interpolated value
//! (linear, Lagrange or Hermite) from a window around the query time.

pub mod adapter;
pub mod collection;
pub mod config;
pub mod entity;
pub mod error;
pub mod ids;
pub mod interp;
pub mod interval;
pub mod merge;
pub mod packet;
pub mod property;
pub mod sample_table;
pub mod sampling;
pub mod scratch;
pub mod time;
pub mod value;

// Re-exports for consumers
pub use adapter::{Cartesian3Adapter, ColorAdapter, QuaternionAdapter, ScalarAdapter, ValueAdapter};
pub use collection::{Overlay, TimeIntervalCollection};
pub use config::Config;
pub use entity::{DynamicObject, PropertySlot};
pub use error::TemporalError;
pub use ids::TableId;
pub use interp::{InterpRegistry, InterpolationAlgorithm, Interpolator, BUILTIN_INTERPOLATORS};
pub use interval::TimeInterval;
pub use merge::{merge_new_samples, MergeReport};
pub use packet::{Packet, RawInterval, SampleBatch};
pub use property::{DynamicProperty, IngestReport};
pub use sample_table::{SampleTable, TableData};
pub use sampling::sample_table;
pub use scratch::Scratch;
pub use time::{TimeDesignator, TimeStamp};
pub use value::{Cartesian3, Color, Quaternion, Value, ValueKind};
