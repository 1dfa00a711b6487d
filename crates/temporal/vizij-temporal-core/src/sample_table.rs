//! Payload of one interval: a constant or a sorted sample series plus its
//! interpolation settings.

use log::debug;

use crate::config::Config;
use crate::ids::TableId;
use crate::interp::{InterpRegistry, InterpolationAlgorithm};
use crate::merge::{merge_new_samples, MergeReport};
use crate::packet::SampleBatch;
use crate::time::TimeStamp;

#[derive(Debug, Clone, PartialEq)]
pub enum TableData {
    /// One packed value for the whole interval.
    Constant(Vec<f64>),
    /// `times` strictly increasing; `values` holds `times.len() * width` numbers.
    Sampled {
        times: Vec<TimeStamp>,
        values: Vec<f64>,
    },
}

#[derive(Debug, Clone)]
pub struct SampleTable {
    id: TableId,
    data: TableData,
    algorithm: InterpolationAlgorithm,
    degree: u32,
    number_of_points: usize,
}

impl SampleTable {
    /// Empty sampled table using the configured defaults.
    pub fn new(id: TableId, cfg: &Config, registry: &InterpRegistry) -> Self {
        let degree = cfg.default_degree.max(1);
        Self {
            id,
            data: TableData::Sampled {
                times: Vec::new(),
                values: Vec::new(),
            },
            algorithm: cfg.default_algorithm,
            degree,
            number_of_points: registry
                .get(cfg.default_algorithm)
                .required_point_count(degree),
        }
    }

    #[inline]
    pub fn id(&self) -> TableId {
        self.id
    }

    /// Copy of this table under a new identity.
    pub fn fork(&self, id: TableId) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }

    #[inline]
    pub fn data(&self) -> &TableData {
        &self.data
    }

    #[inline]
    pub fn is_sampled(&self) -> bool {
        matches!(self.data, TableData::Sampled { .. })
    }

    pub fn constant(&self) -> Option<&[f64]> {
        match &self.data {
            TableData::Constant(values) => Some(values),
            TableData::Sampled { .. } => None,
        }
    }

    /// Sample times; empty for a constant table.
    pub fn times(&self) -> &[TimeStamp] {
        match &self.data {
            TableData::Sampled { times, .. } => times,
            TableData::Constant(_) => &[],
        }
    }

    /// Packed sample values, or the constant.
    pub fn values(&self) -> &[f64] {
        match &self.data {
            TableData::Sampled { values, .. } => values,
            TableData::Constant(values) => values,
        }
    }

    /// Number of samples (0 for a constant).
    #[inline]
    pub fn len(&self) -> usize {
        self.times().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        match &self.data {
            TableData::Sampled { times, .. } => times.is_empty(),
            TableData::Constant(values) => values.is_empty(),
        }
    }

    #[inline]
    pub fn algorithm(&self) -> InterpolationAlgorithm {
        self.algorithm
    }

    #[inline]
    pub fn degree(&self) -> u32 {
        self.degree
    }

    /// Window size used by queries.
    #[inline]
    pub fn number_of_points(&self) -> usize {
        self.number_of_points
    }

    /// Change algorithm and/or degree. Returns true when the window shape
    /// changed, which makes the next query resize its scratch buffers.
    pub fn set_interpolation(
        &mut self,
        algorithm: Option<InterpolationAlgorithm>,
        degree: Option<u32>,
        registry: &InterpRegistry,
    ) -> bool {
        if algorithm.is_none() && degree.is_none() {
            return false;
        }
        let algorithm = algorithm.unwrap_or(self.algorithm);
        let degree = degree.unwrap_or(self.degree).max(1);
        let number_of_points = registry.get(algorithm).required_point_count(degree);
        let reshaped = number_of_points != self.number_of_points;
        if algorithm != self.algorithm || degree != self.degree {
            debug!(
                "table {:?}: interpolation {} degree {} -> {} degree {} ({} points)",
                self.id, self.algorithm, self.degree, algorithm, degree, number_of_points
            );
        }
        self.algorithm = algorithm;
        self.degree = degree;
        self.number_of_points = number_of_points;
        reshaped
    }

    /// Replace the contents with a constant.
    pub fn set_constant(&mut self, value: Vec<f64>) {
        self.data = TableData::Constant(value);
    }

    /// Merge new samples, first turning a constant table into an empty
    /// sampled one.
    pub fn merge(&mut self, epoch: Option<TimeStamp>, batch: &SampleBatch) -> MergeReport {
        if let TableData::Constant(_) = self.data {
            self.data = TableData::Sampled {
                times: Vec::new(),
                values: Vec::new(),
            };
        }
        if let TableData::Sampled { times, values } = &mut self.data {
            return merge_new_samples(epoch, times, values, batch);
        }
        MergeReport::default()
    }
}
