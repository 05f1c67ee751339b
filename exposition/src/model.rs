//! Read-only snapshot types handed to the encoders.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, Result};

/// The declared type of a [`MetricFamily`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricType {
    /// A value that only ever goes up.
    Counter,
    /// A value that can go up and down.
    Gauge,
    /// Quantiles plus `_sum` and `_count`.
    Summary,
    /// Cumulative `_bucket` samples plus `_sum` and `_count`.
    Histogram,
    /// A value of unknown semantics. Only the text format can express it.
    Untyped,
}

impl MetricType {
    /// The lowercase name used on `# TYPE` lines.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
            MetricType::Summary => "summary",
            MetricType::Histogram => "histogram",
            MetricType::Untyped => "untyped",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = Error;

    fn from_str(s: &str) -> Result<MetricType> {
        match s {
            "counter" => Ok(MetricType::Counter),
            "gauge" => Ok(MetricType::Gauge),
            "summary" => Ok(MetricType::Summary),
            "histogram" => Ok(MetricType::Histogram),
            "untyped" => Ok(MetricType::Untyped),
            other => Err(Error::UnsupportedMetricType(other.to_owned())),
        }
    }
}

/// A single observation: a sample name, its labels and a value.
///
/// Histogram and summary families carry several samples that share the
/// family name and differ by suffix (`_bucket`, `_sum`, `_count`) and by a
/// distinguishing label (`le`, `quantile`).
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Full sample name, including any suffix.
    pub name: String,
    /// Label names to values. Order is irrelevant, rendering sorts by name.
    pub labels: HashMap<String, String>,
    /// The sample value.
    pub value: f64,
    /// Optional timestamp in milliseconds since the epoch.
    pub timestamp_ms: Option<i64>,
}

impl Sample {
    /// Create a [`Sample`] without labels.
    pub fn new<S: Into<String>>(name: S, value: f64) -> Sample {
        Sample {
            name: name.into(),
            labels: HashMap::new(),
            value,
            timestamp_ms: None,
        }
    }

    /// Add a label. The value is coerced to its string form.
    pub fn with_label<K: Into<String>, V: ToString>(mut self, name: K, value: V) -> Sample {
        self.labels.insert(name.into(), value.to_string());
        self
    }

    /// Add every label from `labels`.
    pub fn with_labels<I, K, V>(mut self, labels: I) -> Sample
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        for (k, v) in labels {
            self.labels.insert(k.into(), v.to_string());
        }
        self
    }

    /// Attach a timestamp in milliseconds.
    pub fn with_timestamp_ms(mut self, timestamp_ms: i64) -> Sample {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }

    /// The label value for `name`, if any.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels.get(name).map(String::as_str)
    }
}

/// All samples of one logical metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    /// Family name.
    pub name: String,
    /// Help text.
    pub help: String,
    /// Declared type.
    pub metric_type: MetricType,
    /// Samples in exposition order.
    pub samples: Vec<Sample>,
}

impl MetricFamily {
    /// Create an empty [`MetricFamily`].
    pub fn new<S1: Into<String>, S2: Into<String>>(
        name: S1,
        help: S2,
        metric_type: MetricType,
    ) -> MetricFamily {
        MetricFamily {
            name: name.into(),
            help: help.into(),
            metric_type,
            samples: Vec::new(),
        }
    }

    /// Append a sample.
    pub fn with_sample(mut self, sample: Sample) -> MetricFamily {
        self.samples.push(sample);
        self
    }

    /// Append a sample in place.
    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }
}
