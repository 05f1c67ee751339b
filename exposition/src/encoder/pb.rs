use std::collections::HashMap;
use std::io::Write;

use prost::Message;

use crate::errors::{Error, Result};
use crate::labels::{escape_string, sorted_labels, BUCKET_LABEL, QUANTILE_LABEL};
use crate::model::{MetricFamily, MetricType, Sample};
use crate::proto::{self, metric};

use super::varint::write_varint;
use super::{check_metric_family, Encoder};

/// The protocol buffer format of metric family.
pub const PROTOBUF_FORMAT: &str = "application/vnd.google.protobuf; \
                                   proto=io.prometheus.client.MetricFamily; \
                                   encoding=delimited";

const BUCKET_SUFFIX: &str = "_bucket";
const COUNT_SUFFIX: &str = "_count";
const SUM_SUFFIX: &str = "_sum";

/// An implementation of an [`Encoder`] that converts a [`MetricFamily`]
/// snapshot into a stream of varint length-delimited
/// `io.prometheus.client.MetricFamily` messages.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProtobufEncoder;

impl ProtobufEncoder {
    /// Create a new protobuf encoder.
    pub fn new() -> ProtobufEncoder {
        ProtobufEncoder
    }
}

impl Encoder for ProtobufEncoder {
    fn encode<W: Write>(&self, metric_families: &[MetricFamily], writer: &mut W) -> Result<()> {
        // Build every message first so a failing family leaves `writer` untouched.
        let messages = metric_families
            .iter()
            .map(to_proto)
            .collect::<Result<Vec<_>>>()?;
        for mf in &messages {
            write_length_delimited(mf, writer)?;
        }
        Ok(())
    }

    fn format_type(&self) -> &str {
        PROTOBUF_FORMAT
    }
}

fn write_length_delimited<W: Write>(mf: &proto::MetricFamily, writer: &mut W) -> Result<()> {
    let mut body = Vec::with_capacity(mf.encoded_len());
    mf.encode(&mut body)?;
    write_varint(body.len() as u64, writer)?;
    writer.write_all(&body)?;
    Ok(())
}

/// Build the `io.prometheus.client.MetricFamily` message for one family.
///
/// Counters and gauges yield one metric per sample. Summaries and histograms
/// are folded into a single metric assembled from their `_sum`, `_count` and
/// `_bucket`/quantile samples. Untyped families cannot be expressed and fail
/// with [`Error::UnsupportedMetricType`].
pub fn to_proto(mf: &MetricFamily) -> Result<proto::MetricFamily> {
    check_metric_family(mf)?;

    let (metric_type, metrics) = match mf.metric_type {
        MetricType::Counter => (
            proto::MetricType::Counter,
            regular_metrics(mf, |value| {
                metric::Value::Counter(proto::Counter { value: Some(value) })
            }),
        ),
        MetricType::Gauge => (
            proto::MetricType::Gauge,
            regular_metrics(mf, |value| {
                metric::Value::Gauge(proto::Gauge { value: Some(value) })
            }),
        ),
        MetricType::Summary => (proto::MetricType::Summary, vec![summary_metric(mf)]),
        MetricType::Histogram => (proto::MetricType::Histogram, vec![histogram_metric(mf)?]),
        MetricType::Untyped => {
            return Err(Error::UnsupportedMetricType(mf.metric_type.to_string()));
        }
    };

    Ok(proto::MetricFamily {
        name: Some(mf.name.clone()),
        help: Some(mf.help.clone()),
        r#type: Some(metric_type as i32),
        metric: metrics,
    })
}

/// Label values carry the text format's backslash and newline escapes, but
/// not its quote escape.
fn label_pairs(labels: &HashMap<String, String>, exclude: &[&str]) -> Vec<proto::LabelPair> {
    sorted_labels(labels, exclude)
        .into_iter()
        .map(|(name, value)| proto::LabelPair {
            name: Some(name.to_owned()),
            value: Some(escape_string(value, false).into_owned()),
        })
        .collect()
}

fn regular_metrics<F>(mf: &MetricFamily, value: F) -> Vec<proto::Metric>
where
    F: Fn(f64) -> metric::Value,
{
    mf.samples
        .iter()
        .map(|s| proto::Metric {
            label: label_pairs(&s.labels, &[]),
            timestamp_ms: s.timestamp_ms,
            value: Some(value(s.value)),
        })
        .collect()
}

fn summary_metric(mf: &MetricFamily) -> proto::Metric {
    let mut m = proto::Metric::default();
    let mut summary = proto::Summary {
        sample_count: Some(0),
        sample_sum: Some(0.0),
        quantile: Vec::new(),
    };

    for s in &mf.samples {
        if s.name.ends_with(COUNT_SUFFIX) {
            summary.sample_count = Some(s.value as u64);
        } else if s.name.ends_with(SUM_SUFFIX) {
            summary.sample_sum = Some(s.value);
            take_labels(&mut m, s, QUANTILE_LABEL);
        } else if let Some(quantile) = s
            .label(QUANTILE_LABEL)
            .and_then(|q| q.parse::<f64>().ok())
        {
            summary.quantile.push(proto::Quantile {
                quantile: Some(quantile),
                value: Some(s.value),
            });
        } else {
            debug!("{}: skipping summary sample {}", mf.name, s.name);
        }
    }

    m.value = Some(metric::Value::Summary(summary));
    m
}

fn histogram_metric(mf: &MetricFamily) -> Result<proto::Metric> {
    let mut m = proto::Metric::default();
    let mut histogram = proto::Histogram {
        sample_count: Some(0),
        sample_sum: Some(0.0),
        bucket: Vec::new(),
    };

    for s in &mf.samples {
        if s.name.ends_with(BUCKET_SUFFIX) {
            histogram.bucket.push(proto::Bucket {
                cumulative_count: Some(s.value as u64),
                upper_bound: Some(upper_bound(s)?),
            });
        } else if s.name.ends_with(COUNT_SUFFIX) {
            histogram.sample_count = Some(s.value as u64);
        } else if s.name.ends_with(SUM_SUFFIX) {
            histogram.sample_sum = Some(s.value);
            take_labels(&mut m, s, BUCKET_LABEL);
        } else {
            debug!("{}: skipping histogram sample {}", mf.name, s.name);
        }
    }

    m.value = Some(metric::Value::Histogram(histogram));
    Ok(m)
}

/// The `_sum` sample supplies the folded metric's labels and timestamp.
fn take_labels(m: &mut proto::Metric, s: &Sample, suffix_label: &str) {
    m.label = label_pairs(&s.labels, &[suffix_label]);
    m.timestamp_ms = s.timestamp_ms;
}

fn upper_bound(s: &Sample) -> Result<f64> {
    let bound = s.label(BUCKET_LABEL).unwrap_or_default();
    let parsed = match bound {
        "+Inf" | "Inf" => Some(f64::INFINITY),
        "-Inf" => Some(f64::NEG_INFINITY),
        other => other.parse::<f64>().ok(),
    };
    parsed.ok_or_else(|| Error::InvalidBucketBound {
        metric: s.name.clone(),
        bound: bound.to_owned(),
    })
}
