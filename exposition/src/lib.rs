/*!
Prometheus exposition codecs.

Renders a read-only snapshot of metric families into the text exposition
format (version 0.0.4) or into a stream of length-delimited
`io.prometheus.client.MetricFamily` protobuf messages, and picks one of them
from a client's `Accept` header.

```
use prometheus_exposition::{Format, MetricFamily, MetricType, Sample};

let snapshot = vec![
    MetricFamily::new("gg", "A gauge", MetricType::Gauge).with_sample(Sample::new("gg", 17.0)),
];

let format = Format::from_accept(Some("text/plain; version=0.0.4"));
let body = format.encode_to_vec(&snapshot).unwrap();
assert_eq!(format.content_type(), "text/plain; version=0.0.4; charset=utf-8");
assert_eq!(body, b"# HELP gg A gauge\n# TYPE gg gauge\ngg 17\n".to_vec());
```
*/

#![allow(clippy::new_without_default, clippy::new_ret_no_self)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

#[cfg(feature = "protobuf")]
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

/// Protocol buffers format of metrics.
#[cfg(feature = "protobuf")]
#[allow(missing_docs, missing_debug_implementations)]
#[rustfmt::skip]
#[path = "../proto/proto_model.rs"]
pub mod proto;

mod encoder;
mod errors;
mod float;
mod format;
pub mod labels;
mod model;

pub use self::encoder::Encoder;
#[cfg(feature = "protobuf")]
pub use self::encoder::{to_proto, write_varint, ProtobufEncoder, ProtobufTextEncoder};
#[cfg(feature = "protobuf")]
pub use self::encoder::{PROTOBUF_FORMAT, PROTOBUF_TEXT_FORMAT};
pub use self::encoder::{TextEncoder, TEXT_FORMAT};
pub use self::errors::{Error, Result};
pub use self::float::format_float;
pub use self::format::Format;
pub use self::model::{MetricFamily, MetricType, Sample};
