#[cfg(feature = "protobuf")]
mod descriptor;
#[cfg(feature = "protobuf")]
mod pb;
#[cfg(feature = "protobuf")]
mod pb_text;
mod text;
#[cfg(feature = "protobuf")]
mod varint;

#[cfg(feature = "protobuf")]
pub use self::pb::{to_proto, ProtobufEncoder, PROTOBUF_FORMAT};
#[cfg(feature = "protobuf")]
pub use self::pb_text::{ProtobufTextEncoder, PROTOBUF_TEXT_FORMAT};
pub use self::text::{TextEncoder, TEXT_FORMAT};
#[cfg(feature = "protobuf")]
pub use self::varint::write_varint;

use std::io::Write;

use crate::errors::{Error, Result};
use crate::model::MetricFamily;

/// An interface for encoding metric families into an underlying wire protocol.
pub trait Encoder {
    /// `encode` converts a slice of [`MetricFamily`] snapshots into target
    /// format and writes the result to `writer`. This function does not
    /// perform checks on the content of the metric and label names,
    /// i.e. invalid metric or label names will result in invalid output.
    fn encode<W: Write>(&self, _: &[MetricFamily], _: &mut W) -> Result<()>;

    /// `format_type` returns target format.
    fn format_type(&self) -> &str;
}

fn check_metric_family(mf: &MetricFamily) -> Result<()> {
    if mf.name.is_empty() {
        return Err(Error::Msg(format!("MetricFamily has no name: {:?}", mf)));
    }
    Ok(())
}
