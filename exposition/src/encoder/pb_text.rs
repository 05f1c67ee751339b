use std::io::Write;

use prost::Message;
use prost_reflect::text_format::FormatOptions;
use prost_reflect::DynamicMessage;

use crate::errors::Result;
use crate::model::MetricFamily;

use super::descriptor;
use super::pb::to_proto;
use super::Encoder;

/// The protocol buffer text format of metric family. Meant for debugging.
pub const PROTOBUF_TEXT_FORMAT: &str = "application/vnd.google.protobuf; \
                                        proto=io.prometheus.client.MetricFamily; \
                                        encoding=text";

/// An implementation of an [`Encoder`] that builds the same messages as
/// [`ProtobufEncoder`](super::ProtobufEncoder) but prints them in the
/// human-readable protobuf text format, one block per family separated by a
/// newline. There is no length prefix.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProtobufTextEncoder;

impl ProtobufTextEncoder {
    /// Create a new protobuf text encoder.
    pub fn new() -> ProtobufTextEncoder {
        ProtobufTextEncoder
    }

    /// Converts metrics to `String`.
    pub fn encode_to_string(&self, metric_families: &[MetricFamily]) -> Result<String> {
        let messages = metric_families
            .iter()
            .map(to_proto)
            .collect::<Result<Vec<_>>>()?;

        let options = FormatOptions::new().pretty(true);
        let blocks = messages
            .iter()
            .map(|pb| print_to_string(pb, &options))
            .collect::<Result<Vec<_>>>()?;
        Ok(blocks.join("\n"))
    }
}

impl Encoder for ProtobufTextEncoder {
    fn encode<W: Write>(&self, metric_families: &[MetricFamily], writer: &mut W) -> Result<()> {
        let text = self.encode_to_string(metric_families)?;
        writer.write_all(text.as_bytes())?;
        Ok(())
    }

    fn format_type(&self) -> &str {
        PROTOBUF_TEXT_FORMAT
    }
}

/// Print one message in protobuf text format. Every block ends with exactly
/// one newline.
fn print_to_string(pb: &crate::proto::MetricFamily, options: &FormatOptions) -> Result<String> {
    let bytes = pb.encode_to_vec();
    let message = DynamicMessage::decode(descriptor::metric_family()?, bytes.as_slice())?;
    let mut text = message.to_text_format_with_options(options);
    text.truncate(text.trim_end().len());
    text.push('\n');
    Ok(text)
}
