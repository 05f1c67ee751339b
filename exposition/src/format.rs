//! Selecting an exposition format from a client's `Accept` header.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::io::Write;
use std::str::FromStr;

use crate::encoder::{Encoder, TextEncoder, TEXT_FORMAT};
#[cfg(feature = "protobuf")]
use crate::encoder::{ProtobufEncoder, ProtobufTextEncoder, PROTOBUF_FORMAT, PROTOBUF_TEXT_FORMAT};
use crate::errors::{Error, Result};
use crate::model::MetricFamily;

/// Header names checked for the client's preference, in order.
const ACCEPT_HEADERS: [&str; 3] = ["accept", "Accept", "ACCEPT"];

#[cfg(feature = "protobuf")]
const PROTOBUF_MEDIA_TYPE: &str = "application/vnd.google.protobuf";
#[cfg(feature = "protobuf")]
const PROTOBUF_PROTO: &str = "proto=io.prometheus.client.metricfamily";
#[cfg(feature = "protobuf")]
const ENCODING_TEXT: &str = "encoding=text";

/// One of the exposition formats this crate can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Text exposition format, version 0.0.4. The default.
    Text,
    /// Varint length-delimited `io.prometheus.client.MetricFamily` messages.
    #[cfg(feature = "protobuf")]
    Protobuf,
    /// Protobuf text format, for debugging.
    #[cfg(feature = "protobuf")]
    ProtobufText,
}

impl Default for Format {
    fn default() -> Format {
        Format::Text
    }
}

impl Format {
    /// Select a format from a header map. The first of `accept`, `Accept` and
    /// `ACCEPT` that is present is consulted; without one the text format is
    /// returned.
    pub fn from_headers<K, V, S>(headers: &HashMap<K, V, S>) -> Format
    where
        K: Borrow<str> + Hash + Eq,
        V: AsRef<str>,
        S: BuildHasher,
    {
        let accept = ACCEPT_HEADERS.iter().find_map(|name| headers.get(*name));
        Format::from_accept(accept.map(|v| v.as_ref()))
    }

    /// Select a format from an `Accept` header value.
    ///
    /// Token order is irrelevant and q-values are not weighed: the protobuf
    /// formats are chosen when both the protobuf media type and the
    /// `proto=io.prometheus.client.MetricFamily` parameter are present, the
    /// text variant of it when `encoding=text` is present too. Everything
    /// else, including a missing header, selects [`Format::Text`].
    pub fn from_accept(accept: Option<&str>) -> Format {
        let accept = match accept {
            Some(accept) => accept,
            None => {
                debug!("no accept header, using {}", Format::Text);
                return Format::Text;
            }
        };

        let format = AcceptPreference::parse(accept).select();
        debug!("accept {:?} negotiated to {}", accept, format);
        format
    }

    /// The `Content-Type` header value of the format.
    pub fn content_type(self) -> &'static str {
        match self {
            Format::Text => TEXT_FORMAT,
            #[cfg(feature = "protobuf")]
            Format::Protobuf => PROTOBUF_FORMAT,
            #[cfg(feature = "protobuf")]
            Format::ProtobufText => PROTOBUF_TEXT_FORMAT,
        }
    }

    /// Encode `metric_families` and return the bytes.
    pub fn encode_to_vec(self, metric_families: &[MetricFamily]) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.encode(metric_families, &mut buf)?;
        Ok(buf)
    }
}

impl Encoder for Format {
    fn encode<W: Write>(&self, metric_families: &[MetricFamily], writer: &mut W) -> Result<()> {
        match self {
            Format::Text => TextEncoder::new().encode(metric_families, writer),
            #[cfg(feature = "protobuf")]
            Format::Protobuf => ProtobufEncoder::new().encode(metric_families, writer),
            #[cfg(feature = "protobuf")]
            Format::ProtobufText => ProtobufTextEncoder::new().encode(metric_families, writer),
        }
    }

    fn format_type(&self) -> &str {
        self.content_type()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Text => "text",
            #[cfg(feature = "protobuf")]
            Format::Protobuf => "protobuf",
            #[cfg(feature = "protobuf")]
            Format::ProtobufText => "protobuf-text",
        };
        f.write_str(name)
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Format> {
        match s {
            "text" => Ok(Format::Text),
            #[cfg(feature = "protobuf")]
            "protobuf" => Ok(Format::Protobuf),
            #[cfg(feature = "protobuf")]
            "protobuf-text" => Ok(Format::ProtobufText),
            other => Err(Error::Msg(format!("unknown exposition format: {}", other))),
        }
    }
}

/// The tokens of an `Accept` value, split on `;` and `,`, trimmed and
/// lowercased. Only used for membership tests.
#[derive(Debug)]
struct AcceptPreference {
    tokens: Vec<String>,
}

impl AcceptPreference {
    fn parse(value: &str) -> AcceptPreference {
        let tokens = value
            .split(|c: char| c == ';' || c == ',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();
        AcceptPreference { tokens }
    }

    #[cfg(feature = "protobuf")]
    fn has(&self, marker: &str) -> bool {
        self.tokens.iter().any(|t| t.contains(marker))
    }

    #[cfg(feature = "protobuf")]
    fn select(&self) -> Format {
        if self.has(PROTOBUF_MEDIA_TYPE) && self.has(PROTOBUF_PROTO) {
            if self.has(ENCODING_TEXT) {
                Format::ProtobufText
            } else {
                Format::Protobuf
            }
        } else {
            Format::Text
        }
    }

    #[cfg(not(feature = "protobuf"))]
    fn select(&self) -> Format {
        Format::Text
    }
}
