use std::borrow::Cow;
use std::io::{self, Write};

use crate::errors::Result;
use crate::float::format_float;
use crate::labels::{escape_string, render_labels};
use crate::model::{MetricFamily, Sample};

use super::{check_metric_family, Encoder};

/// The text format of metric family.
pub const TEXT_FORMAT: &str = "text/plain; version=0.0.4; charset=utf-8";

/// An implementation of an [`Encoder`] that renders a [`MetricFamily`] snapshot
/// into the text exposition format, version 0.0.4.
///
/// Samples are written in snapshot order. Histogram and summary families are
/// not special-cased: their `_bucket`, `_sum` and `_count` samples are written
/// as plain lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextEncoder;

impl TextEncoder {
    /// Create a new text encoder.
    pub fn new() -> TextEncoder {
        TextEncoder
    }
    /// Appends metrics to a given `String` buffer.
    ///
    /// This is a convenience wrapper around `<TextEncoder as Encoder>::encode`.
    pub fn encode_utf8(&self, metric_families: &[MetricFamily], buf: &mut String) -> Result<()> {
        // Note: it's important to *not* re-validate UTF8-validity for the
        // entirety of `buf`. Otherwise, repeatedly appending metrics to the
        // same `buf` will lead to quadratic behavior. That's why we use
        // `WriteUtf8` abstraction to skip the validation.
        self.encode_impl(metric_families, &mut StringBuf(buf))?;
        Ok(())
    }
    /// Converts metrics to `String`.
    ///
    /// This is a convenience wrapper around `<TextEncoder as Encoder>::encode`.
    pub fn encode_to_string(&self, metric_families: &[MetricFamily]) -> Result<String> {
        let mut buf = String::new();
        self.encode_utf8(metric_families, &mut buf)?;
        Ok(buf)
    }

    fn encode_impl(
        &self,
        metric_families: &[MetricFamily],
        writer: &mut dyn WriteUtf8,
    ) -> Result<()> {
        for mf in metric_families {
            // Fail-fast checks.
            check_metric_family(mf)?;

            // Write `# HELP` header.
            let name = mf.name.as_str();
            writer.write_all("# HELP ")?;
            writer.write_all(name)?;
            writer.write_all(" ")?;
            writer.write_all(&escape_string(&mf.help, false))?;
            writer.write_all("\n")?;

            // Write `# TYPE` header.
            writer.write_all("# TYPE ")?;
            writer.write_all(name)?;
            writer.write_all(" ")?;
            writer.write_all(mf.metric_type.as_str())?;
            writer.write_all("\n")?;

            for sample in &mf.samples {
                write_sample(writer, sample)?;
            }
        }

        Ok(())
    }
}

impl Encoder for TextEncoder {
    fn encode<W: Write>(&self, metric_families: &[MetricFamily], writer: &mut W) -> Result<()> {
        self.encode_impl(metric_families, &mut *writer)
    }

    fn format_type(&self) -> &str {
        TEXT_FORMAT
    }
}

/// `write_sample` writes a single sample line in text format to `writer`:
/// the sample name, its sorted and escaped labels, the value and the optional
/// timestamp.
fn write_sample(writer: &mut dyn WriteUtf8, sample: &Sample) -> Result<()> {
    writer.write_all(&sample.name)?;

    label_pairs_to_text(&render_labels(&sample.labels), writer)?;

    writer.write_all(" ")?;
    writer.write_all(&format_float(sample.value))?;

    if let Some(timestamp) = sample.timestamp_ms {
        writer.write_all(" ")?;
        writer.write_all(&timestamp.to_string())?;
    }

    writer.write_all("\n")?;

    Ok(())
}

/// `label_pairs_to_text` writes already escaped label pairs enclosed in
/// '{...}'. An empty slice results in nothing being written.
fn label_pairs_to_text(pairs: &[(&str, Cow<'_, str>)], writer: &mut dyn WriteUtf8) -> Result<()> {
    if pairs.is_empty() {
        return Ok(());
    }

    let mut separator = "{";
    for (name, value) in pairs {
        writer.write_all(separator)?;
        writer.write_all(name)?;
        writer.write_all("=\"")?;
        writer.write_all(value)?;
        writer.write_all("\"")?;

        separator = ",";
    }

    writer.write_all("}")?;

    Ok(())
}

trait WriteUtf8 {
    fn write_all(&mut self, text: &str) -> io::Result<()>;
}

impl<W: Write> WriteUtf8 for W {
    fn write_all(&mut self, text: &str) -> io::Result<()> {
        Write::write_all(self, text.as_bytes())
    }
}

/// Coherence forbids to impl `WriteUtf8` directly on `String`, need this
/// wrapper as a work-around.
struct StringBuf<'a>(&'a mut String);

impl WriteUtf8 for StringBuf<'_> {
    fn write_all(&mut self, text: &str) -> io::Result<()> {
        self.0.push_str(text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MetricType;

    #[test]
    fn test_text_encoder_gauge() {
        let mf = MetricFamily::new("gg", "A gauge", MetricType::Gauge)
            .with_sample(Sample::new("gg", 17.0));

        let text = TextEncoder::new().encode_to_string(&[mf]).unwrap();
        assert_eq!(text, "# HELP gg A gauge\n# TYPE gg gauge\ngg 17\n");
    }

    #[test]
    fn test_text_encoder_counter_with_labels() {
        let mf = MetricFamily::new("test_counter", "test help", MetricType::Counter)
            .with_sample(
                Sample::new("test_counter", 1.0)
                    .with_label("b", "2")
                    .with_label("a", "1"),
            )
            .with_sample(Sample::new("test_counter", 0.5).with_label("a", "x"));

        let mut writer = Vec::<u8>::new();
        let encoder = TextEncoder::new();
        encoder.encode(&[mf], &mut writer).unwrap();
        assert_eq!(
            String::from_utf8(writer).unwrap(),
            r##"# HELP test_counter test help
# TYPE test_counter counter
test_counter{a="1",b="2"} 1
test_counter{a="x"} 0.5
"##
        );
        assert_eq!(encoder.format_type(), TEXT_FORMAT);
    }

    #[test]
    fn test_text_encoder_escaping() {
        let mf = MetricFamily::new("esc", "line one\nback\\slash \"quoted\"", MetricType::Gauge)
            .with_sample(Sample::new("esc", 1.0).with_label("v", "a\\\n\"b"));

        let text = TextEncoder::new().encode_to_string(&[mf]).unwrap();
        let expected = "# HELP esc line one\\nback\\\\slash \"quoted\"\n\
                        # TYPE esc gauge\n\
                        esc{v=\"a\\\\\\n\\\"b\"} 1\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_text_encoder_histogram_samples_in_order() {
        let mf = MetricFamily::new("request_duration", "The latency", MetricType::Histogram)
            .with_sample(
                Sample::new("request_duration_bucket", 1.0)
                    .with_label("le", "0.5")
                    .with_label("a", "1"),
            )
            .with_sample(
                Sample::new("request_duration_bucket", 2.0)
                    .with_label("le", "+Inf")
                    .with_label("a", "1"),
            )
            .with_sample(Sample::new("request_duration_sum", 1.25).with_label("a", "1"))
            .with_sample(Sample::new("request_duration_count", 2.0).with_label("a", "1"));

        let text = TextEncoder::new().encode_to_string(&[mf]).unwrap();
        assert_eq!(
            text,
            r##"# HELP request_duration The latency
# TYPE request_duration histogram
request_duration_bucket{a="1",le="0.5"} 1
request_duration_bucket{a="1",le="+Inf"} 2
request_duration_sum{a="1"} 1.25
request_duration_count{a="1"} 2
"##
        );
    }

    #[test]
    fn test_text_encoder_summary_untyped_and_timestamp() {
        let summary = MetricFamily::new("rpc", "RPC latency", MetricType::Summary)
            .with_sample(Sample::new("rpc", 0.25).with_label("quantile", 0.5))
            .with_sample(Sample::new("rpc_sum", 146.0))
            .with_sample(Sample::new("rpc_count", 2.0));
        let untyped = MetricFamily::new("raw", "", MetricType::Untyped)
            .with_sample(Sample::new("raw", f64::NAN).with_timestamp_ms(1_395_066_363_000));

        let text = TextEncoder::new()
            .encode_to_string(&[summary, untyped])
            .unwrap();
        assert_eq!(
            text,
            r##"# HELP rpc RPC latency
# TYPE rpc summary
rpc{quantile="0.5"} 0.25
rpc_sum 146
rpc_count 2
# HELP raw 
# TYPE raw untyped
raw NaN 1395066363000
"##
        );
    }

    #[test]
    fn test_text_encoder_line_counts() {
        let mut mf = MetricFamily::new("many", "Many samples", MetricType::Counter);
        for i in 0..5 {
            mf.push(Sample::new("many", i as f64).with_label("idx", i));
        }
        let text = TextEncoder::new().encode_to_string(&[mf]).unwrap();

        assert!(text.ends_with('\n'));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.iter().filter(|l| l.starts_with("# HELP")).count(), 1);
        assert_eq!(lines.iter().filter(|l| l.starts_with("# TYPE")).count(), 1);
        assert_eq!(lines.iter().filter(|l| !l.starts_with('#')).count(), 5);
    }

    #[test]
    fn test_text_encoder_empty_family_and_snapshot() {
        let encoder = TextEncoder::new();
        let empty = MetricFamily::new("idle", "Nothing yet", MetricType::Counter);
        assert_eq!(
            encoder.encode_to_string(&[empty]).unwrap(),
            "# HELP idle Nothing yet\n# TYPE idle counter\n"
        );
        assert_eq!(encoder.encode_to_string(&[]).unwrap(), "");

        let nameless = MetricFamily::new("", "help", MetricType::Gauge);
        assert!(encoder.encode_to_string(&[nameless]).is_err());
    }

    #[test]
    fn test_text_encoder_empty_help_keeps_separator() {
        let mf = MetricFamily::new("raw", "", MetricType::Gauge);
        let text = TextEncoder::new().encode_to_string(&[mf]).unwrap();
        assert_eq!(text, "# HELP raw \n# TYPE raw gauge\n");
    }

    #[test]
    fn test_encode_utf8_appends() {
        let mf = MetricFamily::new("up", "Up", MetricType::Gauge).with_sample(Sample::new("up", 1.0));
        let encoder = TextEncoder::new();
        let mut buf = String::from("# prefix\n");
        encoder.encode_utf8(&[mf.clone()], &mut buf).unwrap();
        encoder.encode_utf8(&[mf], &mut buf).unwrap();
        assert_eq!(
            buf,
            "# prefix\n# HELP up Up\n# TYPE up gauge\nup 1\n# HELP up Up\n# TYPE up gauge\nup 1\n"
        );
    }
}
