use std::collections::HashMap;

use prometheus_exposition::{Encoder, Error, Format, MetricFamily, MetricType, Sample};

fn snapshot() -> Vec<MetricFamily> {
    let requests = MetricFamily::new("http_requests_total", "Total requests.", MetricType::Counter)
        .with_sample(
            Sample::new("http_requests_total", 1027.0)
                .with_label("method", "post")
                .with_label("code", 200),
        )
        .with_sample(
            Sample::new("http_requests_total", 3.0)
                .with_label("method", "post")
                .with_label("code", 400),
        );

    let mut latency = MetricFamily::new(
        "http_request_duration_seconds",
        "A histogram of the request duration.",
        MetricType::Histogram,
    );
    for (le, count) in &[("0.05", 24054.0), ("0.1", 33444.0), ("0.5", 129389.0), ("+Inf", 144320.0)] {
        latency.push(Sample::new("http_request_duration_seconds_bucket", *count).with_label("le", le));
    }
    latency.push(Sample::new("http_request_duration_seconds_sum", 53423.0));
    latency.push(Sample::new("http_request_duration_seconds_count", 144320.0));

    let rpc = MetricFamily::new("rpc_duration_seconds", "RPC latency.", MetricType::Summary)
        .with_sample(Sample::new("rpc_duration_seconds", 3102.0).with_label("quantile", "0.01"))
        .with_sample(Sample::new("rpc_duration_seconds", 76656.0).with_label("quantile", "0.99"))
        .with_sample(Sample::new("rpc_duration_seconds_sum", 17560473.0))
        .with_sample(Sample::new("rpc_duration_seconds_count", 2693.0));

    vec![requests, latency, rpc]
}

#[test]
fn test_negotiated_text_output() {
    let mut headers = HashMap::new();
    headers.insert("Accept", "text/plain; version=0.0.4");
    let format = Format::from_headers(&headers);
    assert_eq!(format, Format::Text);

    let body = String::from_utf8(format.encode_to_vec(&snapshot()).unwrap()).unwrap();
    assert_eq!(
        body,
        r##"# HELP http_requests_total Total requests.
# TYPE http_requests_total counter
http_requests_total{code="200",method="post"} 1027
http_requests_total{code="400",method="post"} 3
# HELP http_request_duration_seconds A histogram of the request duration.
# TYPE http_request_duration_seconds histogram
http_request_duration_seconds_bucket{le="0.05"} 24054
http_request_duration_seconds_bucket{le="0.1"} 33444
http_request_duration_seconds_bucket{le="0.5"} 129389
http_request_duration_seconds_bucket{le="+Inf"} 144320
http_request_duration_seconds_sum 53423
http_request_duration_seconds_count 144320
# HELP rpc_duration_seconds RPC latency.
# TYPE rpc_duration_seconds summary
rpc_duration_seconds{quantile="0.01"} 3102
rpc_duration_seconds{quantile="0.99"} 76656
rpc_duration_seconds_sum 1.7560473e+07
rpc_duration_seconds_count 2693
"##
    );
}

#[cfg(feature = "protobuf")]
#[test]
fn test_repeated_encodes_are_identical() {
    let snapshot = snapshot();
    let formats = vec![Format::Text, Format::Protobuf, Format::ProtobufText];
    for format in formats {
        let first = format.encode_to_vec(&snapshot).unwrap();
        let second = format.encode_to_vec(&snapshot).unwrap();
        assert_eq!(first, second, "{} output differs", format);
    }
}

#[cfg(feature = "protobuf")]
#[test]
fn test_negotiated_protobuf_stream() {
    use prometheus_exposition::proto::{self, metric};
    use prost::Message;

    let format = Format::from_accept(Some(
        "application/vnd.google.protobuf;proto=io.prometheus.client.MetricFamily;encoding=delimited",
    ));
    assert_eq!(format, Format::Protobuf);
    assert_eq!(format.format_type(), prometheus_exposition::PROTOBUF_FORMAT);

    let body = format.encode_to_vec(&snapshot()).unwrap();
    let mut buf = body.as_slice();
    let mut families = Vec::new();
    while !buf.is_empty() {
        families.push(proto::MetricFamily::decode_length_delimited(&mut buf).unwrap());
    }

    let names: Vec<&str> = families.iter().map(|mf| mf.name()).collect();
    assert_eq!(
        names,
        vec![
            "http_requests_total",
            "http_request_duration_seconds",
            "rpc_duration_seconds"
        ]
    );
    assert_eq!(families[0].metric.len(), 2);
    assert_eq!(families[0].metric[0].label[0].name(), "code");

    match &families[1].metric[0].value {
        Some(metric::Value::Histogram(h)) => {
            assert_eq!(h.bucket.len(), 4);
            assert_eq!(h.sample_count, Some(144320));
            assert_eq!(h.bucket[3].upper_bound(), f64::INFINITY);
        }
        other => panic!("expected histogram, got {:?}", other),
    }
    match &families[2].metric[0].value {
        Some(metric::Value::Summary(s)) => {
            assert_eq!(s.sample_count, Some(2693));
            assert_eq!(s.sample_sum, Some(17560473.0));
            assert_eq!(s.quantile.len(), 2);
        }
        other => panic!("expected summary, got {:?}", other),
    }
}

#[cfg(feature = "protobuf")]
#[test]
fn test_unsupported_type_surfaces_error() {
    let mut families = snapshot();
    families.push(MetricFamily::new("legacy", "", MetricType::Untyped).with_sample(Sample::new("legacy", 1.0)));

    assert!(Format::Text.encode_to_vec(&families).is_ok());
    for format in &[Format::Protobuf, Format::ProtobufText] {
        match format.encode_to_vec(&families) {
            Err(Error::UnsupportedMetricType(t)) => assert_eq!(t, "untyped"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}

#[cfg(feature = "protobuf")]
#[test]
fn test_parallel_encodes() {
    let snapshot = std::sync::Arc::new(snapshot());
    let expected = Format::Protobuf.encode_to_vec(&snapshot).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let snapshot = snapshot.clone();
            std::thread::spawn(move || Format::Protobuf.encode_to_vec(&snapshot).unwrap())
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), expected);
    }
}
