//! Runtime descriptor of `proto/proto_model.proto`, needed to print the
//! prost messages in protobuf text format.

use prost_reflect::{DescriptorPool, MessageDescriptor};
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, OneofDescriptorProto,
};

use crate::errors::{Error, Result};

const PACKAGE: &str = "io.prometheus.client";

lazy_static! {
    static ref METRIC_FAMILY: std::result::Result<MessageDescriptor, String> =
        build_metric_family_descriptor();
}

/// Descriptor of `io.prometheus.client.MetricFamily`.
pub fn metric_family() -> Result<MessageDescriptor> {
    METRIC_FAMILY.clone().map_err(Error::Msg)
}

fn build_metric_family_descriptor() -> std::result::Result<MessageDescriptor, String> {
    let mut pool = DescriptorPool::new();
    pool.add_file_descriptor_proto(file_descriptor())
        .map_err(|e| format!("invalid proto model descriptor: {}", e))?;
    let name = format!("{}.MetricFamily", PACKAGE);
    pool.get_message_by_name(&name)
        .ok_or_else(|| format!("{} missing from descriptor pool", name))
}

fn field(name: &str, number: i32, label: Label, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_owned()),
        number: Some(number),
        label: Some(label as i32),
        r#type: Some(ty as i32),
        ..Default::default()
    }
}

fn typed_field(
    name: &str,
    number: i32,
    label: Label,
    ty: Type,
    type_name: &str,
) -> FieldDescriptorProto {
    FieldDescriptorProto {
        type_name: Some(format!(".{}.{}", PACKAGE, type_name)),
        ..field(name, number, label, ty)
    }
}

fn value_field(name: &str, number: i32, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        oneof_index: Some(0),
        ..typed_field(name, number, Label::Optional, Type::Message, type_name)
    }
}

fn message(name: &str, field: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_owned()),
        field,
        ..Default::default()
    }
}

fn scalar_value(name: &str) -> DescriptorProto {
    message(name, vec![field("value", 1, Label::Optional, Type::Double)])
}

fn file_descriptor() -> FileDescriptorProto {
    let metric_type = EnumDescriptorProto {
        name: Some("MetricType".to_owned()),
        value: ["COUNTER", "GAUGE", "SUMMARY", "UNTYPED", "HISTOGRAM"]
            .iter()
            .enumerate()
            .map(|(number, name)| EnumValueDescriptorProto {
                name: Some((*name).to_owned()),
                number: Some(number as i32),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    };

    let metric = DescriptorProto {
        oneof_decl: vec![OneofDescriptorProto {
            name: Some("value".to_owned()),
            ..Default::default()
        }],
        ..message(
            "Metric",
            vec![
                typed_field("label", 1, Label::Repeated, Type::Message, "LabelPair"),
                value_field("gauge", 2, "Gauge"),
                value_field("counter", 3, "Counter"),
                value_field("summary", 4, "Summary"),
                value_field("untyped", 5, "Untyped"),
                field("timestamp_ms", 6, Label::Optional, Type::Int64),
                value_field("histogram", 7, "Histogram"),
            ],
        )
    };

    FileDescriptorProto {
        name: Some("proto_model.proto".to_owned()),
        package: Some(PACKAGE.to_owned()),
        syntax: Some("proto2".to_owned()),
        enum_type: vec![metric_type],
        message_type: vec![
            message(
                "LabelPair",
                vec![
                    field("name", 1, Label::Optional, Type::String),
                    field("value", 2, Label::Optional, Type::String),
                ],
            ),
            scalar_value("Gauge"),
            scalar_value("Counter"),
            message(
                "Quantile",
                vec![
                    field("quantile", 1, Label::Optional, Type::Double),
                    field("value", 2, Label::Optional, Type::Double),
                ],
            ),
            message(
                "Summary",
                vec![
                    field("sample_count", 1, Label::Optional, Type::Uint64),
                    field("sample_sum", 2, Label::Optional, Type::Double),
                    typed_field("quantile", 3, Label::Repeated, Type::Message, "Quantile"),
                ],
            ),
            scalar_value("Untyped"),
            message(
                "Histogram",
                vec![
                    field("sample_count", 1, Label::Optional, Type::Uint64),
                    field("sample_sum", 2, Label::Optional, Type::Double),
                    typed_field("bucket", 3, Label::Repeated, Type::Message, "Bucket"),
                ],
            ),
            message(
                "Bucket",
                vec![
                    field("cumulative_count", 1, Label::Optional, Type::Uint64),
                    field("upper_bound", 2, Label::Optional, Type::Double),
                ],
            ),
            metric,
            message(
                "MetricFamily",
                vec![
                    field("name", 1, Label::Optional, Type::String),
                    field("help", 2, Label::Optional, Type::String),
                    typed_field("type", 3, Label::Optional, Type::Enum, "MetricType"),
                    typed_field("metric", 4, Label::Repeated, Type::Message, "Metric"),
                ],
            ),
        ],
        ..Default::default()
    }
}
