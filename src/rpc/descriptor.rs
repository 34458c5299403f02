//! File descriptor for the reflection service.

use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet,
    MethodDescriptorProto, ServiceDescriptorProto,
};

pub const PACKAGE: &str = "quote";
pub const SERVICE: &str = "Quote";

/// Descriptor set describing `quote.proto`.
pub fn file_descriptor_set() -> FileDescriptorSet {
    let request = DescriptorProto {
        name: Some("GetQuoteRequest".into()),
        ..Default::default()
    };

    let response = DescriptorProto {
        name: Some("GetQuoteResponse".into()),
        field: vec![FieldDescriptorProto {
            name: Some("quote_text".into()),
            number: Some(1),
            label: Some(Label::Optional as i32),
            r#type: Some(Type::String as i32),
            json_name: Some("quoteText".into()),
            ..Default::default()
        }],
        ..Default::default()
    };

    let service = ServiceDescriptorProto {
        name: Some(SERVICE.into()),
        method: vec![MethodDescriptorProto {
            name: Some("GetQuote".into()),
            input_type: Some(format!(".{PACKAGE}.GetQuoteRequest")),
            output_type: Some(format!(".{PACKAGE}.GetQuoteResponse")),
            ..Default::default()
        }],
        ..Default::default()
    };

    FileDescriptorSet {
        file: vec![FileDescriptorProto {
            name: Some("quote.proto".into()),
            package: Some(PACKAGE.into()),
            message_type: vec![request, response],
            service: vec![service],
            syntax: Some("proto3".into()),
            ..Default::default()
        }],
    }
}
