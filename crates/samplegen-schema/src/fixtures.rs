//! Descriptor fixtures shared by tests across the workspace.
//!
//! Enabled for downstream crates through the `testing` feature.

use prost::Message as _;
use prost_types::compiler::CodeGeneratorRequest;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, FieldDescriptorProto, FileDescriptorProto, MethodDescriptorProto,
    ServiceDescriptorProto,
};

/// Proto package of the library fixture.
pub const LIBRARY_PACKAGE: &str = "google.example.library.v1";

/// Fully-qualified name of the library service.
pub const LIBRARY_SERVICE: &str = "google.example.library.v1.Library";

const LIBRARY_FILE: &str = "google/example/library/v1/library.proto";
const OPERATIONS_FILE: &str = "google/longrunning/operations.proto";

/// Builds a singular scalar field.
#[must_use]
pub fn scalar(name: &str, number: i32, kind: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(kind as i32),
        ..Default::default()
    }
}

/// Builds a repeated message field.
#[must_use]
pub fn repeated_message(name: &str, number: i32, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(Label::Repeated as i32),
        r#type: Some(Type::Message as i32),
        type_name: Some(type_name.to_string()),
        ..Default::default()
    }
}

/// Builds a message with the given fields.
#[must_use]
pub fn message(name: &str, field: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        field,
        ..Default::default()
    }
}

/// Builds a method descriptor.
#[must_use]
pub fn method(
    name: &str,
    input: &str,
    output: &str,
    client_streaming: bool,
    server_streaming: bool,
) -> MethodDescriptorProto {
    MethodDescriptorProto {
        name: Some(name.to_string()),
        input_type: Some(input.to_string()),
        output_type: Some(output.to_string()),
        client_streaming: Some(client_streaming),
        server_streaming: Some(server_streaming),
        ..Default::default()
    }
}

fn library_type(name: &str) -> String {
    format!(".{LIBRARY_PACKAGE}.{name}")
}

/// The library API file.
///
/// `Library` has one method per calling form: `GetBook` (unary),
/// `ListShelves` (paged), `UploadBooks` (client streaming), `StreamBooks`
/// (server streaming), `DiscussBook` (bidi) and `ExportBooks` (long-running).
#[must_use]
pub fn library_file() -> FileDescriptorProto {
    let mut book = message(
        "Book",
        vec![
            scalar("name", 1, Type::String),
            scalar("title", 2, Type::String),
            scalar("rating", 3, Type::Int32),
        ],
    );
    book.nested_type
        .push(message("Review", vec![scalar("text", 1, Type::String)]));

    let messages = vec![
        book,
        message("Shelf", vec![scalar("name", 1, Type::String)]),
        message("GetBookRequest", vec![scalar("name", 1, Type::String)]),
        message(
            "ListShelvesRequest",
            vec![
                scalar("page_size", 1, Type::Int32),
                scalar("page_token", 2, Type::String),
            ],
        ),
        message(
            "ListShelvesResponse",
            vec![
                repeated_message("shelves", 1, &library_type("Shelf")),
                scalar("next_page_token", 2, Type::String),
            ],
        ),
        message("UploadBooksResponse", vec![scalar("count", 1, Type::Int64)]),
        message("StreamBooksRequest", vec![scalar("shelf", 1, Type::String)]),
        message("BookComment", vec![scalar("comment", 1, Type::String)]),
        message("ExportBooksRequest", vec![scalar("destination", 1, Type::String)]),
    ];

    let t = |name: &str| library_type(name);
    let service = ServiceDescriptorProto {
        name: Some("Library".to_string()),
        method: vec![
            method("GetBook", &t("GetBookRequest"), &t("Book"), false, false),
            method("ListShelves", &t("ListShelvesRequest"), &t("ListShelvesResponse"), false, false),
            method("UploadBooks", &t("Book"), &t("UploadBooksResponse"), true, false),
            method("StreamBooks", &t("StreamBooksRequest"), &t("Book"), false, true),
            method("DiscussBook", &t("BookComment"), &t("BookComment"), true, true),
            method("ExportBooks", &t("ExportBooksRequest"), ".google.longrunning.Operation", false, false),
        ],
        ..Default::default()
    };

    FileDescriptorProto {
        name: Some(LIBRARY_FILE.to_string()),
        package: Some(LIBRARY_PACKAGE.to_string()),
        dependency: vec![OPERATIONS_FILE.to_string()],
        message_type: messages,
        service: vec![service],
        syntax: Some("proto3".to_string()),
        ..Default::default()
    }
}

/// The long-running operations dependency.
#[must_use]
pub fn operations_file() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some(OPERATIONS_FILE.to_string()),
        package: Some("google.longrunning".to_string()),
        message_type: vec![message(
            "Operation",
            vec![scalar("name", 1, Type::String), scalar("done", 2, Type::Bool)],
        )],
        service: vec![ServiceDescriptorProto {
            name: Some("Operations".to_string()),
            ..Default::default()
        }],
        syntax: Some("proto3".to_string()),
        ..Default::default()
    }
}

/// A request generating the library API, with its dependency.
#[must_use]
pub fn library_request() -> CodeGeneratorRequest {
    CodeGeneratorRequest {
        file_to_generate: vec![LIBRARY_FILE.to_string()],
        parameter: None,
        proto_file: vec![operations_file(), library_file()],
        ..Default::default()
    }
}

/// [`library_request`] in wire format.
#[must_use]
pub fn library_request_bytes() -> Vec<u8> {
    library_request().encode_to_vec()
}
