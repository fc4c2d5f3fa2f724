//! Immutable API schema built from file descriptors.
//!
//! The schema indexes every message reachable from the request (including
//! dependencies and nested types) and every service declared in the files
//! marked for generation. Method shapes such as paging and long-running
//! results are resolved once, at build time.

use crate::request::common_package_prefix;
use crate::{Naming, Options};
use prost_types::compiler::CodeGeneratorRequest;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{DescriptorProto, FieldDescriptorProto, FileDescriptorProto, ServiceDescriptorProto};
use samplegen_core::Result;
use serde::Serialize;
use std::collections::BTreeMap;

const OPERATION_TYPE: &str = ".google.longrunning.Operation";

/// A message field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    name: String,
    number: i32,
    kind: &'static str,
    repeated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    type_name: Option<String>,
}

impl Field {
    fn from_descriptor(field: &FieldDescriptorProto) -> Self {
        Self {
            name: field.name().to_string(),
            number: field.number(),
            kind: kind_name(field.r#type()),
            repeated: field.label() == Label::Repeated,
            type_name: field.type_name.clone().filter(|t| !t.is_empty()),
        }
    }

    /// Field name as declared.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field number.
    #[must_use]
    pub const fn number(&self) -> i32 {
        self.number
    }

    /// Scalar kind, e.g. `string`, `int32`, `message`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// Whether the field is repeated.
    #[must_use]
    pub const fn is_repeated(&self) -> bool {
        self.repeated
    }

    /// Fully-qualified type for message and enum fields.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    fn is_integer(&self) -> bool {
        matches!(
            self.kind,
            "int32" | "int64" | "uint32" | "uint64" | "sint32" | "sint64" | "fixed32" | "fixed64"
                | "sfixed32" | "sfixed64"
        )
    }

    fn is_singular_string(&self) -> bool {
        self.kind == "string" && !self.repeated
    }
}

/// A message type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    name: String,
    full_name: String,
    fields: Vec<Field>,
}

impl Message {
    /// Short name, e.g. `Book`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully-qualified name with a leading dot, e.g. `.acme.v1.Book`.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// An RPC method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Method {
    name: String,
    input_type: String,
    output_type: String,
    client_streaming: bool,
    server_streaming: bool,
    long_running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    paged_result_field: Option<String>,
}

impl Method {
    /// Creates a unary method.
    ///
    /// A method whose output is `.google.longrunning.Operation` is
    /// long-running.
    pub fn new(
        name: impl Into<String>,
        input_type: impl Into<String>,
        output_type: impl Into<String>,
    ) -> Self {
        let output_type = output_type.into();
        Self {
            name: name.into(),
            input_type: input_type.into(),
            long_running: output_type == OPERATION_TYPE,
            output_type,
            client_streaming: false,
            server_streaming: false,
            paged_result_field: None,
        }
    }

    /// Sets the streaming flags.
    #[must_use]
    pub const fn with_streaming(mut self, client: bool, server: bool) -> Self {
        self.client_streaming = client;
        self.server_streaming = server;
        self
    }

    /// Marks the method as paged over the given repeated output field.
    #[must_use]
    pub fn with_paged_result_field(mut self, field: impl Into<String>) -> Self {
        self.paged_result_field = Some(field.into());
        self
    }

    /// Method name, e.g. `GetBook`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully-qualified input message name.
    #[must_use]
    pub fn input_type(&self) -> &str {
        &self.input_type
    }

    /// Fully-qualified output message name.
    #[must_use]
    pub fn output_type(&self) -> &str {
        &self.output_type
    }

    /// Whether the client streams requests.
    #[must_use]
    pub const fn client_streaming(&self) -> bool {
        self.client_streaming
    }

    /// Whether the server streams responses.
    #[must_use]
    pub const fn server_streaming(&self) -> bool {
        self.server_streaming
    }

    /// Whether the method returns a long-running operation.
    #[must_use]
    pub const fn is_long_running(&self) -> bool {
        self.long_running
    }

    /// Repeated output field holding page results, if the method is paged.
    #[must_use]
    pub fn paged_result_field(&self) -> Option<&str> {
        self.paged_result_field.as_deref()
    }
}

/// A service and its methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Service {
    name: String,
    full_name: String,
    methods: Vec<Method>,
}

impl Service {
    /// Short name, e.g. `Library`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Package-qualified name without a leading dot.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Methods in declaration order.
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Looks up a method by name.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// The API being sampled. Read-only once built.
#[derive(Debug, Clone, Serialize)]
pub struct ApiSchema {
    naming: Naming,
    services: BTreeMap<String, Service>,
    #[serde(skip)]
    messages: BTreeMap<String, Message>,
}

impl ApiSchema {
    /// Builds the schema for a decoded request.
    ///
    /// # Errors
    ///
    /// Returns `Error::InputError` if the files to generate share no
    /// package.
    pub fn from_request(request: &CodeGeneratorRequest) -> Result<Self> {
        let opts = Options::build(request.parameter());
        let package = common_package_prefix(request);
        Self::build(&request.proto_file, &request.file_to_generate, &package, &opts)
    }

    /// Builds the schema from descriptors.
    ///
    /// Messages are indexed from every file. Services come only from
    /// files named in `file_to_generate` whose package lies within
    /// `package`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InputError` if `package` is empty.
    pub fn build(
        files: &[FileDescriptorProto],
        file_to_generate: &[String],
        package: &str,
        opts: &Options,
    ) -> Result<Self> {
        let naming = Naming::build(package, opts)?;

        let mut messages = BTreeMap::new();
        for file in files {
            let scope = qualify("", file.package());
            for message in &file.message_type {
                index_message(&scope, message, &mut messages);
            }
        }

        let mut services = BTreeMap::new();
        let in_api = |pkg: &str| pkg == package || pkg.starts_with(&format!("{package}."));
        for file in files
            .iter()
            .filter(|f| file_to_generate.iter().any(|n| n == f.name()))
            .filter(|f| in_api(f.package()))
        {
            for service in &file.service {
                let built = build_service(file.package(), service, &messages);
                if let Some(previous) = services.insert(built.full_name.clone(), built) {
                    tracing::warn!(service = %previous.full_name, "service declared twice; keeping the later one");
                }
            }
        }

        tracing::debug!(
            package,
            services = services.len(),
            messages = messages.len(),
            "built api schema"
        );

        Ok(Self {
            naming,
            services,
            messages,
        })
    }

    /// Naming derived from the package.
    #[must_use]
    pub const fn naming(&self) -> &Naming {
        &self.naming
    }

    /// Services keyed by package-qualified name.
    #[must_use]
    pub const fn services(&self) -> &BTreeMap<String, Service> {
        &self.services
    }

    /// Looks up a service by qualified or short name.
    ///
    /// A short name only matches when it is unambiguous.
    #[must_use]
    pub fn service(&self, name: &str) -> Option<&Service> {
        let name = name.trim_start_matches('.');
        if let Some(service) = self.services.get(name) {
            return Some(service);
        }
        let mut matches = self.services.values().filter(|s| s.name == name);
        match (matches.next(), matches.next()) {
            (Some(service), None) => Some(service),
            _ => None,
        }
    }

    /// Looks up a method on a service.
    #[must_use]
    pub fn method(&self, service: &str, method: &str) -> Option<&Method> {
        self.service(service)?.method(method)
    }

    /// Looks up a message by fully-qualified name; the leading dot is optional.
    #[must_use]
    pub fn message(&self, full_name: &str) -> Option<&Message> {
        if full_name.starts_with('.') {
            self.messages.get(full_name)
        } else {
            self.messages.get(&format!(".{full_name}"))
        }
    }
}

fn qualify(scope: &str, name: &str) -> String {
    if name.is_empty() {
        scope.to_string()
    } else {
        format!("{scope}.{name}")
    }
}

fn index_message(scope: &str, message: &DescriptorProto, out: &mut BTreeMap<String, Message>) {
    let full_name = qualify(scope, message.name());

    for nested in &message.nested_type {
        index_message(&full_name, nested, out);
    }

    out.insert(
        full_name.clone(),
        Message {
            name: message.name().to_string(),
            full_name,
            fields: message.field.iter().map(Field::from_descriptor).collect(),
        },
    );
}

fn build_service(
    package: &str,
    service: &ServiceDescriptorProto,
    messages: &BTreeMap<String, Message>,
) -> Service {
    let full_name = qualify(package, service.name())
        .trim_start_matches('.')
        .to_string();

    let methods = service
        .method
        .iter()
        .map(|m| {
            let mut method = Method::new(m.name(), m.input_type(), m.output_type())
                .with_streaming(m.client_streaming(), m.server_streaming());
            method.paged_result_field = paged_result_field(
                messages.get(m.input_type()),
                messages.get(m.output_type()),
            );
            method
        })
        .collect();

    Service {
        name: service.name().to_string(),
        full_name,
        methods,
    }
}

/// A method is paged when its request carries an integer `page_size` and a
/// string `page_token`, and its response a string `next_page_token`. The
/// first repeated response field holds the results.
fn paged_result_field(input: Option<&Message>, output: Option<&Message>) -> Option<String> {
    let (input, output) = (input?, output?);

    let page_size = input.field("page_size").is_some_and(Field::is_integer);
    let page_token = input.field("page_token").is_some_and(Field::is_singular_string);
    let next_token = output
        .field("next_page_token")
        .is_some_and(Field::is_singular_string);

    if !(page_size && page_token && next_token) {
        return None;
    }

    output
        .fields
        .iter()
        .find(|f| f.repeated)
        .map(|f| f.name.clone())
}

const fn kind_name(kind: Type) -> &'static str {
    match kind {
        Type::Double => "double",
        Type::Float => "float",
        Type::Int64 => "int64",
        Type::Uint64 => "uint64",
        Type::Int32 => "int32",
        Type::Fixed64 => "fixed64",
        Type::Fixed32 => "fixed32",
        Type::Bool => "bool",
        Type::String => "string",
        Type::Group => "group",
        Type::Message => "message",
        Type::Bytes => "bytes",
        Type::Uint32 => "uint32",
        Type::Enum => "enum",
        Type::Sfixed32 => "sfixed32",
        Type::Sfixed64 => "sfixed64",
        Type::Sint32 => "sint32",
        Type::Sint64 => "sint64",
    }
}
