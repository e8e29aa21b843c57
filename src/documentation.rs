//! Per-route documentation objects.
//!
//! A [`RouteDocs`] describes one operation: its tags, summary, parameters, request body and
//! responses. It can be attached to any node of the route tree; documentation on a parent node
//! is inherited by every route below it through [`RouteDocs::inherit`].
//!
//! Request and response shapes are described with [`TypeDescriptor`]s. A descriptor is either
//! derived from a Rust type through `schemars`, given as a raw JSON schema, an array of another
//! descriptor, or a reference into the global schema registry of the configuration.
//!
//! All types deserialize from YAML or JSON so that route manifests can carry documentation.

use crate::error::Error;
use crate::openapi_model::ExternalDocs;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Describes the type of a body, parameter or header.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawTypeDescriptor")]
pub enum TypeDescriptor {
    /// A named type. `id` is the type identity used for deduplication, `name` the preferred
    /// component name, `schema` the root JSON schema (possibly with `$defs`).
    Component { id: String, name: String, schema: Value },
    /// An anonymous schema embedded as-is
    Inline(Value),
    /// An array of the inner type
    Array(Box<TypeDescriptor>),
    /// A schema registered under this id in the configuration
    Reference(String),
}

impl TypeDescriptor {
    /// Derives the descriptor of a Rust type through `schemars`.
    pub fn of<T: JsonSchema>() -> Self {
        let schema = schemars::schema_for!(T).to_value();
        TypeDescriptor::Component {
            id: T::schema_id().into_owned(),
            name: T::schema_name().into_owned(),
            schema,
        }
    }

    /// A named schema whose identity is its name
    pub fn named(name: impl Into<String>, schema: Value) -> Self {
        let name = name.into();
        TypeDescriptor::Component {
            id: name.clone(),
            name,
            schema,
        }
    }

    pub fn inline(schema: Value) -> Self {
        TypeDescriptor::Inline(schema)
    }

    pub fn array(items: TypeDescriptor) -> Self {
        TypeDescriptor::Array(Box::new(items))
    }

    pub fn reference(id: impl Into<String>) -> Self {
        TypeDescriptor::Reference(id.into())
    }

    pub fn string() -> Self {
        TypeDescriptor::Inline(json!({ "type": "string" }))
    }

    pub fn integer() -> Self {
        TypeDescriptor::Inline(json!({ "type": "integer" }))
    }

    pub fn number() -> Self {
        TypeDescriptor::Inline(json!({ "type": "number" }))
    }

    pub fn boolean() -> Self {
        TypeDescriptor::Inline(json!({ "type": "boolean" }))
    }

    /// Resolves the short primitive names accepted in manifests.
    pub fn primitive(name: &str) -> Result<Self, Error> {
        match name {
            "string" | "integer" | "number" | "boolean" | "object" => {
                Ok(TypeDescriptor::Inline(json!({ "type": name })))
            }
            other => Err(Error::InvalidType(format!(
                "'{}' is not a primitive type; use {{ref: ...}} or {{name: ..., schema: ...}}",
                other
            ))),
        }
    }
}

/// Manifest representations of a [`TypeDescriptor`].
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTypeDescriptor {
    Primitive(String),
    Reference {
        #[serde(rename = "ref")]
        reference: String,
    },
    Array {
        array: Box<RawTypeDescriptor>,
    },
    Component {
        name: String,
        schema: Value,
    },
    Inline {
        schema: Value,
    },
}

impl TryFrom<RawTypeDescriptor> for TypeDescriptor {
    type Error = Error;

    fn try_from(raw: RawTypeDescriptor) -> Result<Self, Self::Error> {
        match raw {
            RawTypeDescriptor::Primitive(name) => TypeDescriptor::primitive(&name),
            RawTypeDescriptor::Reference { reference } => Ok(TypeDescriptor::Reference(reference)),
            RawTypeDescriptor::Array { array } => {
                Ok(TypeDescriptor::Array(Box::new(TypeDescriptor::try_from(*array)?)))
            }
            RawTypeDescriptor::Component { name, schema } => Ok(TypeDescriptor::named(name, schema)),
            RawTypeDescriptor::Inline { schema } => Ok(TypeDescriptor::Inline(schema)),
        }
    }
}

/// An example value with optional metadata.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Example {
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub external_value: Option<String>,
}

impl Example {
    pub fn new(value: Value) -> Self {
        Self {
            value: Some(value),
            ..Default::default()
        }
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// An example given in place or referenced by name from the configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawExampleDescriptor")]
pub enum ExampleDescriptor {
    Inline(Example),
    Reference(String),
}

impl ExampleDescriptor {
    pub fn value(value: Value) -> Self {
        ExampleDescriptor::Inline(Example::new(value))
    }

    pub fn reference(name: impl Into<String>) -> Self {
        ExampleDescriptor::Reference(name.into())
    }
}

impl From<Example> for ExampleDescriptor {
    fn from(example: Example) -> Self {
        ExampleDescriptor::Inline(example)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ExampleRef {
    #[serde(rename = "ref")]
    reference: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawExampleDescriptor {
    Reference(ExampleRef),
    Full(Example),
    Value(Value),
}

impl From<RawExampleDescriptor> for ExampleDescriptor {
    fn from(raw: RawExampleDescriptor) -> Self {
        match raw {
            RawExampleDescriptor::Reference(r) => ExampleDescriptor::Reference(r.reference),
            RawExampleDescriptor::Full(example) => ExampleDescriptor::Inline(example),
            RawExampleDescriptor::Value(value) => ExampleDescriptor::value(value),
        }
    }
}

/// Where a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParameterLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
        }
    }
}

fn default_parameter_type() -> TypeDescriptor {
    TypeDescriptor::string()
}

/// A documented request parameter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParameterDocs {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(rename = "type", default = "default_parameter_type")]
    pub type_descriptor: TypeDescriptor,
    #[serde(default)]
    pub description: Option<String>,
    /// Ignored for path parameters, which are always required
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub allow_empty_value: Option<bool>,
    #[serde(default)]
    pub explode: Option<bool>,
    #[serde(default)]
    pub example: Option<Value>,
    #[serde(default)]
    pub examples: BTreeMap<String, ExampleDescriptor>,
}

impl ParameterDocs {
    pub fn new(name: impl Into<String>, location: ParameterLocation, type_descriptor: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            location,
            type_descriptor,
            description: None,
            required: None,
            deprecated: false,
            allow_empty_value: None,
            explode: None,
            example: None,
            examples: BTreeMap::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = deprecated;
        self
    }

    pub fn example(mut self, value: Value) -> Self {
        self.example = Some(value);
        self
    }

    pub fn named_example(mut self, name: impl Into<String>, example: ExampleDescriptor) -> Self {
        self.examples.insert(name.into(), example);
        self
    }
}

/// One part of a multipart request body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MultipartPart {
    pub name: String,
    #[serde(rename = "type")]
    pub type_descriptor: TypeDescriptor,
    #[serde(default)]
    pub media_types: Vec<String>,
    #[serde(default)]
    pub required: Option<bool>,
}

impl MultipartPart {
    pub fn new(name: impl Into<String>, type_descriptor: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            type_descriptor,
            media_types: Vec::new(),
            required: None,
        }
    }

    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_types.push(media_type.into());
        self
    }
}

/// A request or response body.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BodyDocs {
    #[serde(rename = "type")]
    pub type_descriptor: Option<TypeDescriptor>,
    pub description: Option<String>,
    pub required: Option<bool>,
    pub media_types: Vec<String>,
    pub examples: BTreeMap<String, ExampleDescriptor>,
    /// Non-empty for multipart bodies
    pub parts: Vec<MultipartPart>,
}

impl BodyDocs {
    pub fn new(type_descriptor: TypeDescriptor) -> Self {
        Self {
            type_descriptor: Some(type_descriptor),
            ..Default::default()
        }
    }

    /// Body of type `T`, schema derived through `schemars`
    pub fn of<T: JsonSchema>() -> Self {
        Self::new(TypeDescriptor::of::<T>())
    }

    pub fn multipart(parts: Vec<MultipartPart>) -> Self {
        Self {
            parts,
            ..Default::default()
        }
    }

    pub fn is_multipart(&self) -> bool {
        !self.parts.is_empty()
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_types.push(media_type.into());
        self
    }

    pub fn example(mut self, name: impl Into<String>, example: ExampleDescriptor) -> Self {
        self.examples.insert(name.into(), example);
        self
    }
}

/// A documented response header.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HeaderDocs {
    #[serde(rename = "type")]
    pub type_descriptor: Option<TypeDescriptor>,
    pub description: Option<String>,
    pub required: Option<bool>,
    pub deprecated: bool,
}

impl HeaderDocs {
    pub fn new(type_descriptor: TypeDescriptor) -> Self {
        Self {
            type_descriptor: Some(type_descriptor),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A documented response for one status code.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResponseDocs {
    pub description: Option<String>,
    pub body: Option<BodyDocs>,
    pub headers: BTreeMap<String, HeaderDocs>,
}

impl ResponseDocs {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Default::default()
        }
    }

    pub fn body(mut self, body: BodyDocs) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: impl Into<String>, header: HeaderDocs) -> Self {
        self.headers.insert(name.into(), header);
        self
    }
}

/// Parameters and body of a request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RequestDocs {
    pub parameters: Vec<ParameterDocs>,
    pub body: Option<BodyDocs>,
}

/// Documentation of one route, or of a whole subtree when attached to an inner node.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RouteDocs {
    /// The spec this route belongs to; assigned automatically when missing
    pub spec_id: Option<String>,
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub operation_id: Option<String>,
    pub security_scheme_names: Vec<String>,
    pub deprecated: bool,
    /// Hidden routes are left out of every document
    pub hidden: bool,
    /// Overrides the protection inferred from authentication gates
    pub protected: Option<bool>,
    pub external_docs: Option<ExternalDocs>,
    pub request: RequestDocs,
    /// Responses by status code; `default` is the OpenAPI default response
    pub responses: BTreeMap<String, ResponseDocs>,
}

impl RouteDocs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spec_id(mut self, spec_id: impl Into<String>) -> Self {
        self.spec_id = Some(spec_id.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    pub fn security_scheme(mut self, name: impl Into<String>) -> Self {
        self.security_scheme_names.push(name.into());
        self
    }

    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = deprecated;
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn protected(mut self, protected: bool) -> Self {
        self.protected = Some(protected);
        self
    }

    pub fn external_docs(mut self, external_docs: ExternalDocs) -> Self {
        self.external_docs = Some(external_docs);
        self
    }

    pub fn parameter(mut self, parameter: ParameterDocs) -> Self {
        self.request.parameters.push(parameter);
        self
    }

    pub fn path_parameter(self, name: impl Into<String>, type_descriptor: TypeDescriptor) -> Self {
        self.parameter(ParameterDocs::new(name, ParameterLocation::Path, type_descriptor))
    }

    pub fn query_parameter(self, name: impl Into<String>, type_descriptor: TypeDescriptor) -> Self {
        self.parameter(ParameterDocs::new(name, ParameterLocation::Query, type_descriptor))
    }

    pub fn header_parameter(self, name: impl Into<String>, type_descriptor: TypeDescriptor) -> Self {
        self.parameter(ParameterDocs::new(name, ParameterLocation::Header, type_descriptor))
    }

    pub fn cookie_parameter(self, name: impl Into<String>, type_descriptor: TypeDescriptor) -> Self {
        self.parameter(ParameterDocs::new(name, ParameterLocation::Cookie, type_descriptor))
    }

    pub fn body(mut self, body: BodyDocs) -> Self {
        self.request.body = Some(body);
        self
    }

    pub fn response(mut self, status: impl Into<String>, response: ResponseDocs) -> Self {
        self.responses.insert(status.into(), response);
        self
    }

    /// Merges the documentation of a parent node with the documentation of a child node.
    ///
    /// Single values of the child win over the parent's. Tags and security scheme names are
    /// unioned, `deprecated` and `hidden` propagate down, parameters accumulate (a child
    /// parameter replaces a parent parameter with the same name and location) and responses
    /// are unioned with the child winning per status code.
    pub fn inherit(parent: &RouteDocs, child: &RouteDocs) -> RouteDocs {
        let mut parameters: Vec<ParameterDocs> = parent
            .request
            .parameters
            .iter()
            .filter(|p| {
                !child
                    .request
                    .parameters
                    .iter()
                    .any(|c| c.name == p.name && c.location == p.location)
            })
            .cloned()
            .collect();
        parameters.extend(child.request.parameters.iter().cloned());

        let mut responses = parent.responses.clone();
        for (status, response) in &child.responses {
            responses.insert(status.clone(), response.clone());
        }

        RouteDocs {
            spec_id: child.spec_id.clone().or_else(|| parent.spec_id.clone()),
            tags: union(&parent.tags, &child.tags),
            summary: child.summary.clone().or_else(|| parent.summary.clone()),
            description: child.description.clone().or_else(|| parent.description.clone()),
            operation_id: child.operation_id.clone().or_else(|| parent.operation_id.clone()),
            security_scheme_names: union(&parent.security_scheme_names, &child.security_scheme_names),
            deprecated: parent.deprecated || child.deprecated,
            hidden: parent.hidden || child.hidden,
            protected: child.protected.or(parent.protected),
            external_docs: child.external_docs.clone().or_else(|| parent.external_docs.clone()),
            request: RequestDocs {
                parameters,
                body: child.request.body.clone().or_else(|| parent.request.body.clone()),
            },
            responses,
        }
    }
}

fn union(first: &[String], second: &[String]) -> Vec<String> {
    let mut out = first.to_vec();
    for item in second {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}
