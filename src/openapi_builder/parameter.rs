use super::Contexts;
use crate::documentation::{ParameterDocs, ParameterLocation};
use crate::error::Result;
use crate::openapi_model::Parameter;
use log::debug;

/// Builds an OpenAPI parameter. Path parameters are always required, the others default to
/// optional.
pub fn build_parameter(docs: &ParameterDocs, ctx: &mut Contexts) -> Result<Parameter> {
    debug!("Building parameter {} in {}", docs.name, docs.location.as_str());

    let required = match docs.location {
        ParameterLocation::Path => true,
        _ => docs.required.unwrap_or(false),
    };

    Ok(Parameter {
        name: docs.name.clone(),
        location: docs.location.as_str().to_string(),
        description: docs.description.clone(),
        required,
        deprecated: docs.deprecated,
        allow_empty_value: docs.allow_empty_value,
        explode: docs.explode,
        schema: ctx.schemas.schema_for(&docs.type_descriptor)?,
        example: docs.example.clone(),
        examples: ctx.examples.examples_for(&docs.examples)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documentation::{ExampleDescriptor, TypeDescriptor};
    use serde_json::json;

    #[test]
    fn test_path_parameter_is_required() {
        let mut ctx = Contexts::empty();
        let docs = ParameterDocs::new("id", ParameterLocation::Path, TypeDescriptor::integer()).required(false);

        let parameter = build_parameter(&docs, &mut ctx).unwrap();
        assert_eq!(parameter.location, "path");
        assert!(parameter.required);
        assert_eq!(parameter.schema, json!({ "type": "integer" }));
    }

    #[test]
    fn test_query_parameter_defaults_to_optional() {
        let mut ctx = Contexts::empty();
        let docs = ParameterDocs::new("page", ParameterLocation::Query, TypeDescriptor::integer())
            .description("Page number")
            .example(json!(2));

        let parameter = build_parameter(&docs, &mut ctx).unwrap();
        assert!(!parameter.required);
        assert_eq!(parameter.description.as_deref(), Some("Page number"));
        assert_eq!(parameter.example, Some(json!(2)));
    }

    #[test]
    fn test_header_parameter_with_examples() {
        let mut ctx = Contexts::empty();
        let docs = ParameterDocs::new("X-Request-Id", ParameterLocation::Header, TypeDescriptor::string())
            .required(true)
            .named_example("uuid", ExampleDescriptor::value(json!("3f2a")));

        let parameter = build_parameter(&docs, &mut ctx).unwrap();
        assert!(parameter.required);
        assert_eq!(parameter.examples.len(), 1);
    }
}
