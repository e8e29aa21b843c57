//! Request bodies, responses and their content maps.

use super::Contexts;
use crate::documentation::{BodyDocs, HeaderDocs, ResponseDocs};
use crate::error::Result;
use crate::openapi_model::{Encoding, Header, MediaType, RequestBody, Response};
use std::collections::BTreeMap;

const JSON: &str = "application/json";
const MULTIPART: &str = "multipart/form-data";

/// Builds the content map of a body: one media type entry per declared media type, all
/// sharing the same schema and examples.
pub fn build_content(body: &BodyDocs, ctx: &mut Contexts) -> Result<BTreeMap<String, MediaType>> {
    let schema = ctx.schemas.body_schema(body)?;
    let examples = ctx.examples.examples_for(&body.examples)?;

    let mut media_types = body.media_types.clone();
    if media_types.is_empty() {
        if schema.is_none() && examples.is_empty() {
            return Ok(BTreeMap::new());
        }
        media_types.push(if body.is_multipart() { MULTIPART } else { JSON }.to_string());
    }

    let encoding: BTreeMap<String, Encoding> = body
        .parts
        .iter()
        .filter(|part| !part.media_types.is_empty())
        .map(|part| {
            (
                part.name.clone(),
                Encoding {
                    content_type: part.media_types.join(", "),
                },
            )
        })
        .collect();

    Ok(media_types
        .into_iter()
        .map(|media_type| {
            (
                media_type,
                MediaType {
                    schema: schema.clone(),
                    examples: examples.clone(),
                    encoding: encoding.clone(),
                },
            )
        })
        .collect())
}

/// Builds a request body. Declared bodies are required unless stated otherwise.
pub fn build_request_body(body: &BodyDocs, ctx: &mut Contexts) -> Result<RequestBody> {
    Ok(RequestBody {
        description: body.description.clone(),
        content: build_content(body, ctx)?,
        required: body.required.unwrap_or(true),
    })
}

pub fn build_response(docs: &ResponseDocs, ctx: &mut Contexts) -> Result<Response> {
    let content = match &docs.body {
        Some(body) => build_content(body, ctx)?,
        None => BTreeMap::new(),
    };

    let mut headers = BTreeMap::new();
    for (name, header) in &docs.headers {
        headers.insert(name.clone(), build_header(header, ctx)?);
    }

    Ok(Response {
        description: docs.description.clone().unwrap_or_default(),
        headers,
        content,
    })
}

fn build_header(docs: &HeaderDocs, ctx: &mut Contexts) -> Result<Header> {
    let schema = docs
        .type_descriptor
        .as_ref()
        .map(|descriptor| ctx.schemas.schema_for(descriptor))
        .transpose()?;

    Ok(Header {
        description: docs.description.clone(),
        required: docs.required.unwrap_or(false),
        deprecated: docs.deprecated,
        schema,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documentation::{ExampleDescriptor, MultipartPart, TypeDescriptor};
    use serde_json::json;

    #[test]
    fn test_json_body_by_default() {
        let mut ctx = Contexts::empty();
        let body = BodyDocs::new(TypeDescriptor::string()).description("Name");

        let request = build_request_body(&body, &mut ctx).unwrap();
        assert!(request.required);
        assert_eq!(request.description.as_deref(), Some("Name"));
        assert_eq!(request.content.len(), 1);
        assert_eq!(request.content[JSON].schema, Some(json!({ "type": "string" })));
    }

    #[test]
    fn test_explicit_media_types_share_schema() {
        let mut ctx = Contexts::empty();
        let body = BodyDocs::new(TypeDescriptor::string())
            .media_type("text/plain")
            .media_type("application/xml")
            .required(false);

        let request = build_request_body(&body, &mut ctx).unwrap();
        assert!(!request.required);
        let keys: Vec<_> = request.content.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["application/xml", "text/plain"]);
    }

    #[test]
    fn test_multipart_body_with_encoding() {
        let mut ctx = Contexts::empty();
        let body = BodyDocs::multipart(vec![
            MultipartPart::new("avatar", TypeDescriptor::inline(json!({ "type": "string", "format": "binary" })))
                .media_type("image/png")
                .media_type("image/jpeg"),
            MultipartPart::new("name", TypeDescriptor::string()),
        ]);

        let content = build_content(&body, &mut ctx).unwrap();
        let media = &content[MULTIPART];
        assert_eq!(media.schema.as_ref().unwrap()["type"], "object");
        assert_eq!(media.encoding["avatar"].content_type, "image/png, image/jpeg");
        assert!(!media.encoding.contains_key("name"));
    }

    #[test]
    fn test_body_without_type_has_no_content() {
        let mut ctx = Contexts::empty();
        let content = build_content(&BodyDocs::default(), &mut ctx).unwrap();
        assert!(content.is_empty());
    }

    #[test]
    fn test_body_with_only_examples() {
        let mut ctx = Contexts::empty();
        let body = BodyDocs::default().example("sample", ExampleDescriptor::value(json!({ "a": 1 })));

        let content = build_content(&body, &mut ctx).unwrap();
        assert!(content[JSON].schema.is_none());
        assert_eq!(content[JSON].examples.len(), 1);
    }

    #[test]
    fn test_response_with_headers() {
        let mut ctx = Contexts::empty();
        let docs = ResponseDocs::new("Created")
            .body(BodyDocs::new(TypeDescriptor::string()))
            .header("Location", HeaderDocs::new(TypeDescriptor::string()).description("New resource"));

        let response = build_response(&docs, &mut ctx).unwrap();
        assert_eq!(response.description, "Created");
        assert_eq!(response.headers["Location"].description.as_deref(), Some("New resource"));
        assert_eq!(response.headers["Location"].schema, Some(json!({ "type": "string" })));
        assert!(response.content.contains_key(JSON));
    }

    #[test]
    fn test_response_description_defaults_to_empty() {
        let mut ctx = Contexts::empty();
        let response = build_response(&ResponseDocs::default(), &mut ctx).unwrap();
        assert_eq!(response.description, "");
        assert!(response.content.is_empty());
    }
}
