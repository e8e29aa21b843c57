use crate::collector::RouteMeta;
use crate::documentation::{self, ExampleDescriptor};
use crate::error::{Error, Result};
use crate::openapi_model::{Example, ReferenceOr};
use log::debug;
use std::collections::BTreeMap;

const COMPONENT_PREFIX: &str = "#/components/examples/";

/// Example context - resolves example descriptors and deduplicates referenced examples
/// into the `components.examples` section of a document.
pub struct ExampleContext {
    /// Examples addressable through `ExampleDescriptor::Reference`
    registry: BTreeMap<String, documentation::Example>,
    examples: BTreeMap<String, Example>,
}

impl ExampleContext {
    pub fn new(registry: BTreeMap<String, documentation::Example>) -> Self {
        debug!("Initializing ExampleContext with {} registered examples", registry.len());
        Self {
            registry,
            examples: BTreeMap::new(),
        }
    }

    /// Registers every example referenced by the given routes.
    pub fn collect(&mut self, routes: &[RouteMeta]) -> Result<()> {
        for route in routes {
            let docs = &route.documentation;
            let bodies = docs
                .request
                .body
                .iter()
                .chain(docs.responses.values().filter_map(|r| r.body.as_ref()));
            for body in bodies {
                for example in body.examples.values() {
                    self.example_for(example)?;
                }
            }
            for parameter in &docs.request.parameters {
                for example in parameter.examples.values() {
                    self.example_for(example)?;
                }
            }
        }
        debug!("Collected {} component examples", self.examples.len());
        Ok(())
    }

    /// The example object to embed, or a `$ref` to a component example.
    pub fn example_for(&mut self, descriptor: &ExampleDescriptor) -> Result<ReferenceOr<Example>> {
        match descriptor {
            ExampleDescriptor::Inline(example) => Ok(ReferenceOr::Item(convert(example))),
            ExampleDescriptor::Reference(name) => {
                if !self.examples.contains_key(name) {
                    let example = self
                        .registry
                        .get(name)
                        .ok_or_else(|| Error::UnknownExample(name.clone()))?;
                    self.examples.insert(name.clone(), convert(example));
                }
                Ok(ReferenceOr::reference(format!("{}{}", COMPONENT_PREFIX, name)))
            }
        }
    }

    /// Resolves a whole map of named examples
    pub fn examples_for(
        &mut self,
        examples: &BTreeMap<String, ExampleDescriptor>,
    ) -> Result<BTreeMap<String, ReferenceOr<Example>>> {
        examples
            .iter()
            .map(|(name, descriptor)| Ok((name.clone(), self.example_for(descriptor)?)))
            .collect()
    }

    pub fn examples(&self) -> &BTreeMap<String, Example> {
        &self.examples
    }

    pub fn into_examples(self) -> BTreeMap<String, Example> {
        self.examples
    }
}

fn convert(example: &documentation::Example) -> Example {
    Example {
        summary: example.summary.clone(),
        description: example.description.clone(),
        value: example.value.clone(),
        external_value: example.external_value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documentation::{BodyDocs, RouteDocs, TypeDescriptor};
    use crate::route_tree::HttpMethod;
    use serde_json::json;

    fn registry() -> BTreeMap<String, documentation::Example> {
        let mut registry = BTreeMap::new();
        registry.insert(
            "alice".to_string(),
            documentation::Example::new(json!({ "name": "Alice" })).summary("A user"),
        );
        registry
    }

    #[test]
    fn test_inline_example_is_embedded() {
        let mut ctx = ExampleContext::new(BTreeMap::new());
        let example = ctx.example_for(&ExampleDescriptor::value(json!(42))).unwrap();

        assert_eq!(
            example,
            ReferenceOr::Item(Example {
                value: Some(json!(42)),
                ..Default::default()
            })
        );
        assert!(ctx.examples().is_empty());
    }

    #[test]
    fn test_reference_is_registered_once() {
        let mut ctx = ExampleContext::new(registry());
        let first = ctx.example_for(&ExampleDescriptor::reference("alice")).unwrap();
        let second = ctx.example_for(&ExampleDescriptor::reference("alice")).unwrap();

        assert_eq!(first, ReferenceOr::reference("#/components/examples/alice"));
        assert_eq!(first, second);
        assert_eq!(ctx.examples().len(), 1);
        assert_eq!(ctx.examples()["alice"].summary.as_deref(), Some("A user"));
    }

    #[test]
    fn test_unknown_reference_fails() {
        let mut ctx = ExampleContext::new(registry());
        let err = ctx.example_for(&ExampleDescriptor::reference("bob")).unwrap_err();
        assert!(matches!(err, Error::UnknownExample(name) if name == "bob"));
    }

    #[test]
    fn test_collect_registers_only_referenced() {
        let mut registry = registry();
        registry.insert("unused".to_string(), documentation::Example::new(json!(0)));

        let docs = RouteDocs::new().body(
            BodyDocs::new(TypeDescriptor::string())
                .example("ref", ExampleDescriptor::reference("alice"))
                .example("inline", ExampleDescriptor::value(json!("x"))),
        );
        let routes = vec![RouteMeta::new(HttpMethod::Post, "/users", docs)];

        let mut ctx = ExampleContext::new(registry);
        ctx.collect(&routes).unwrap();
        let names: Vec<_> = ctx.examples().keys().cloned().collect();
        assert_eq!(names, vec!["alice"]);
    }
}
