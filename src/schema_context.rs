use crate::collector::RouteMeta;
use crate::documentation::{BodyDocs, TypeDescriptor};
use crate::error::{Error, Result};
use log::{debug, warn};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};

const COMPONENT_PREFIX: &str = "#/components/schemas/";

/// Schema context - turns type descriptors into schemas and deduplicates named types
/// into the `components.schemas` section of a document.
pub struct SchemaContext {
    /// Schemas addressable through `TypeDescriptor::Reference`
    registry: BTreeMap<String, TypeDescriptor>,
    /// Component schemas by component name
    schemas: BTreeMap<String, Value>,
    /// Component name by owning identity: a type id, `ref:<id>` for registry entries and
    /// `def:<name>:<schema>` for promoted `$defs`
    owners: HashMap<String, String>,
}

impl SchemaContext {
    /// Create a new SchemaContext over the configured schema registry
    pub fn new(registry: BTreeMap<String, TypeDescriptor>) -> Self {
        debug!("Initializing SchemaContext with {} registered schemas", registry.len());
        Self {
            registry,
            schemas: BTreeMap::new(),
            owners: HashMap::new(),
        }
    }

    /// Registers every type used by the given routes, in route order.
    pub fn collect(&mut self, routes: &[RouteMeta]) -> Result<()> {
        for route in routes {
            let docs = &route.documentation;
            for parameter in &docs.request.parameters {
                self.schema_for(&parameter.type_descriptor)?;
            }
            if let Some(body) = &docs.request.body {
                self.body_schema(body)?;
            }
            for response in docs.responses.values() {
                if let Some(body) = &response.body {
                    self.body_schema(body)?;
                }
                for header in response.headers.values() {
                    if let Some(descriptor) = &header.type_descriptor {
                        self.schema_for(descriptor)?;
                    }
                }
            }
        }
        debug!("Collected {} component schemas", self.schemas.len());
        Ok(())
    }

    /// Returns the schema to embed where `descriptor` is used: a `$ref` for named complex
    /// types, the schema itself otherwise. Calling it again for the same type is cheap and
    /// yields the same result.
    pub fn schema_for(&mut self, descriptor: &TypeDescriptor) -> Result<Value> {
        match descriptor {
            TypeDescriptor::Inline(schema) => Ok(schema.clone()),
            TypeDescriptor::Array(items) => {
                let items = self.schema_for(items)?;
                Ok(json!({ "type": "array", "items": items }))
            }
            TypeDescriptor::Component { id, name, schema } => self.component(id, name, schema),
            TypeDescriptor::Reference(id) => self.reference(id),
        }
    }

    /// Schema of a request or response body, `None` when the body declares no type
    pub fn body_schema(&mut self, body: &BodyDocs) -> Result<Option<Value>> {
        if body.is_multipart() {
            let mut properties = Map::new();
            let mut required = Vec::new();
            for part in &body.parts {
                properties.insert(part.name.clone(), self.schema_for(&part.type_descriptor)?);
                if part.required.unwrap_or(true) {
                    required.push(Value::String(part.name.clone()));
                }
            }
            let mut schema = Map::new();
            schema.insert("type".into(), json!("object"));
            schema.insert("properties".into(), Value::Object(properties));
            if !required.is_empty() {
                schema.insert("required".into(), Value::Array(required));
            }
            return Ok(Some(Value::Object(schema)));
        }

        body.type_descriptor
            .as_ref()
            .map(|descriptor| self.schema_for(descriptor))
            .transpose()
    }

    /// Get all component schemas
    pub fn schemas(&self) -> &BTreeMap<String, Value> {
        &self.schemas
    }

    pub fn into_schemas(self) -> BTreeMap<String, Value> {
        self.schemas
    }

    fn component(&mut self, id: &str, name: &str, schema: &Value) -> Result<Value> {
        if let Some(existing) = self.owners.get(id) {
            return Ok(reference_to(existing));
        }

        let schema = self.prepare(schema);
        if !is_complex(&schema) {
            return Ok(strip_title(schema));
        }

        let component_name = self.claim_name(id, name, Some(&schema));
        debug!("Registering component schema {} for {}", component_name, id);
        self.schemas.entry(component_name.clone()).or_insert(schema);
        Ok(reference_to(&component_name))
    }

    fn reference(&mut self, id: &str) -> Result<Value> {
        let owner = format!("ref:{}", id);
        if let Some(existing) = self.owners.get(&owner) {
            return Ok(reference_to(existing));
        }

        let descriptor = self
            .registry
            .get(id)
            .cloned()
            .ok_or_else(|| Error::UnknownSchema(id.to_string()))?;

        // Claimed before resolving so that self-referencing schemas terminate
        let component_name = self.claim_name(&owner, id, None);
        let schema = match &descriptor {
            TypeDescriptor::Component { schema, .. } => self.prepare(schema),
            other => self.schema_for(other)?,
        };
        debug!("Registering referenced schema {} as {}", id, component_name);
        self.schemas.insert(component_name.clone(), schema);
        Ok(reference_to(&component_name))
    }

    /// Removes `$schema`, promotes `$defs` into components and rewrites their references.
    ///
    /// A def is owned by its name and content, so the same nested type seen through several
    /// roots shares one component while a different type of the same name gets a suffix.
    fn prepare(&mut self, schema: &Value) -> Value {
        let mut schema = schema.clone();
        let mut renames = HashMap::new();

        if let Some(obj) = schema.as_object_mut() {
            obj.remove("$schema");
            if let Some(Value::Object(defs)) = obj.remove("$defs") {
                let mut promoted = Vec::with_capacity(defs.len());
                for (def_name, def_schema) in defs {
                    let owner = format!("def:{}:{}", def_name, def_schema);
                    let component_name = match self.owners.get(&owner) {
                        Some(existing) => existing.clone(),
                        None => {
                            let mut candidate = def_schema.clone();
                            rewrite_refs(&mut candidate, &HashMap::new());
                            self.claim_name(&owner, &def_name, Some(&candidate))
                        }
                    };
                    renames.insert(def_name, component_name.clone());
                    promoted.push((component_name, def_schema));
                }

                // Defs may point at each other, so references are rewritten once every name is known
                for (component_name, mut def_schema) in promoted {
                    rewrite_refs(&mut def_schema, &renames);
                    self.schemas.entry(component_name).or_insert(def_schema);
                }
            }
        }

        rewrite_refs(&mut schema, &renames);
        schema
    }

    /// Picks a component name for a type identity. A name already held by another schema gets
    /// a numeric suffix, unless that schema is the same as `schema`.
    fn claim_name(&mut self, owner: &str, name: &str, schema: Option<&Value>) -> String {
        let name = sanitize_name(name);

        let mut candidate = name.clone();
        let mut counter = 2;
        loop {
            let same = match (schema, self.schemas.get(&candidate)) {
                (Some(schema), Some(existing)) => same_schema(schema, existing),
                _ => false,
            };
            let taken = self.schemas.contains_key(&candidate)
                || self.owners.values().any(|owned| *owned == candidate);
            if same || !taken {
                break;
            }
            candidate = format!("{}{}", name, counter);
            counter += 1;
        }

        if candidate != name {
            warn!("Schema name {} is used by several types, registering {} as {}", name, owner, candidate);
        }
        self.owners.insert(owner.to_string(), candidate.clone());
        candidate
    }
}

fn reference_to(name: &str) -> Value {
    json!({ "$ref": format!("{}{}", COMPONENT_PREFIX, name) })
}

/// Object, enum and composed schemas become components; everything else is inlined.
fn is_complex(schema: &Value) -> bool {
    let Some(obj) = schema.as_object() else {
        return false;
    };
    obj.get("type").and_then(Value::as_str) == Some("object")
        || ["properties", "enum", "oneOf", "anyOf", "allOf"]
            .iter()
            .any(|key| obj.contains_key(*key))
}

fn strip_title(mut schema: Value) -> Value {
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("title");
    }
    schema
}

/// Component names may only contain `A-Z a-z 0-9 . - _`
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect()
}

/// Schemas equal apart from their top-level `title`
fn same_schema(a: &Value, b: &Value) -> bool {
    strip_title(a.clone()) == strip_title(b.clone())
}

/// Rewrites `#/$defs/X` references to `#/components/schemas/X`, recursively. Names found in
/// `renames` are replaced by their component name.
fn rewrite_refs(value: &mut Value, renames: &HashMap<String, String>) {
    match value {
        Value::Object(obj) => {
            if let Some(Value::String(reference)) = obj.get_mut("$ref") {
                if let Some(name) = reference.strip_prefix("#/$defs/") {
                    let name = renames.get(name).map(String::as_str).unwrap_or(name);
                    *reference = format!("{}{}", COMPONENT_PREFIX, name);
                }
            }
            for (_, v) in obj.iter_mut() {
                rewrite_refs(v, renames);
            }
        }
        Value::Array(items) => {
            for v in items.iter_mut() {
                rewrite_refs(v, renames);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documentation::{MultipartPart, ResponseDocs, RouteDocs};
    use crate::route_tree::HttpMethod;
    use schemars::JsonSchema;

    #[derive(JsonSchema)]
    #[allow(dead_code)]
    struct Profile {
        bio: String,
    }

    #[derive(JsonSchema)]
    #[allow(dead_code)]
    struct User {
        id: u32,
        name: String,
        profile: Profile,
    }

    #[derive(JsonSchema)]
    #[allow(dead_code)]
    enum Status {
        Active,
        Suspended,
    }

    fn context() -> SchemaContext {
        SchemaContext::new(BTreeMap::new())
    }

    #[test]
    fn test_struct_becomes_component_with_nested_defs() {
        let mut ctx = context();
        let schema = ctx.schema_for(&TypeDescriptor::of::<User>()).unwrap();

        assert_eq!(schema, json!({ "$ref": "#/components/schemas/User" }));
        let schemas = ctx.schemas();
        assert!(schemas.contains_key("User"));
        assert!(schemas.contains_key("Profile"));
        assert_eq!(
            schemas["User"]["properties"]["profile"]["$ref"],
            "#/components/schemas/Profile"
        );
        assert!(schemas["User"].get("$schema").is_none());
        assert!(schemas["User"].get("$defs").is_none());
    }

    #[test]
    fn test_same_type_is_registered_once() {
        let mut ctx = context();
        let first = ctx.schema_for(&TypeDescriptor::of::<User>()).unwrap();
        let second = ctx.schema_for(&TypeDescriptor::of::<User>()).unwrap();

        assert_eq!(first, second);
        assert_eq!(ctx.schemas().len(), 2);
    }

    #[test]
    fn test_nested_type_registered_directly_reuses_def_name() {
        let mut ctx = context();
        ctx.schema_for(&TypeDescriptor::of::<User>()).unwrap();
        let profile = ctx.schema_for(&TypeDescriptor::of::<Profile>()).unwrap();

        assert_eq!(profile, json!({ "$ref": "#/components/schemas/Profile" }));
        assert_eq!(ctx.schemas().len(), 2);
    }

    #[test]
    fn test_enum_becomes_component() {
        let mut ctx = context();
        let schema = ctx.schema_for(&TypeDescriptor::of::<Status>()).unwrap();
        assert_eq!(schema, json!({ "$ref": "#/components/schemas/Status" }));
    }

    #[test]
    fn test_primitives_are_inlined() {
        let mut ctx = context();
        let schema = ctx.schema_for(&TypeDescriptor::of::<String>()).unwrap();

        assert_eq!(schema, json!({ "type": "string" }));
        assert!(ctx.schemas().is_empty());
    }

    #[test]
    fn test_vec_of_struct_is_inline_array() {
        let mut ctx = context();
        let schema = ctx.schema_for(&TypeDescriptor::of::<Vec<User>>()).unwrap();

        assert_eq!(schema["type"], "array");
        assert_eq!(schema["items"]["$ref"], "#/components/schemas/User");
        assert!(ctx.schemas().contains_key("User"));
    }

    #[test]
    fn test_array_descriptor() {
        let mut ctx = context();
        let schema = ctx
            .schema_for(&TypeDescriptor::array(TypeDescriptor::of::<User>()))
            .unwrap();
        assert_eq!(
            schema,
            json!({ "type": "array", "items": { "$ref": "#/components/schemas/User" } })
        );
    }

    #[test]
    fn test_name_collision_gets_suffix() {
        let mut ctx = context();
        let first = TypeDescriptor::Component {
            id: "a::Item".into(),
            name: "Item".into(),
            schema: json!({ "type": "object", "properties": { "a": { "type": "string" } } }),
        };
        let second = TypeDescriptor::Component {
            id: "b::Item".into(),
            name: "Item".into(),
            schema: json!({ "type": "object", "properties": { "b": { "type": "string" } } }),
        };

        assert_eq!(ctx.schema_for(&first).unwrap()["$ref"], "#/components/schemas/Item");
        assert_eq!(ctx.schema_for(&second).unwrap()["$ref"], "#/components/schemas/Item2");
        assert!(ctx.schemas()["Item2"]["properties"]["b"].is_object());
    }

    #[test]
    fn test_registry_reference() {
        let mut registry = BTreeMap::new();
        registry.insert(
            "Error".to_string(),
            TypeDescriptor::inline(json!({ "type": "object", "properties": { "message": { "type": "string" } } })),
        );
        let mut ctx = SchemaContext::new(registry);

        let schema = ctx.schema_for(&TypeDescriptor::reference("Error")).unwrap();
        assert_eq!(schema, json!({ "$ref": "#/components/schemas/Error" }));
        assert_eq!(ctx.schemas()["Error"]["type"], "object");
    }

    #[test]
    fn test_registry_reference_does_not_replace_component_of_same_name() {
        let mut registry = BTreeMap::new();
        registry.insert(
            "Error".to_string(),
            TypeDescriptor::inline(json!({ "type": "object", "properties": { "registry": { "type": "string" } } })),
        );
        let mut ctx = SchemaContext::new(registry);
        let component = TypeDescriptor::named(
            "Error",
            json!({ "type": "object", "properties": { "component": { "type": "string" } } }),
        );

        assert_eq!(ctx.schema_for(&component).unwrap()["$ref"], "#/components/schemas/Error");
        assert_eq!(
            ctx.schema_for(&TypeDescriptor::reference("Error")).unwrap()["$ref"],
            "#/components/schemas/Error2"
        );
        assert!(ctx.schemas()["Error"]["properties"]["component"].is_object());
        assert!(ctx.schemas()["Error2"]["properties"]["registry"].is_object());

        // Both keep their names on later lookups
        assert_eq!(ctx.schema_for(&component).unwrap()["$ref"], "#/components/schemas/Error");
        assert_eq!(
            ctx.schema_for(&TypeDescriptor::reference("Error")).unwrap()["$ref"],
            "#/components/schemas/Error2"
        );
    }

    fn outer(id: &str, inner_property: &str) -> TypeDescriptor {
        TypeDescriptor::Component {
            id: id.into(),
            name: id.rsplit("::").next().unwrap_or(id).into(),
            schema: json!({
                "type": "object",
                "properties": { "inner": { "$ref": "#/$defs/Inner" } },
                "$defs": {
                    "Inner": { "type": "object", "properties": { inner_property: { "type": "string" } } }
                }
            }),
        }
    }

    #[test]
    fn test_type_named_like_a_promoted_def_gets_suffix() {
        let mut ctx = context();
        ctx.schema_for(&outer("a::Outer", "a")).unwrap();
        let inner = TypeDescriptor::Component {
            id: "b::Inner".into(),
            name: "Inner".into(),
            schema: json!({ "type": "object", "properties": { "b": { "type": "integer" } } }),
        };

        assert_eq!(ctx.schema_for(&inner).unwrap()["$ref"], "#/components/schemas/Inner2");
        let schemas = ctx.schemas();
        assert_eq!(schemas["Outer"]["properties"]["inner"]["$ref"], "#/components/schemas/Inner");
        assert!(schemas["Inner"]["properties"]["a"].is_object());
        assert!(schemas["Inner2"]["properties"]["b"].is_object());
    }

    #[test]
    fn test_differing_defs_of_same_name_are_kept_apart() {
        let mut ctx = context();
        ctx.schema_for(&outer("a::Outer", "a")).unwrap();
        ctx.schema_for(&outer("b::Other", "b")).unwrap();

        let schemas = ctx.schemas();
        assert_eq!(schemas["Outer"]["properties"]["inner"]["$ref"], "#/components/schemas/Inner");
        assert_eq!(schemas["Other"]["properties"]["inner"]["$ref"], "#/components/schemas/Inner2");
        assert!(schemas["Inner"]["properties"]["a"].is_object());
        assert!(schemas["Inner2"]["properties"]["b"].is_object());
    }

    #[test]
    fn test_equal_defs_share_one_component() {
        let mut ctx = context();
        ctx.schema_for(&outer("a::Outer", "a")).unwrap();
        ctx.schema_for(&outer("b::Other", "a")).unwrap();

        let names: Vec<_> = ctx.schemas().keys().cloned().collect();
        assert_eq!(names, vec!["Inner", "Other", "Outer"]);
        assert_eq!(ctx.schemas()["Other"]["properties"]["inner"]["$ref"], "#/components/schemas/Inner");
    }

    #[test]
    fn test_unknown_reference_fails() {
        let mut ctx = context();
        let err = ctx.schema_for(&TypeDescriptor::reference("Missing")).unwrap_err();
        assert!(matches!(err, Error::UnknownSchema(id) if id == "Missing"));
    }

    #[test]
    fn test_self_referencing_registry_entry_terminates() {
        let mut registry = BTreeMap::new();
        registry.insert(
            "Node".to_string(),
            TypeDescriptor::array(TypeDescriptor::reference("Node")),
        );
        let mut ctx = SchemaContext::new(registry);

        ctx.schema_for(&TypeDescriptor::reference("Node")).unwrap();
        assert_eq!(ctx.schemas()["Node"]["items"]["$ref"], "#/components/schemas/Node");
    }

    #[test]
    fn test_multipart_body_schema() {
        let mut ctx = context();
        let mut optional = MultipartPart::new("note", TypeDescriptor::string());
        optional.required = Some(false);
        let body = BodyDocs::multipart(vec![
            MultipartPart::new("file", TypeDescriptor::inline(json!({ "type": "string", "format": "binary" }))),
            optional,
        ]);

        let schema = ctx.body_schema(&body).unwrap().unwrap();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["file"]["format"], "binary");
        assert_eq!(schema["required"], json!(["file"]));
    }

    #[test]
    fn test_collect_walks_all_route_types() {
        let docs = RouteDocs::new()
            .body(BodyDocs::of::<User>())
            .response("200", ResponseDocs::new("ok").body(BodyDocs::of::<Status>()));
        let routes = vec![RouteMeta::new(HttpMethod::Post, "/users", docs)];

        let mut ctx = context();
        ctx.collect(&routes).unwrap();
        let names: Vec<_> = ctx.schemas().keys().cloned().collect();
        assert_eq!(names, vec!["Profile", "Status", "User"]);
    }
}
