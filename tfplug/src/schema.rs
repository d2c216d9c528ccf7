//! Schema types and builders for tfplug
//!
//! Providers, resources and data sources describe their attributes with
//! [`SchemaBuilder`] and [`AttributeBuilder`].

use std::collections::HashMap;

/// AttributeType mirrors Terraform's type system
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number,
    Bool,
    List(Box<AttributeType>),
    Set(Box<AttributeType>),
    Map(Box<AttributeType>),
    Object(HashMap<String, AttributeType>),
}

impl AttributeType {
    pub fn list_of(element: AttributeType) -> Self {
        AttributeType::List(Box::new(element))
    }

    pub fn object<'a>(fields: impl IntoIterator<Item = (&'a str, AttributeType)>) -> Self {
        AttributeType::Object(
            fields
                .into_iter()
                .map(|(name, ty)| (name.to_string(), ty))
                .collect(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct Schema {
    pub version: i64,
    pub block: Block,
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.block.attributes.iter().find(|attr| attr.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct Block {
    pub attributes: Vec<Attribute>,
    pub description: String,
    pub deprecated: bool,
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub deprecated: bool,
}

/// AttributeBuilder provides a fluent API for building attributes
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                deprecated: false,
            },
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.attribute.deprecated = true;
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// SchemaBuilder provides a fluent API for building schemas
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            schema: Schema {
                version: 0,
                block: Block {
                    attributes: Vec::new(),
                    description: String::new(),
                    deprecated: false,
                },
            },
        }
    }

    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema.block.attributes.push(attr);
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.schema.block.description = desc.to_string();
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.schema.block.deprecated = true;
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_builder_creates_required_string() {
        let attr = AttributeBuilder::new("name", AttributeType::String)
            .description("The name of the resource")
            .required()
            .build();

        assert_eq!(attr.name, "name");
        assert!(matches!(attr.r#type, AttributeType::String));
        assert!(attr.required);
        assert!(!attr.optional);
        assert_eq!(attr.description, "The name of the resource");
    }

    #[test]
    fn schema_builder_creates_schema_with_attributes() {
        let schema = SchemaBuilder::new()
            .version(1)
            .description("Test resource schema")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("password", AttributeType::String)
                    .required()
                    .sensitive()
                    .build(),
            )
            .build();

        assert_eq!(schema.version, 1);
        assert_eq!(schema.block.attributes.len(), 2);
        assert!(schema.attribute("password").unwrap().sensitive);
        assert!(schema.attribute("missing").is_none());
    }

    #[test]
    fn list_of_objects_type() {
        let ty = AttributeType::list_of(AttributeType::object([
            ("key", AttributeType::String),
            ("value", AttributeType::String),
        ]));

        match ty {
            AttributeType::List(element) => match *element {
                AttributeType::Object(fields) => {
                    assert_eq!(fields.len(), 2);
                    assert_eq!(fields.get("key"), Some(&AttributeType::String));
                }
                other => panic!("Expected Object element, got {:?}", other),
            },
            other => panic!("Expected List type, got {:?}", other),
        }
    }
}
