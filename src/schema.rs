//! Schema descriptors advertised to the host.
//!
//! Each resource and data source declares its attributes with their type,
//! whether the user must, may or cannot set them, and the plan modifiers
//! the host should apply.

use std::collections::BTreeMap;

use serde::Serialize;

/// Attribute value types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Int64,
    Float64,
    Bool,
    /// A JSON document compared structurally.
    Json,
    List(Box<AttributeType>),
    Set(Box<AttributeType>),
    Map(Box<AttributeType>),
    Object(BTreeMap<String, Attribute>),
}

impl AttributeType {
    #[must_use]
    pub fn list(element_type: AttributeType) -> Self {
        Self::List(Box::new(element_type))
    }

    #[must_use]
    pub fn set(element_type: AttributeType) -> Self {
        Self::Set(Box::new(element_type))
    }

    #[must_use]
    pub fn map(element_type: AttributeType) -> Self {
        Self::Map(Box::new(element_type))
    }

    pub fn object<I, K>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, Attribute)>,
        K: Into<String>,
    {
        Self::Object(
            attributes
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect(),
        )
    }
}

/// Whether the user must, may or cannot set an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Required,
    Optional,
    Computed,
    OptionalComputed,
}

/// A single attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    pub presence: Presence,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
    /// Changing the value destroys and recreates the resource.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub requires_replace: bool,
    /// Keep the prior state value in plans while the attribute is unknown.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub use_state_for_unknown: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Attribute {
    #[must_use]
    pub fn new(attr_type: AttributeType, presence: Presence) -> Self {
        Self {
            attr_type,
            presence,
            sensitive: false,
            requires_replace: false,
            use_state_for_unknown: false,
            deprecated: None,
            description: String::new(),
        }
    }

    #[must_use]
    pub fn required(attr_type: AttributeType) -> Self {
        Self::new(attr_type, Presence::Required)
    }

    #[must_use]
    pub fn optional(attr_type: AttributeType) -> Self {
        Self::new(attr_type, Presence::Optional)
    }

    #[must_use]
    pub fn computed(attr_type: AttributeType) -> Self {
        Self::new(attr_type, Presence::Computed)
    }

    #[must_use]
    pub fn optional_computed(attr_type: AttributeType) -> Self {
        Self::new(attr_type, Presence::OptionalComputed)
    }

    #[must_use]
    pub fn required_string() -> Self {
        Self::required(AttributeType::String)
    }

    #[must_use]
    pub fn optional_string() -> Self {
        Self::optional(AttributeType::String)
    }

    #[must_use]
    pub fn computed_string() -> Self {
        Self::computed(AttributeType::String)
    }

    /// The canonical `id` attribute, stable once assigned.
    #[must_use]
    pub fn id() -> Self {
        Self::computed_string().with_state_for_unknown()
    }

    /// The `organization` attribute every resource is scoped by.
    #[must_use]
    pub fn organization() -> Self {
        Self::required_string()
            .with_requires_replace()
            .with_description("The slug of the organization the resource belongs to.")
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_requires_replace(mut self) -> Self {
        self.requires_replace = true;
        self
    }

    #[must_use]
    pub fn with_state_for_unknown(mut self) -> Self {
        self.use_state_for_unknown = true;
        self
    }

    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    #[must_use]
    pub fn deprecated(mut self, message: impl Into<String>) -> Self {
        self.deprecated = Some(message.into());
        self
    }
}

/// A resource, data source or provider configuration schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub version: u64,
    pub attributes: BTreeMap<String, Attribute>,
}

impl Schema {
    #[must_use]
    pub fn new(version: u64) -> Self {
        Self {
            version,
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn v0() -> Self {
        Self::new(0)
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.attributes.insert(name.into(), attr);
        self
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_constructors() {
        let id = Attribute::id();
        assert_eq!(id.presence, Presence::Computed);
        assert!(id.use_state_for_unknown);

        let org = Attribute::organization();
        assert_eq!(org.presence, Presence::Required);
        assert!(org.requires_replace);

        let token = Attribute::optional_string().sensitive();
        assert!(token.sensitive);
    }

    #[test]
    fn test_schema_builder() {
        let schema = Schema::new(2)
            .with_attribute("id", Attribute::id())
            .with_attribute(
                "tags",
                Attribute::optional(AttributeType::set(AttributeType::String)),
            );
        assert_eq!(schema.version, 2);
        assert!(schema.attribute("tags").is_some());
        assert!(schema.attribute("missing").is_none());
    }
}
