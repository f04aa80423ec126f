//! Tag-based registry of entity constructors
//!
//! A [`Factory`] maps a type tag to a [`Builder`]. Specs arrive as
//! `{"type": <tag>, "data": {...}}`; the builder registered under the tag
//! turns the data into a value or reports why it cannot.

use std::collections::BTreeMap;
use std::fmt;

use ahash::AHashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::{EcoError, Result};
use crate::core::types::SimRng;
use crate::entity::selection::StrategyHandle;

/// `{"type": ..., "data": ...}` description of something to build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl EntitySpec {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            data: serde_json::Value::Null,
        }
    }

    pub fn with_data(kind: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }
}

/// What a builder may use besides its data
pub struct BuildContext<'a> {
    pub strategies: &'a Factory<StrategyHandle>,
    pub rng: &'a mut SimRng,
    pub config: &'a SimulationConfig,
}

pub type BuildFn<T> = Box<dyn Fn(&serde_json::Value, &mut BuildContext<'_>) -> Result<T> + Send + Sync>;

/// Constructor for one type tag
pub struct Builder<T> {
    tag: String,
    description: String,
    fields: BTreeMap<String, String>,
    build: BuildFn<T>,
}

impl<T> Builder<T> {
    pub fn new<F>(tag: &str, description: &str, build: F) -> Result<Self>
    where
        F: Fn(&serde_json::Value, &mut BuildContext<'_>) -> Result<T> + Send + Sync + 'static,
    {
        if tag.trim().is_empty() || description.trim().is_empty() {
            return Err(EcoError::invalid("builder tag and description must not be blank"));
        }
        Ok(Self {
            tag: tag.to_string(),
            description: description.to_string(),
            fields: BTreeMap::new(),
            build: Box::new(build),
        })
    }

    /// Document an accepted data field
    pub fn field(mut self, name: &str, doc: &str) -> Self {
        self.fields.insert(name.to_string(), doc.to_string());
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn info(&self) -> BuilderInfo {
        BuilderInfo {
            tag: self.tag.clone(),
            description: self.description.clone(),
            data: self.fields.clone(),
        }
    }

    pub fn build(&self, data: &serde_json::Value, ctx: &mut BuildContext<'_>) -> Result<T> {
        (self.build)(data, ctx)
    }
}

impl<T> fmt::Debug for Builder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("tag", &self.tag)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Listing entry for a registered builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderInfo {
    #[serde(rename = "type")]
    pub tag: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub data: BTreeMap<String, String>,
}

/// Registry of builders for one kind of entity
#[derive(Debug)]
pub struct Factory<T> {
    kind: String,
    builders: AHashMap<String, Builder<T>>,
    /// Tags in registration order
    order: Vec<String>,
}

impl<T> Factory<T> {
    /// Empty factory; `kind` names the entities in error messages
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            builders: AHashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn register(&mut self, builder: Builder<T>) -> Result<()> {
        if self.builders.contains_key(builder.tag()) {
            return Err(EcoError::DuplicateType {
                kind: self.kind.clone(),
                tag: builder.tag().to_string(),
            });
        }
        self.order.push(builder.tag().to_string());
        self.builders.insert(builder.tag().to_string(), builder);
        Ok(())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.builders.contains_key(tag)
    }

    pub fn tags(&self) -> &[String] {
        &self.order
    }

    /// Builder listings in registration order
    pub fn info(&self) -> Vec<BuilderInfo> {
        self.order
            .iter()
            .filter_map(|tag| self.builders.get(tag))
            .map(Builder::info)
            .collect()
    }

    pub fn create(&self, spec: &EntitySpec, ctx: &mut BuildContext<'_>) -> Result<T> {
        let builder = self
            .builders
            .get(&spec.kind)
            .ok_or_else(|| EcoError::unknown_type(&self.kind, &spec.kind))?;
        builder.build(&spec.data, ctx)
    }
}

/// Deserialize builder data, treating a missing `data` as an empty object
pub fn parse_data<D>(data: &serde_json::Value) -> Result<D>
where
    D: DeserializeOwned + Default,
{
    if data.is_null() {
        return Ok(D::default());
    }
    Ok(D::deserialize(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use serde_json::json;

    fn numbers() -> Factory<f64> {
        let mut factory = Factory::new("number");
        factory
            .register(
                Builder::new("const", "A constant", |data, _ctx| {
                    data.get("value")
                        .and_then(|v| v.as_f64())
                        .ok_or_else(|| EcoError::MissingField {
                            field: "value".into(),
                            context: "const".into(),
                        })
                })
                .unwrap()
                .field("value", "the number"),
            )
            .unwrap();
        factory
    }

    #[test]
    fn test_create_dispatches_on_tag() {
        let factory = numbers();
        let strategies = Factory::new("strategy");
        let config = SimulationConfig::default();
        let mut rng = SimRng::seed_from_u64(1);
        let mut ctx = BuildContext {
            strategies: &strategies,
            rng: &mut rng,
            config: &config,
        };

        let spec = EntitySpec::with_data("const", json!({ "value": 4.5 }));
        assert_eq!(factory.create(&spec, &mut ctx).unwrap(), 4.5);

        let missing = factory.create(&EntitySpec::new("const"), &mut ctx);
        assert!(matches!(missing, Err(EcoError::MissingField { .. })));

        let unknown = factory.create(&EntitySpec::new("random"), &mut ctx);
        assert!(matches!(unknown, Err(EcoError::UnknownType { ref tag, .. }) if tag == "random"));
    }

    #[test]
    fn test_duplicate_tags_are_rejected() {
        let mut factory = numbers();
        let again = Builder::new("const", "Another constant", |_, _| Ok(1.0)).unwrap();
        assert!(matches!(
            factory.register(again),
            Err(EcoError::DuplicateType { .. })
        ));
        assert_eq!(factory.tags(), &["const".to_string()]);
    }

    #[test]
    fn test_blank_builder_is_rejected() {
        assert!(Builder::<f64>::new(" ", "desc", |_, _| Ok(0.0)).is_err());
        assert!(Builder::<f64>::new("tag", "", |_, _| Ok(0.0)).is_err());
    }

    #[test]
    fn test_info_lists_fields() {
        let info = numbers().info();
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].tag, "const");
        assert_eq!(info[0].data.get("value").map(String::as_str), Some("the number"));

        let value = serde_json::to_value(&info[0]).unwrap();
        assert_eq!(value["type"], "const");
        assert_eq!(value["desc"], "A constant");
    }

    #[test]
    fn test_spec_data_defaults_to_null() {
        let spec: EntitySpec = serde_json::from_str(r#"{"type": "first"}"#).unwrap();
        assert_eq!(spec.kind, "first");
        assert!(spec.data.is_null());
    }
}
