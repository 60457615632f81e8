use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Type descriptor for a single property.
///
/// Carries the protocol-neutral type name and, where the V2 service models
/// the property with a type V4 no longer has (`Edm.DateTime`,
/// `Edm.Time`), the V2 override used when formatting URL literals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PropertySchema {
    /// Protocol-neutral type name, e.g. "Edm.DateTimeOffset"
    pub edm_type: String,
    /// Optional V2-specific override, e.g. "Edm.DateTime"
    pub v2_type: Option<String>,
}

impl PropertySchema {
    pub fn new(edm_type: impl Into<String>) -> Self {
        PropertySchema {
            edm_type: edm_type.into(),
            v2_type: None,
        }
    }

    pub fn with_v2_type(edm_type: impl Into<String>, v2_type: impl Into<String>) -> Self {
        PropertySchema {
            edm_type: edm_type.into(),
            v2_type: Some(v2_type.into()),
        }
    }

    /// Type name the older protocol uses for this property in URL literals.
    pub fn v2_type_name(&self) -> &str {
        self.v2_type.as_deref().unwrap_or(&self.edm_type)
    }
}

/// Property name → descriptor map of one entity/complex type.
pub type PropertyMap = HashMap<String, PropertySchema>;

/// Navigation property: points at another entity type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationSchema {
    /// Qualified name of the target entity type
    pub target_type: String,
    /// Whether the navigation fans out to a collection
    pub collection: bool,
}

/// One entity or complex type of the schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityTypeSchema {
    /// Qualified type name, e.g. "GWSAMPLE_BASIC.SalesOrder"
    pub name: String,
    pub properties: PropertyMap,
    pub navigations: HashMap<String, NavigationSchema>,
}

/// Declared parameter of a function import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSchema {
    pub name: String,
    pub property: PropertySchema,
    /// Collection-valued parameters exist in V4 but have no V2 representation
    pub collection: bool,
}

/// Function import of the entity container.
///
/// V2 services pass all parameters as URL query options; the declared HTTP
/// method (`sap:action-for` style imports use POST) is surfaced so the HTTP
/// layer can pick the verb.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionImportSchema {
    pub name: String,
    pub http_method: String,
    pub return_type: Option<String>,
    pub parameters: Vec<ParameterSchema>,
}

impl FunctionImportSchema {
    pub fn parameter(&self, name: &str) -> Option<&ParameterSchema> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// The loaded entity data model: types plus the entity container
/// (entity sets and function imports).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdmSchema {
    pub namespace: String,
    /// Keyed by qualified type name
    pub entity_types: HashMap<String, EntityTypeSchema>,
    /// Entity set name → qualified type name
    pub entity_sets: HashMap<String, String>,
    pub function_imports: HashMap<String, FunctionImportSchema>,
}

impl EdmSchema {
    pub fn entity_type(&self, qualified_name: &str) -> Option<&EntityTypeSchema> {
        self.entity_types.get(qualified_name)
    }

    pub fn entity_set_type(&self, entity_set: &str) -> Option<&EntityTypeSchema> {
        self.entity_types.get(self.entity_sets.get(entity_set)?)
    }

    pub fn function_import(&self, name: &str) -> Option<&FunctionImportSchema> {
        self.function_imports.get(name)
    }

    /// Resolve a slash-separated property path against a resource path.
    ///
    /// `meta_path` names the entity set a request addresses, optionally
    /// followed by navigation segments (`SalesOrderList` or
    /// `SalesOrderList/SO_2_BP`). `property_path` walks further navigations
    /// and ends on a property (`SO_2_BP/CompanyName`). Returns `None` when
    /// any segment is unknown.
    pub fn resolve_property(&self, meta_path: &str, property_path: &str) -> Option<&PropertySchema> {
        let mut segments = meta_path.trim_matches('/').split('/');
        let mut current = self.entity_set_type(segments.next()?)?;
        for nav in segments {
            current = self.navigation_target(current, nav)?;
        }

        let mut walk = property_path.trim_matches('/').split('/').peekable();
        while let Some(segment) = walk.next() {
            if walk.peek().is_none() {
                return current.properties.get(segment);
            }
            current = self.navigation_target(current, segment)?;
        }
        None
    }

    fn navigation_target(
        &self,
        from: &EntityTypeSchema,
        navigation: &str,
    ) -> Option<&EntityTypeSchema> {
        self.entity_type(&from.navigations.get(navigation)?.target_type)
    }
}
