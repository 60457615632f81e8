use super::errors::MetadataError;
use super::schema::{
    EdmSchema, EntityTypeSchema, FunctionImportSchema, NavigationSchema, ParameterSchema,
    PropertyMap, PropertySchema,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Schema definition loading.
///
/// Schema definitions are written in YAML with the following structure:
///
/// ```yaml
/// name: sample_sales            # Definition name (optional)
/// namespace: GWSAMPLE_BASIC     # Schema namespace, qualifies type names
/// entity_types:
///   - name: SalesOrder
///     properties:
///       SalesOrderID: { type: Edm.String }
///       GrossAmount: { type: Edm.Decimal }
///       CreatedAt: { type: Edm.DateTimeOffset, v2_type: Edm.DateTime }
///     navigations:
///       SO_2_BP: { target: BusinessPartner }
///       SO_2_ITEMS: { target: SalesOrderItem, collection: true }
/// entity_sets:
///   SalesOrderList: SalesOrder  # Set name → entity type
/// function_imports:
///   - name: SalesOrder_Confirm
///     http_method: POST
///     parameters:
///       - { name: SalesOrderID, type: Edm.String }
/// ```
///
/// Navigation targets and entity-set types may be unqualified (qualified
/// against `namespace` while building) or fully qualified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdmSchemaConfig {
    /// Optional definition name (used in error context)
    #[serde(default)]
    pub name: Option<String>,
    /// Schema namespace
    pub namespace: String,
    /// Entity and complex type definitions
    pub entity_types: Vec<EntityTypeDefinition>,
    /// Entity container: set name → type name
    #[serde(default)]
    pub entity_sets: HashMap<String, String>,
    /// Entity container: function imports
    #[serde(default)]
    pub function_imports: Vec<FunctionImportDefinition>,
}

/// Entity type definition in a schema config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityTypeDefinition {
    /// Unqualified type name
    pub name: String,
    /// Property name → type definition
    pub properties: HashMap<String, PropertyDefinition>,
    /// Navigation property name → target definition
    #[serde(default)]
    pub navigations: HashMap<String, NavigationDefinition>,
}

/// Property type definition in a schema config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDefinition {
    #[serde(rename = "type")]
    pub edm_type: String,
    #[serde(default)]
    pub v2_type: Option<String>,
}

/// Navigation property definition in a schema config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationDefinition {
    /// Target entity type name
    pub target: String,
    /// Whether the navigation fans out to a collection
    #[serde(default)]
    pub collection: bool,
}

/// Function import definition in a schema config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionImportDefinition {
    pub name: String,
    #[serde(default = "default_http_method")]
    pub http_method: String,
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
}

/// Function import parameter definition in a schema config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub edm_type: String,
    #[serde(default)]
    pub v2_type: Option<String>,
    #[serde(default)]
    pub collection: bool,
}

fn default_http_method() -> String {
    "GET".to_string()
}

impl EdmSchemaConfig {
    /// Parse a schema definition from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self, MetadataError> {
        serde_yaml::from_str(content).map_err(|e| MetadataError::ConfigParseError {
            error: e.to_string(),
        })
    }

    /// Load a schema definition from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, MetadataError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            MetadataError::ConfigReadError {
                error: format!("{}: {}", path.as_ref().display(), e),
            }
        })?;
        Self::from_yaml_str(&content)
    }

    /// Build the resolvable schema, validating structural references.
    ///
    /// Checks that navigation targets and entity-set types name defined
    /// entity types and that no qualified type name is defined twice.
    pub fn into_schema(self) -> Result<EdmSchema, MetadataError> {
        let context = format!(
            "While building schema `{}`",
            self.name.as_deref().unwrap_or(&self.namespace)
        );
        let namespace = self.namespace;
        let qualify = |name: &str| -> String {
            if name.contains('.') {
                name.to_string()
            } else {
                format!("{}.{}", namespace, name)
            }
        };

        let mut entity_types = HashMap::new();
        for definition in self.entity_types {
            let qualified = qualify(&definition.name);
            let properties: PropertyMap = definition
                .properties
                .into_iter()
                .map(|(name, p)| {
                    (
                        name,
                        PropertySchema {
                            edm_type: p.edm_type,
                            v2_type: p.v2_type,
                        },
                    )
                })
                .collect();
            let navigations = definition
                .navigations
                .into_iter()
                .map(|(name, n)| {
                    (
                        name,
                        NavigationSchema {
                            target_type: qualify(&n.target),
                            collection: n.collection,
                        },
                    )
                })
                .collect();
            let previous = entity_types.insert(
                qualified.clone(),
                EntityTypeSchema {
                    name: qualified.clone(),
                    properties,
                    navigations,
                },
            );
            if previous.is_some() {
                return Err(MetadataError::invalid_config_with_context(
                    format!("entity type `{}` is defined twice", qualified),
                    context,
                ));
            }
        }

        for entity_type in entity_types.values() {
            for (navigation, target) in &entity_type.navigations {
                if !entity_types.contains_key(&target.target_type) {
                    return Err(MetadataError::invalid_config_with_context(
                        format!(
                            "navigation `{}` of `{}` targets unknown type `{}`",
                            navigation, entity_type.name, target.target_type
                        ),
                        context,
                    ));
                }
            }
        }

        let mut entity_sets = HashMap::new();
        for (set, type_name) in self.entity_sets {
            let qualified = qualify(&type_name);
            if !entity_types.contains_key(&qualified) {
                return Err(MetadataError::invalid_config_with_context(
                    format!("entity set `{}` names unknown type `{}`", set, qualified),
                    context,
                ));
            }
            entity_sets.insert(set, qualified);
        }

        let mut function_imports = HashMap::new();
        for import in self.function_imports {
            let parameters = import
                .parameters
                .into_iter()
                .map(|p| ParameterSchema {
                    name: p.name,
                    property: PropertySchema {
                        edm_type: p.edm_type,
                        v2_type: p.v2_type,
                    },
                    collection: p.collection,
                })
                .collect();
            function_imports.insert(
                import.name.clone(),
                FunctionImportSchema {
                    name: import.name,
                    http_method: import.http_method,
                    return_type: import.return_type.map(|t| qualify(&t)),
                    parameters,
                },
            );
        }

        Ok(EdmSchema {
            namespace,
            entity_types,
            entity_sets,
            function_imports,
        })
    }
}
