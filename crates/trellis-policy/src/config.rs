//! ACL document schema.
//!
//! An `AclConfig` is deserialized from TOML and lists entities with their
//! permissions and parent IDs. Parents are referenced by ID and may be
//! declared before or after the entities that inherit from them.
//!
//! Example:
//! ```toml
//! [[entities]]
//! id = "staff"
//!
//! [[entities.permissions]]
//! action = "read"
//! resource = "wiki"
//!
//! [[entities]]
//! id = "alice"
//! parents = ["staff"]
//! ```

use serde::{Deserialize, Serialize};

use trellis_contracts::GenericPermission;

/// The top-level structure deserialized from a TOML ACL file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AclConfig {
    /// Entities in declaration order.
    #[serde(default)]
    pub entities: Vec<EntityConfig>,
}

/// One entity declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Case-insensitive identifier. Repeated IDs merge into one entity.
    pub id: String,

    /// IDs of direct parents, linked in this order.
    #[serde(default)]
    pub parents: Vec<String>,

    /// Permissions granted directly to this entity, in match order.
    #[serde(default)]
    pub permissions: Vec<PermissionConfig>,
}

/// One permission declaration. `"*"` is the wildcard for both fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionConfig {
    pub action: String,
    pub resource: String,

    /// Omitted means `true`.
    #[serde(default = "default_allow")]
    pub allow: bool,
}

fn default_allow() -> bool {
    true
}

impl PermissionConfig {
    /// Build the `GenericPermission` this declaration describes.
    pub fn to_permission(&self) -> GenericPermission {
        GenericPermission::new(self.action.clone(), self.resource.clone(), self.allow)
    }
}
