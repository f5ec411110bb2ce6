//! Endpoint tables for the record screens served by the backend

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};

use super::models::{RecordId, RecordPatch};

/// Stable key of a cached collection, shared by every screen showing it
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which record-management screen a resource belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    SubModules,
    ControlFamilies,
}

impl ResourceKind {
    pub fn resource(self) -> Resource {
        match self {
            ResourceKind::SubModules => Resource::sub_modules(),
            ResourceKind::ControlFamilies => Resource::control_families(),
        }
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "submodules" | "sub-modules" | "submodule" => Ok(ResourceKind::SubModules),
            "control-families" | "controlfamilies" | "control-family" => {
                Ok(ResourceKind::ControlFamilies)
            }
            other => Err(format!("Unknown resource: {}", other)),
        }
    }
}

/// Everything a screen needs to know to list, update and delete one kind of
/// record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub kind: ResourceKind,
    pub cache_key: CacheKey,
    /// Lower-case noun used in prompts and error toasts ("sub-module")
    pub noun: &'static str,
    /// Title-case noun used in progress and success toasts ("Sub-Module")
    pub title: &'static str,
    pub list_path: &'static str,
    pub update_path: &'static str,
    pub delete_path: &'static str,
}

impl Resource {
    pub fn sub_modules() -> Self {
        Self {
            kind: ResourceKind::SubModules,
            cache_key: CacheKey::new("allSubModulesData"),
            noun: "sub-module",
            title: "Sub-Module",
            list_path: "/submodule-master/get-all-submodules",
            update_path: "/submodule-master/update-submodule",
            delete_path: "/submodule-master/delete-submodule",
        }
    }

    pub fn control_families() -> Self {
        Self {
            kind: ResourceKind::ControlFamilies,
            cache_key: CacheKey::new("allControlFamilyData"),
            noun: "control",
            title: "Control",
            list_path: "/control-family-master/get-all-control-families",
            update_path: "/control-family-master/update-control-family",
            delete_path: "/control-family-master/delete-control-family",
        }
    }

    /// Whether records of this resource carry an editable display name
    pub fn has_display_name(&self) -> bool {
        matches!(self.kind, ResourceKind::SubModules)
    }

    /// Request body for an update call
    pub fn update_body(&self, patch: &RecordPatch, customer_id: i64) -> Value {
        match self.kind {
            ResourceKind::SubModules => json!({
                "id": patch.id.0,
                "submodule_name": patch.name,
                "display_submodule_name": patch
                    .display_name
                    .clone()
                    .unwrap_or_else(|| patch.name.clone()),
                "submodule_desc": patch.description,
                "customer_id": customer_id,
            }),
            ResourceKind::ControlFamilies => json!({
                "id": patch.id.0,
                "control_family_name": patch.name,
                "control_family_desc": patch.description,
                "customer_id": customer_id,
            }),
        }
    }

    /// Request body for a delete call
    pub fn delete_body(&self, id: RecordId, customer_id: i64) -> Value {
        json!({ "id": id.0, "customer_id": customer_id })
    }
}
