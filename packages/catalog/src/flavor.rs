use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-form key/value attributes attached to a flavor.
pub type ExtraSpecs = BTreeMap<String, String>;

/// A compute resource template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flavor {
    /// Catalog-internal identity, assigned by the store.
    pub id: i32,
    /// External identifier, unique among non-deleted flavors.
    pub flavorid: String,
    pub name: String,
    pub memory_mb: i32,
    pub vcpus: i32,
    pub root_gb: i32,
    pub ephemeral_gb: i32,
    pub swap: i32,
    pub rxtx_factor: f64,
    pub vcpu_weight: Option<i32>,
    pub is_public: bool,
    pub disabled: bool,
    #[serde(default)]
    pub extra_specs: ExtraSpecs,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted: bool,
}

impl Default for Flavor {
    fn default() -> Self {
        Self {
            id: 0,
            flavorid: String::new(),
            name: String::new(),
            memory_mb: 0,
            vcpus: 0,
            root_gb: 0,
            ephemeral_gb: 0,
            swap: 0,
            rxtx_factor: 1.0,
            vcpu_weight: None,
            is_public: true,
            disabled: false,
            extra_specs: ExtraSpecs::new(),
            created_at: None,
            updated_at: None,
            deleted_at: None,
            deleted: false,
        }
    }
}

/// Validated attributes of a flavor that has not been stored yet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewFlavor {
    pub name: String,
    pub flavorid: String,
    pub memory_mb: i32,
    pub vcpus: i32,
    pub root_gb: i32,
    pub ephemeral_gb: i32,
    pub swap: i32,
    pub rxtx_factor: f64,
    pub is_public: bool,
}

/// A project granted access to a flavor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorAccess {
    pub flavorid: String,
    pub project_id: String,
}

/// A loosely typed input value for a numeric or boolean flavor attribute.
///
/// Requests may carry numbers as text; the validator decides whether a
/// value parses as the type the attribute needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Param {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<bool> for Param {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Param {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Param {
    fn from(v: u32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for Param {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Unvalidated attributes for [`crate::Catalog::create`].
///
/// Only `name`, `memory_mb`, `vcpus` and `root_gb` are required; the rest
/// start from the catalog defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateFlavor {
    pub name: String,
    pub memory_mb: Param,
    pub vcpus: Param,
    pub root_gb: Param,
    #[serde(default)]
    pub flavorid: Option<String>,
    #[serde(default = "default_zero")]
    pub ephemeral_gb: Param,
    #[serde(default = "default_zero")]
    pub swap: Param,
    #[serde(default = "default_rxtx_factor")]
    pub rxtx_factor: Param,
    #[serde(default = "default_is_public")]
    pub is_public: Param,
}

fn default_zero() -> Param {
    Param::Int(0)
}
fn default_rxtx_factor() -> Param {
    Param::Float(1.0)
}
fn default_is_public() -> Param {
    Param::Bool(true)
}

impl CreateFlavor {
    pub fn new(
        name: impl Into<String>,
        memory_mb: impl Into<Param>,
        vcpus: impl Into<Param>,
        root_gb: impl Into<Param>,
    ) -> Self {
        Self {
            name: name.into(),
            memory_mb: memory_mb.into(),
            vcpus: vcpus.into(),
            root_gb: root_gb.into(),
            flavorid: None,
            ephemeral_gb: default_zero(),
            swap: default_zero(),
            rxtx_factor: default_rxtx_factor(),
            is_public: default_is_public(),
        }
    }

    pub fn flavorid(mut self, flavorid: impl Into<String>) -> Self {
        self.flavorid = Some(flavorid.into());
        self
    }

    pub fn ephemeral_gb(mut self, value: impl Into<Param>) -> Self {
        self.ephemeral_gb = value.into();
        self
    }

    pub fn swap(mut self, value: impl Into<Param>) -> Self {
        self.swap = value.into();
        self
    }

    pub fn rxtx_factor(mut self, value: impl Into<Param>) -> Self {
        self.rxtx_factor = value.into();
        self
    }

    pub fn is_public(mut self, value: impl Into<Param>) -> Self {
        self.is_public = value.into();
        self
    }
}
