//! Filtering, sorting and marker pagination over a batch of flavors.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::flavor::Flavor;

/// Predicates applied to a listing. All set fields must hold.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorFilters {
    /// Inclusive lower bound on `memory_mb`.
    pub min_memory_mb: Option<i32>,
    /// Inclusive lower bound on `root_gb`.
    pub min_root_gb: Option<i32>,
    pub is_public: Option<bool>,
    pub disabled: Option<bool>,
}

impl FlavorFilters {
    pub fn matches(&self, flavor: &Flavor) -> bool {
        self.min_memory_mb.is_none_or(|min| flavor.memory_mb >= min)
            && self.min_root_gb.is_none_or(|min| flavor.root_gb >= min)
            && self.is_public.is_none_or(|v| flavor.is_public == v)
            && self.disabled.is_none_or(|v| flavor.disabled == v)
    }
}

/// Attribute a listing is ordered by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Id,
    Flavorid,
    Name,
    MemoryMb,
    Vcpus,
    RootGb,
    EphemeralGb,
    Swap,
    RxtxFactor,
    VcpuWeight,
    IsPublic,
    Disabled,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

impl SortKey {
    pub const ALL: &'static [SortKey] = &[
        Self::Id,
        Self::Flavorid,
        Self::Name,
        Self::MemoryMb,
        Self::Vcpus,
        Self::RootGb,
        Self::EphemeralGb,
        Self::Swap,
        Self::RxtxFactor,
        Self::VcpuWeight,
        Self::IsPublic,
        Self::Disabled,
        Self::CreatedAt,
        Self::UpdatedAt,
        Self::DeletedAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Flavorid => "flavorid",
            Self::Name => "name",
            Self::MemoryMb => "memory_mb",
            Self::Vcpus => "vcpus",
            Self::RootGb => "root_gb",
            Self::EphemeralGb => "ephemeral_gb",
            Self::Swap => "swap",
            Self::RxtxFactor => "rxtx_factor",
            Self::VcpuWeight => "vcpu_weight",
            Self::IsPublic => "is_public",
            Self::Disabled => "disabled",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::DeletedAt => "deleted_at",
        }
    }

    /// Compare two flavors on this attribute. Missing values order first.
    pub fn compare(&self, a: &Flavor, b: &Flavor) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::Flavorid => a.flavorid.cmp(&b.flavorid),
            Self::Name => a.name.cmp(&b.name),
            Self::MemoryMb => a.memory_mb.cmp(&b.memory_mb),
            Self::Vcpus => a.vcpus.cmp(&b.vcpus),
            Self::RootGb => a.root_gb.cmp(&b.root_gb),
            Self::EphemeralGb => a.ephemeral_gb.cmp(&b.ephemeral_gb),
            Self::Swap => a.swap.cmp(&b.swap),
            Self::RxtxFactor => a.rxtx_factor.total_cmp(&b.rxtx_factor),
            Self::VcpuWeight => a.vcpu_weight.cmp(&b.vcpu_weight),
            Self::IsPublic => a.is_public.cmp(&b.is_public),
            Self::Disabled => a.disabled.cmp(&b.disabled),
            Self::CreatedAt => a.created_at.cmp(&b.created_at),
            Self::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            Self::DeletedAt => a.deleted_at.cmp(&b.deleted_at),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| CatalogError::invalid("sort_key", format!("unknown sort key {s:?}")))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDir {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(CatalogError::invalid(
                "sort_dir",
                format!("sort_dir must be asc or desc, got {other:?}"),
            )),
        }
    }
}

/// Parameters of [`crate::Catalog::list`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOptions {
    /// `None` lists everything.
    pub filters: Option<FlavorFilters>,
    pub sort_key: SortKey,
    pub sort_dir: SortDir,
    pub limit: Option<usize>,
    /// Flavor id of the last item of the previous page.
    pub marker: Option<String>,
    /// Include soft-deleted flavors.
    pub include_deleted: bool,
}

impl ListOptions {
    pub fn filters(mut self, filters: FlavorFilters) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn sort(mut self, key: SortKey, dir: SortDir) -> Self {
        self.sort_key = key;
        self.sort_dir = dir;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    pub fn include_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }
}

/// Filter, sort, skip past the marker, then truncate to the limit.
///
/// `flavors` is expected in id order; the sort is stable so ties keep it.
pub fn paginate(mut flavors: Vec<Flavor>, opts: &ListOptions) -> Result<Vec<Flavor>, CatalogError> {
    if let Some(filters) = &opts.filters {
        flavors.retain(|f| filters.matches(f));
    }

    flavors.sort_by(|a, b| {
        let ord = opts.sort_key.compare(a, b);
        match opts.sort_dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        }
    });

    if let Some(marker) = &opts.marker {
        let pos = flavors
            .iter()
            .position(|f| &f.flavorid == marker)
            .ok_or_else(|| CatalogError::MarkerNotFound(marker.clone()))?;
        flavors.drain(..=pos);
    }

    if let Some(limit) = opts.limit {
        flavors.truncate(limit);
    }

    Ok(flavors)
}
