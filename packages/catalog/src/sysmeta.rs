//! Snapshot a flavor into an instance's system metadata and read it back.
//!
//! Each tracked attribute is stored under `{prefix}instance_type_{attr}`.
//! NUMA topology extra specs (`hw:numa_mem.<N>`, `hw:numa_cpus.<N>`) are
//! mirrored under `{prefix}instance_type_extra_{key}`; every other extra
//! spec stays in the catalog only.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::flavor::{ExtraSpecs, Flavor};

/// Key/value metadata owned by an instance.
pub type SystemMetadata = HashMap<String, String>;

const KEY_STEM: &str = "instance_type_";
const EXTRA_KEY_STEM: &str = "instance_type_extra_";

/// Extra spec key prefixes that are mirrored into instance metadata.
const NUMA_SPEC_PREFIXES: &[&str] = &["hw:numa_mem.", "hw:numa_cpus."];

/// A flavor attribute that survives into instance metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlavorProp {
    Id,
    Name,
    MemoryMb,
    Vcpus,
    RootGb,
    EphemeralGb,
    Flavorid,
    Swap,
    RxtxFactor,
    VcpuWeight,
}

impl FlavorProp {
    /// Every tracked attribute, in storage order.
    pub const ALL: &'static [FlavorProp] = &[
        Self::Id,
        Self::Name,
        Self::MemoryMb,
        Self::Vcpus,
        Self::RootGb,
        Self::EphemeralGb,
        Self::Flavorid,
        Self::Swap,
        Self::RxtxFactor,
        Self::VcpuWeight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::MemoryMb => "memory_mb",
            Self::Vcpus => "vcpus",
            Self::RootGb => "root_gb",
            Self::EphemeralGb => "ephemeral_gb",
            Self::Flavorid => "flavorid",
            Self::Swap => "swap",
            Self::RxtxFactor => "rxtx_factor",
            Self::VcpuWeight => "vcpu_weight",
        }
    }

    /// Metadata key for this attribute under `prefix`.
    pub fn key(&self, prefix: &str) -> String {
        format!("{prefix}{KEY_STEM}{}", self.as_str())
    }

    fn encode(&self, flavor: &Flavor) -> String {
        match self {
            Self::Id => flavor.id.to_string(),
            Self::Name => flavor.name.clone(),
            Self::MemoryMb => flavor.memory_mb.to_string(),
            Self::Vcpus => flavor.vcpus.to_string(),
            Self::RootGb => flavor.root_gb.to_string(),
            Self::EphemeralGb => flavor.ephemeral_gb.to_string(),
            Self::Flavorid => flavor.flavorid.clone(),
            Self::Swap => flavor.swap.to_string(),
            Self::RxtxFactor => flavor.rxtx_factor.to_string(),
            Self::VcpuWeight => flavor
                .vcpu_weight
                .map(|w| w.to_string())
                .unwrap_or_default(),
        }
    }

    fn decode(&self, flavor: &mut Flavor, raw: &str) -> Result<(), CatalogError> {
        match self {
            Self::Id => flavor.id = self.parse(raw)?,
            Self::Name => flavor.name = raw.to_string(),
            Self::MemoryMb => flavor.memory_mb = self.parse(raw)?,
            Self::Vcpus => flavor.vcpus = self.parse(raw)?,
            Self::RootGb => flavor.root_gb = self.parse(raw)?,
            Self::EphemeralGb => flavor.ephemeral_gb = self.parse(raw)?,
            Self::Flavorid => flavor.flavorid = raw.to_string(),
            Self::Swap => flavor.swap = self.parse(raw)?,
            Self::RxtxFactor => flavor.rxtx_factor = self.parse(raw)?,
            Self::VcpuWeight => {
                flavor.vcpu_weight = if raw.is_empty() {
                    None
                } else {
                    Some(self.parse(raw)?)
                }
            }
        }
        Ok(())
    }

    fn parse<T: std::str::FromStr>(&self, raw: &str) -> Result<T, CatalogError> {
        raw.parse().map_err(|_| {
            CatalogError::InvalidSnapshot(format!("bad value {raw:?} for {}", self.as_str()))
        })
    }
}

/// Whether an extra spec key describes NUMA topology and is therefore
/// mirrored into instance metadata.
pub fn is_numa_spec(key: &str) -> bool {
    NUMA_SPEC_PREFIXES.iter().any(|prefix| {
        key.strip_prefix(prefix)
            .is_some_and(|index| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
    })
}

/// Write the tracked attributes and NUMA extra specs of `flavor` into
/// `metadata`.
pub fn save_flavor_info<'a>(
    metadata: &'a mut SystemMetadata,
    flavor: &Flavor,
    prefix: &str,
) -> &'a mut SystemMetadata {
    for prop in FlavorProp::ALL {
        metadata.insert(prop.key(prefix), prop.encode(flavor));
    }
    for (key, value) in &flavor.extra_specs {
        if is_numa_spec(key) {
            metadata.insert(format!("{prefix}{EXTRA_KEY_STEM}{key}"), value.clone());
        }
    }
    metadata
}

/// Rebuild the flavor snapshot stored under `prefix`.
///
/// Returns `Ok(None)` when the instance carries no metadata at all.
pub fn extract_flavor(
    metadata: Option<&SystemMetadata>,
    prefix: &str,
) -> Result<Option<Flavor>, CatalogError> {
    let Some(metadata) = metadata.filter(|m| !m.is_empty()) else {
        return Ok(None);
    };

    let mut flavor = Flavor::default();
    for prop in FlavorProp::ALL {
        let key = prop.key(prefix);
        let raw = metadata
            .get(&key)
            .ok_or_else(|| CatalogError::InvalidSnapshot(format!("missing key {key}")))?;
        prop.decode(&mut flavor, raw)?;
    }

    let extra_stem = format!("{prefix}{EXTRA_KEY_STEM}");
    flavor.extra_specs = metadata
        .iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(&extra_stem)
                .filter(|spec| is_numa_spec(spec))
                .map(|spec| (spec.to_string(), value.clone()))
        })
        .collect::<ExtraSpecs>();

    Ok(Some(flavor))
}

/// Remove every snapshot key written by [`save_flavor_info`] for each of
/// `prefixes`. Keys that are absent are ignored.
pub fn delete_flavor_info(metadata: &mut SystemMetadata, prefixes: &[&str]) {
    for prefix in prefixes {
        for prop in FlavorProp::ALL {
            metadata.remove(&prop.key(prefix));
        }
        let extra_stem = format!("{prefix}{EXTRA_KEY_STEM}");
        metadata.retain(|key, _| {
            !key.strip_prefix(&extra_stem)
                .is_some_and(is_numa_spec)
        });
    }
}

/// One entry of instance metadata in its list form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataItem {
    pub key: String,
    pub value: String,
}

/// Collapse the list form of instance metadata into a map.
pub fn metadata_from_items<I>(items: I) -> SystemMetadata
where
    I: IntoIterator<Item = MetadataItem>,
{
    items.into_iter().map(|item| (item.key, item.value)).collect()
}
