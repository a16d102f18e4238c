use serde::Deserialize;

/// Catalog-level configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Name (or flavor id) of the flavor used when none is requested.
    /// Default: "m1.small".
    #[serde(default = "default_flavor")]
    pub default_flavor: String,
}

fn default_flavor() -> String {
    "m1.small".into()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_flavor: default_flavor(),
        }
    }
}
