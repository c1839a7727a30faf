use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::config::{ConfigError, RegistryPreset};
use crate::db::{KeyValueStore, StoreResult, anysql};

/// Builds a store from the full connection string.
pub type StoreConstructor = Arc<dyn Fn(&str) -> StoreResult<Box<dyn KeyValueStore>> + Send + Sync>;

static KEY_VALUE_STORE: Lazy<SchemeRegistry> = Lazy::new(|| {
    SchemeRegistry::from_families(vec![anysql_family(&["mysql", "websql", "cordova-sqlite"])])
});

static STORE_LAYER: Lazy<SchemeRegistry> = Lazy::new(|| {
    SchemeRegistry::from_families(vec![anysql_family(&["mysql", "websql", "sqlite"])])
});

fn anysql_family(aliases: &[&'static str]) -> (Arc<BackendFamily>, Vec<String>) {
    let family = BackendFamily::new(anysql::FAMILY, Arc::new(anysql::connect));
    (
        Arc::new(family),
        aliases.iter().map(|alias| alias.to_string()).collect(),
    )
}

/// A storage implementation reachable through one or more scheme aliases.
#[derive(Clone)]
pub struct BackendFamily {
    name: String,
    constructor: StoreConstructor,
}

impl BackendFamily {
    pub fn new(name: impl Into<String>, constructor: StoreConstructor) -> Self {
        Self {
            name: name.into(),
            constructor,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn construct(&self, url: &str) -> StoreResult<Box<dyn KeyValueStore>> {
        (self.constructor)(url)
    }
}

impl fmt::Debug for BackendFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendFamily")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Case-sensitive map from scheme to backend family. Read-only once built.
#[derive(Clone, Debug)]
pub struct SchemeRegistry {
    schemes: HashMap<String, Arc<BackendFamily>>,
}

impl SchemeRegistry {
    pub fn builder() -> SchemeRegistryBuilder {
        SchemeRegistryBuilder::default()
    }

    /// `mysql`, `websql` and `cordova-sqlite`, all served by `anysql`.
    pub fn key_value_store() -> Self {
        KEY_VALUE_STORE.clone()
    }

    /// `mysql`, `websql` and `sqlite`, all served by `anysql`.
    pub fn store_layer() -> Self {
        STORE_LAYER.clone()
    }

    pub fn preset(preset: RegistryPreset) -> Self {
        match preset {
            RegistryPreset::KeyValueStore => Self::key_value_store(),
            RegistryPreset::StoreLayer => Self::store_layer(),
        }
    }

    fn from_families(families: Vec<(Arc<BackendFamily>, Vec<String>)>) -> Self {
        let schemes = families
            .into_iter()
            .flat_map(|(family, aliases)| {
                aliases
                    .into_iter()
                    .map(move |alias| (alias, family.clone()))
            })
            .collect();
        Self { schemes }
    }

    pub fn lookup(&self, scheme: &str) -> Option<&BackendFamily> {
        self.schemes.get(scheme).map(Arc::as_ref)
    }

    pub fn contains(&self, scheme: &str) -> bool {
        self.schemes.contains_key(scheme)
    }

    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.schemes.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        schemes
    }

    pub fn families(&self) -> Vec<&str> {
        self.schemes
            .values()
            .map(|family| family.name())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }
}

impl Default for SchemeRegistry {
    fn default() -> Self {
        Self::key_value_store()
    }
}

#[derive(Default)]
pub struct SchemeRegistryBuilder {
    families: Vec<(Arc<BackendFamily>, Vec<String>)>,
}

impl SchemeRegistryBuilder {
    pub fn family<I, S>(mut self, name: impl Into<String>, aliases: I, constructor: StoreConstructor) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let family = Arc::new(BackendFamily::new(name, constructor));
        let aliases = aliases.into_iter().map(Into::into).collect();
        self.families.push((family, aliases));
        self
    }

    /// Registers the built-in `anysql` family under `aliases`.
    pub fn anysql<I, S>(self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.family(anysql::FAMILY, aliases, Arc::new(anysql::connect))
    }

    pub fn build(self) -> Result<SchemeRegistry, ConfigError> {
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for (family, aliases) in &self.families {
            for alias in aliases {
                if alias.is_empty() {
                    return Err(ConfigError::InvalidConfig(format!(
                        "family {} registers an empty scheme",
                        family.name()
                    )));
                }
                if alias.contains(':') {
                    return Err(ConfigError::InvalidConfig(format!(
                        "scheme {alias:?} of family {} contains ':'",
                        family.name()
                    )));
                }
                if let Some(previous) = seen.insert(alias, family.name()) {
                    return Err(ConfigError::InvalidConfig(format!(
                        "scheme {alias:?} registered by both {previous} and {}",
                        family.name()
                    )));
                }
            }
        }

        Ok(SchemeRegistry::from_families(self.families))
    }
}
