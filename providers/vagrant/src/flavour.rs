use std::collections::BTreeMap;

use common::config::{FlavourConfig, FlavourSet};
use serde::Serialize;

use crate::{Error, Result};

pub const DEFAULT_FLAVOUR: &str = "small";

/// Named resource profile applied to a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlavourSpec {
    pub name: String,
    /// Memory in MB.
    pub memory: u32,
    pub cpu: u32,
    pub hugepages: Option<u32>,
}

impl FlavourSpec {
    pub fn new(name: &str, memory: u32, cpu: u32, hugepages: Option<u32>) -> Self {
        Self {
            name: name.to_owned(),
            memory,
            cpu,
            hugepages,
        }
    }
}

lazy_static::lazy_static! {
    static ref STANDARD: Vec<FlavourSpec> = vec![
        FlavourSpec::new("xlarge", 65536, 8, Some(64000)),
        FlavourSpec::new("large", 32768, 16, Some(32000)),
        FlavourSpec::new("medium", 32768, 4, Some(32000)),
        FlavourSpec::new("small", 8192, 2, Some(16000)),
        FlavourSpec::new("tiny", 8192, 2, Some(16000)),
    ];
    static ref LEGACY: Vec<FlavourSpec> = vec![
        FlavourSpec::new("large", 32768, 8, None),
        FlavourSpec::new("medium", 16384, 4, None),
        FlavourSpec::new("small", 8192, 2, None),
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlavourTable {
    flavours: BTreeMap<String, FlavourSpec>,
}

impl Default for FlavourTable {
    fn default() -> Self {
        Self::builtin(FlavourSet::Standard)
    }
}

impl FlavourTable {
    pub fn builtin(set: FlavourSet) -> Self {
        let specs = match set {
            FlavourSet::Standard => STANDARD.as_slice(),
            FlavourSet::Legacy => LEGACY.as_slice(),
        };
        Self {
            flavours: specs.iter().map(|f| (f.name.clone(), f.clone())).collect(),
        }
    }

    /// Built-in table of `set` with the lab file's own flavours on top.
    pub fn from_config(set: FlavourSet, custom: &BTreeMap<String, FlavourConfig>) -> Self {
        let mut table = Self::builtin(set);
        for (name, f) in custom {
            table.insert(FlavourSpec::new(name, f.memory, f.cpu, f.hugepages));
        }
        table
    }

    pub fn insert(&mut self, spec: FlavourSpec) {
        self.flavours.insert(spec.name.clone(), spec);
    }

    pub fn get(&self, name: &str) -> Result<&FlavourSpec> {
        self.flavours
            .get(name)
            .ok_or_else(|| Error::UnknownFlavour(name.to_owned()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlavourSpec> {
        self.flavours.values()
    }
}
