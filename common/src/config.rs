use std::{collections::BTreeMap, fmt, path::Path};

use anyhow::Result;
use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use tracing::info;

use crate::exit;

pub const DEFAULT_LAB_FILE: &str = "lab.toml";

/// A lab description: the devices to generate and how to generate them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LabConfig {
    pub output: Option<String>,
    pub settings: Option<SettingsConfig>,
    #[serde(default)]
    pub flavours: BTreeMap<String, FlavourConfig>,
    #[serde(default)]
    pub switches: Vec<SwitchConfig>,
    #[serde(default)]
    pub hosts: Vec<HostConfig>,
    pub groups: Option<GroupsConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SettingsConfig {
    pub api_version: Option<u8>,
    pub ansible_scripts_path: Option<String>,
    pub machines_path: Option<String>,
    pub bridge: Option<String>,
    pub dns_servers: Option<Vec<String>>,
    pub domain: Option<String>,
    pub ntp_server: Option<String>,
    pub gateway_script: Option<String>,
    pub lab_root: Option<String>,
    pub flavour_set: Option<FlavourSet>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlavourSet {
    #[default]
    Standard,
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FlavourConfig {
    pub memory: u32,
    pub cpu: u32,
    pub hugepages: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SwitchConfig {
    pub name: String,
    pub gateway: String,
    #[serde(default)]
    pub interfaces: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HostConfig {
    pub name: String,
    pub kind: Option<String>,
    #[serde(rename = "box")]
    pub box_image: Option<String>,
    pub flavour: Option<String>,
    pub management_network: Option<bool>,
    pub management_ip: Option<ManagementIpConfig>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceConfig>,
    #[serde(default)]
    pub provision: Vec<ProvisionConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ManagementIpConfig {
    pub ip: String,
    pub netmask: String,
    pub gateway: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InterfaceConfig {
    pub ip: String,
    pub netmask: String,
    pub host_only: bool,
    pub name: Option<String>,
}

/// One provisioning step. `method = "ansible"` steps carry a `path` and an
/// optional `variables` table; every other key is a parameter of a generic
/// step, kept in file order.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProvisionConfig {
    pub method: String,
    #[serde(default)]
    pub variables: OrderedVars,
    #[serde(flatten)]
    pub params: OrderedVars,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GroupsConfig {
    pub playbook: String,
    #[serde(default)]
    pub members: BTreeMap<String, Vec<String>>,
}

/// Scalar value of a provisioning variable or parameter.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Boolean(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

/// Key/value table that remembers the order its keys were written in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedVars(pub Vec<(String, Scalar)>);

impl OrderedVars {
    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Scalar)> {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for OrderedVars {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VarsVisitor;

        impl<'de> Visitor<'de> for VarsVisitor {
            type Value = OrderedVars;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a table of scalar values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut vars = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((k, v)) = map.next_entry::<String, Scalar>()? {
                    vars.push((k, v));
                }
                Ok(OrderedVars(vars))
            }
        }

        deserializer.deserialize_map(VarsVisitor)
    }
}

impl Serialize for OrderedVars {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabFormat {
    Toml,
    Yaml,
}

impl LabFormat {
    pub fn from_path(file: &str) -> Self {
        match Path::new(file).extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => LabFormat::Yaml,
            _ => LabFormat::Toml,
        }
    }

    pub fn parse(self, content: &str) -> Result<LabConfig> {
        Ok(match self {
            LabFormat::Toml => toml::from_str(content)?,
            LabFormat::Yaml => serde_yaml::from_str(content)?,
        })
    }
}

pub fn parse_config(file: &str) -> Result<LabConfig> {
    let config = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(err) => exit!(err, "Could not read lab file {}", file),
    };

    let config = match LabFormat::from_path(file).parse(&config) {
        Ok(c) => c,
        Err(err) => exit!(err, "Could not parse lab file {}", file),
    };

    info!("lab file parsed");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAB_TOML: &str = r#"
output = "Vagrantfile.lab"

[settings]
ansible_scripts_path = "/opt/lab/ansible"
flavour_set = "legacy"

[flavours.huge]
memory = 131072
cpu = 32
hugepages = 128000

[[switches]]
name = "lab1-sw1"
gateway = "10.0.0.1"
interfaces = ["seg-a", "seg-b"]

[[hosts]]
name = "host1"
kind = "centos77"
management_ip = { ip = "172.16.0.10", netmask = "255.255.255.0", gateway = "172.16.0.1" }

[[hosts.interfaces]]
ip = "10.0.0.2"
netmask = "255.255.255.0"
host_only = false
name = "seg-a"

[[hosts.provision]]
method = "ansible"
path = "playbooks/web.yml"

[hosts.provision.variables]
zone = "east"
port = 8080
debug = true

[[hosts.provision]]
method = "shell"
path = "bootstrap.sh"
privileged = false

[groups]
playbook = "site.yml"

[groups.members]
hosts = ["host1"]
"#;

    #[test]
    fn parses_toml_lab() {
        let lab = LabFormat::Toml.parse(LAB_TOML).unwrap();
        assert_eq!(lab.output.as_deref(), Some("Vagrantfile.lab"));

        let settings = lab.settings.unwrap();
        assert_eq!(settings.ansible_scripts_path.as_deref(), Some("/opt/lab/ansible"));
        assert_eq!(settings.flavour_set, Some(FlavourSet::Legacy));
        assert_eq!(lab.flavours["huge"].hugepages, Some(128000));

        assert_eq!(lab.switches[0].interfaces, vec!["seg-a", "seg-b"]);

        let host = &lab.hosts[0];
        assert_eq!(host.kind.as_deref(), Some("centos77"));
        assert_eq!(host.management_ip.as_ref().unwrap().gateway, "172.16.0.1");
        assert!(!host.interfaces[0].host_only);
        assert_eq!(host.interfaces[0].name.as_deref(), Some("seg-a"));

        assert_eq!(lab.groups.unwrap().members["hosts"], vec!["host1"]);
    }

    #[test]
    fn provision_tables_keep_file_order() {
        let lab = LabFormat::Toml.parse(LAB_TOML).unwrap();
        let provision = &lab.hosts[0].provision;

        let ansible = &provision[0];
        assert_eq!(ansible.method, "ansible");
        assert_eq!(ansible.params.get("path"), Some(&Scalar::from("playbooks/web.yml")));
        let keys: Vec<&str> = ansible.variables.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zone", "port", "debug"]);
        assert_eq!(ansible.variables.get("port"), Some(&Scalar::Integer(8080)));
        assert_eq!(ansible.variables.get("debug"), Some(&Scalar::Boolean(true)));

        let shell = &provision[1];
        assert!(shell.variables.is_empty());
        assert_eq!(
            shell.params.0,
            vec![
                ("path".to_owned(), Scalar::from("bootstrap.sh")),
                ("privileged".to_owned(), Scalar::Boolean(false)),
            ]
        );
    }

    #[test]
    fn parses_yaml_lab() {
        let lab = LabFormat::Yaml
            .parse(
                r#"
hosts:
  - name: host1
    flavour: medium
    interfaces:
      - ip: 10.0.0.2
        netmask: 255.255.255.0
        host_only: true
    provision:
      - method: shell
        inline: echo hello
        run: always
"#,
            )
            .unwrap();

        let host = &lab.hosts[0];
        assert_eq!(host.flavour.as_deref(), Some("medium"));
        assert!(host.interfaces[0].host_only);
        let keys: Vec<&str> = host.provision[0].params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["inline", "run"]);
        assert!(lab.switches.is_empty());
        assert!(lab.groups.is_none());
    }

    #[test]
    fn interface_without_host_only_is_rejected() {
        let err = LabFormat::Toml.parse(
            r#"
[[hosts]]
name = "host1"

[[hosts.interfaces]]
ip = "10.0.0.2"
netmask = "255.255.255.0"
"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(LabFormat::from_path("lab.yaml"), LabFormat::Yaml);
        assert_eq!(LabFormat::from_path("labs/edge.yml"), LabFormat::Yaml);
        assert_eq!(LabFormat::from_path("lab.toml"), LabFormat::Toml);
        assert_eq!(LabFormat::from_path("lab"), LabFormat::Toml);
    }
}
