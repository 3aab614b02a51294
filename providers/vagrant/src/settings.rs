use std::{env, path::PathBuf};

use common::config::{FlavourSet, SettingsConfig};

pub const ANSIBLE_SCRIPTS_PATH_ENV: &str = "LAB_IN_A_SERVER_ANSIBLE_SCRIPTS_PATH";
pub const MACHINES_PATH_ENV: &str = "VAGRANT_MACHINES_FOLDER_PATH";

pub const DEFAULT_API_VERSION: u8 = 2;
pub const DEFAULT_BRIDGE: &str = "eno1";
pub const DEFAULT_DNS_SERVERS: [&str; 2] = ["172.21.200.60", "8.8.8.8"];
pub const DEFAULT_DOMAIN: &str = "englab.juniper.net jnpr.net juniper.net";
pub const DEFAULT_NTP_SERVER: &str = "ntp.juniper.net";

/// NIC model used for every private network attachment.
pub const NIC_TYPE: &str = "82540EM";

/// Values the renderers need that are not part of any single device.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSettings {
    pub api_version: u8,
    /// Directory holding the provisioning playbooks and scripts.
    pub ansible_scripts_path: PathBuf,
    /// Directory the per-lab Vagrant workspaces live in.
    pub machines_path: PathBuf,
    /// Host interface the management network is bridged onto.
    pub bridge: String,
    pub dns_servers: Vec<String>,
    pub domain: String,
    pub ntp_server: String,
    /// Shell script run after the management network playbook, relative to
    /// `ansible_scripts_path`.
    pub gateway_script: Option<String>,
    /// Lab checkout handed to switch provisioning as `lab_in_a_server`.
    pub lab_root: Option<String>,
    pub flavour_set: FlavourSet,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self::from_config(None)
    }
}

/// Unset paths stay as the environment variable name so the output can
/// still be substituted later.
fn env_path(var: &str) -> PathBuf {
    PathBuf::from(env::var(var).unwrap_or_else(|_| var.to_owned()))
}

impl GeneratorSettings {
    pub fn from_config(config: Option<&SettingsConfig>) -> Self {
        let c = config.cloned().unwrap_or_default();
        Self {
            api_version: c.api_version.unwrap_or(DEFAULT_API_VERSION),
            ansible_scripts_path: c
                .ansible_scripts_path
                .map(PathBuf::from)
                .unwrap_or_else(|| env_path(ANSIBLE_SCRIPTS_PATH_ENV)),
            machines_path: c
                .machines_path
                .map(PathBuf::from)
                .unwrap_or_else(|| env_path(MACHINES_PATH_ENV)),
            bridge: c.bridge.unwrap_or_else(|| DEFAULT_BRIDGE.to_owned()),
            dns_servers: c
                .dns_servers
                .unwrap_or_else(|| DEFAULT_DNS_SERVERS.iter().map(|s| s.to_string()).collect()),
            domain: c.domain.unwrap_or_else(|| DEFAULT_DOMAIN.to_owned()),
            ntp_server: c.ntp_server.unwrap_or_else(|| DEFAULT_NTP_SERVER.to_owned()),
            gateway_script: c.gateway_script,
            lab_root: c.lab_root,
            flavour_set: c.flavour_set.unwrap_or_default(),
        }
    }

    /// Path of a file under the provisioning scripts directory.
    pub fn script(&self, name: &str) -> String {
        self.ansible_scripts_path.join(name).display().to_string()
    }

    /// Vagrant workspace of the lab named `lab`.
    pub fn machine_dir(&self, lab: &str) -> String {
        self.machines_path.join(lab).display().to_string()
    }
}
