use common::config::SwitchConfig;
use tracing::debug;

use crate::{
    settings::NIC_TYPE,
    templates::{self, SwitchEngine, SwitchNames, SwitchRouting},
    GeneratorSettings, Result,
};

pub const RE_BOX: &str = "juniper/vqfx10k-re";
pub const PFE_BOX: &str = "juniper/vqfx10k-pfe";
pub const VLAN_ID: u16 = 101;
const BOOT_TIMEOUT: u32 = 600;

/// A vQFX switch, modelled as a routing engine and a forwarding engine
/// VM joined by an internal network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchDevice {
    pub name: String,
    pub gateway: String,
    /// Internal networks attached to the routing engine, in port order.
    pub interfaces: Vec<String>,
}

enum Engine {
    Routing,
    Forwarding,
}

impl SwitchDevice {
    pub fn new(name: &str, gateway: &str) -> Self {
        Self {
            name: name.to_owned(),
            gateway: gateway.to_owned(),
            interfaces: Vec::new(),
        }
    }

    pub fn with_interface(mut self, segment: &str) -> Self {
        self.interfaces.push(segment.to_owned());
        self
    }

    pub fn re_name(&self) -> String {
        format!("{}_re", self.name)
    }

    pub fn pfe_name(&self) -> String {
        format!("{}_pfe", self.name)
    }

    pub fn internal_network(&self) -> String {
        format!("{}_internal", self.name)
    }

    pub fn reserved_bridge(&self) -> String {
        format!("{}_reserved_bridge", self.name)
    }

    pub fn hostname(&self) -> String {
        format!("{}re", self.name)
    }

    /// Name of the lab the switch belongs to: the device name without its
    /// last `-suffix`.
    pub fn lab_name(&self) -> &str {
        self.name
            .rsplit_once('-')
            .map_or(self.name.as_str(), |(lab, _)| lab)
    }

    fn engine_segment(&self, engine: Engine) -> Result<String> {
        let (symbol, var, box_image) = match engine {
            Engine::Routing => ("re_name", "switchre", RE_BOX),
            Engine::Forwarding => ("pfe_name", "switchpfe", PFE_BOX),
        };
        templates::render(
            templates::SWITCH_ENGINE,
            &SwitchEngine {
                symbol,
                var,
                box_image,
                boot_timeout: BOOT_TIMEOUT,
                nic_type: NIC_TYPE,
                internal_network: &self.internal_network(),
            },
        )
    }

    fn routing_segment(&self, settings: &GeneratorSettings) -> Result<String> {
        templates::render(
            templates::SWITCH_ROUTING,
            &SwitchRouting {
                hostname: &self.hostname(),
                nic_type: NIC_TYPE,
                reserved_bridge: &self.reserved_bridge(),
                interfaces: &self.interfaces,
                playbook: settings.script("switch_interface.yml"),
                vagrant_root: settings.machine_dir(self.lab_name()),
                lab_root: settings.lab_root.as_deref(),
                switch_name: &self.re_name(),
                interface_count: self.interfaces.len(),
                vlan_id: VLAN_ID,
                gateway: &self.gateway,
            },
        )
    }

    /// Forwarding engine, routing engine box setup, then the routing
    /// engine's hostname, ports and provisioning.
    pub fn render(&self, settings: &GeneratorSettings) -> Result<String> {
        debug!("rendering switch {}", self.name);
        let segments = [
            templates::render(
                templates::SWITCH_NAMES,
                &SwitchNames {
                    re_name: &self.re_name(),
                    pfe_name: &self.pfe_name(),
                },
            )?,
            self.engine_segment(Engine::Forwarding)?,
            self.engine_segment(Engine::Routing)?,
            self.routing_segment(settings)?,
        ];
        Ok(segments.join("\n"))
    }
}

impl From<&SwitchConfig> for SwitchDevice {
    fn from(c: &SwitchConfig) -> Self {
        Self {
            name: c.name.clone(),
            gateway: c.gateway.clone(),
            interfaces: c.interfaces.clone(),
        }
    }
}
