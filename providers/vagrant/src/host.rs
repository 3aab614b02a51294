use std::str::FromStr;

use common::config::{HostConfig, InterfaceConfig, ManagementIpConfig};
use tracing::{debug, warn};

use crate::{
    flavour::{FlavourTable, DEFAULT_FLAVOUR},
    settings::NIC_TYPE,
    templates::{self, HostClosing, HostInitial, HostInterface, HostManagement},
    Error, FlavourSpec, GeneratorSettings, ProvisionStep, Result,
};

/// Guest device the bridged management network shows up as.
const MANAGEMENT_DEVICE: &str = "eth1";

/// Host kinds with a known box image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    Centos75,
    Centos77,
}

impl HostKind {
    pub fn box_image(&self) -> &'static str {
        match self {
            HostKind::Centos75 => "kirankn/centOS-7.5",
            HostKind::Centos77 => "kirankn/centOS-7.8",
        }
    }
}

impl FromStr for HostKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "centos75" => Ok(HostKind::Centos75),
            "centos77" => Ok(HostKind::Centos77),
            _ => Err(Error::UnknownHostKind(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagementIp {
    pub ip: String,
    pub netmask: String,
    pub gateway: String,
}

impl From<&ManagementIpConfig> for ManagementIp {
    fn from(c: &ManagementIpConfig) -> Self {
        Self {
            ip: c.ip.clone(),
            netmask: c.netmask.clone(),
            gateway: c.gateway.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Network {
    /// Private network reachable from the hypervisor host.
    HostOnly,
    /// Named internal network segment shared with other VMs.
    Internal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub ip: String,
    pub netmask: String,
    pub network: Network,
}

impl Interface {
    pub fn host_only(ip: &str, netmask: &str) -> Self {
        Self {
            ip: ip.to_owned(),
            netmask: netmask.to_owned(),
            network: Network::HostOnly,
        }
    }

    pub fn internal(ip: &str, netmask: &str, segment: &str) -> Self {
        Self {
            ip: ip.to_owned(),
            netmask: netmask.to_owned(),
            network: Network::Internal(segment.to_owned()),
        }
    }

    pub fn from_config(host: &str, c: &InterfaceConfig) -> Result<Self> {
        if c.host_only {
            return Ok(Self::host_only(&c.ip, &c.netmask));
        }
        match c.name.as_deref().map(str::trim) {
            Some(segment) if !segment.is_empty() => Ok(Self::internal(&c.ip, &c.netmask, segment)),
            _ => Err(Error::MissingSegmentName {
                host: host.to_owned(),
                ip: c.ip.clone(),
            }),
        }
    }

    pub fn segment(&self) -> Option<&str> {
        match &self.network {
            Network::HostOnly => None,
            Network::Internal(s) => Some(s.as_str()),
        }
    }
}

/// A single server VM.
#[derive(Debug, Clone, PartialEq)]
pub struct Host {
    /// VM identifier and hostname.
    pub name: String,
    pub box_image: String,
    /// Whether the box can be attached to the bridged management network.
    pub management_network: bool,
    pub flavour: FlavourSpec,
    pub management_ip: Option<ManagementIp>,
    pub interfaces: Vec<Interface>,
    pub provision: Vec<ProvisionStep>,
}

impl Host {
    pub fn new(kind: HostKind, name: &str, flavour: FlavourSpec) -> Self {
        Self::with_box(name, kind.box_image(), flavour)
    }

    pub fn with_box(name: &str, box_image: &str, flavour: FlavourSpec) -> Self {
        Self {
            name: name.to_owned(),
            box_image: box_image.to_owned(),
            management_network: true,
            flavour,
            management_ip: None,
            interfaces: Vec::new(),
            provision: Vec::new(),
        }
    }

    pub fn without_management_network(mut self) -> Self {
        self.management_network = false;
        self
    }

    pub fn with_management_ip(mut self, ip: ManagementIp) -> Self {
        self.management_ip = Some(ip);
        self
    }

    pub fn with_interface(mut self, interface: Interface) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn with_provision(mut self, step: ProvisionStep) -> Self {
        self.provision.push(step);
        self
    }

    pub fn from_config(c: &HostConfig, flavours: &FlavourTable) -> Result<Self> {
        let flavour = flavours
            .get(c.flavour.as_deref().unwrap_or(DEFAULT_FLAVOUR))?
            .clone();

        let kind = c.kind.as_deref().map(str::parse::<HostKind>).transpose()?;
        let mut host = match (&c.box_image, kind) {
            (Some(box_image), kind) => {
                if let Some(kind) = kind {
                    warn!("{}: box {box_image} overrides kind {kind:?}", c.name);
                }
                Host::with_box(&c.name, box_image, flavour)
            }
            (None, kind) => Host::new(kind.unwrap_or(HostKind::Centos75), &c.name, flavour),
        };
        host.management_network = c.management_network.unwrap_or(true);
        host.management_ip = c.management_ip.as_ref().map(ManagementIp::from);
        host.interfaces = c
            .interfaces
            .iter()
            .map(|i| Interface::from_config(&c.name, i))
            .collect::<Result<_>>()?;
        host.provision = c
            .provision
            .iter()
            .map(|p| ProvisionStep::from_config(&c.name, p))
            .collect::<Result<_>>()?;
        Ok(host)
    }

    /// Management IP that will actually be attached, if any.
    fn management(&self) -> Option<&ManagementIp> {
        match (&self.management_ip, self.management_network) {
            (Some(ip), true) => Some(ip),
            (Some(_), false) => {
                warn!("{}: box has no management network, ignoring management_ip", self.name);
                None
            }
            (None, _) => None,
        }
    }

    /// Guest device number of the first data interface. The bridged
    /// management network takes the first slot when present.
    pub fn first_data_device(&self) -> usize {
        if self.management_network && self.management_ip.is_some() {
            2
        } else {
            1
        }
    }

    fn initial_segment(&self) -> Result<String> {
        templates::render(
            templates::HOST_INITIAL,
            &HostInitial {
                name: &self.name,
                box_image: &self.box_image,
                memory: self.flavour.memory,
                cpus: self.flavour.cpu,
            },
        )
    }

    fn management_segment(&self, settings: &GeneratorSettings) -> Result<Option<String>> {
        let Some(m) = self.management() else {
            return Ok(None);
        };
        templates::render(
            templates::HOST_MANAGEMENT,
            &HostManagement {
                bridge: &settings.bridge,
                playbook: settings.script("network.yml"),
                interface: MANAGEMENT_DEVICE,
                gateway: &m.gateway,
                ip: &m.ip,
                netmask: &m.netmask,
                dns_servers: &settings.dns_servers,
                domain: &settings.domain,
                ntp_server: &settings.ntp_server,
                gateway_script: settings.gateway_script.as_deref().map(|s| settings.script(s)),
            },
        )
        .map(Some)
    }

    fn interface_segments(&self, settings: &GeneratorSettings) -> Result<Vec<String>> {
        let first = self.first_data_device();
        self.interfaces
            .iter()
            .enumerate()
            .map(|(i, interface)| {
                if interface.segment().is_some_and(|s| s.trim().is_empty()) {
                    return Err(Error::MissingSegmentName {
                        host: self.name.clone(),
                        ip: interface.ip.clone(),
                    });
                }
                let device = format!("ifcfg-eth{}", first + i);
                templates::render(
                    templates::HOST_INTERFACE,
                    &HostInterface {
                        ip: &interface.ip,
                        netmask: &interface.netmask,
                        nic_type: NIC_TYPE,
                        segment: interface.segment(),
                        playbook: settings.script("set_interface.yml"),
                        apply_command: format!("/bin/sh /tmp/config-{device}.sh"),
                        device,
                    },
                )
            })
            .collect()
    }

    fn closing_segment(&self) -> Result<String> {
        templates::render(
            templates::HOST_CLOSING,
            &HostClosing {
                memory: self.flavour.memory,
                cpus: self.flavour.cpu,
            },
        )
    }

    /// The host's complete `config.vm.define` block.
    pub fn render(&self, settings: &GeneratorSettings) -> Result<String> {
        debug!("rendering host {}", self.name);
        let mut segments = vec![self.initial_segment()?];
        segments.extend(self.management_segment(settings)?);
        segments.extend(self.interface_segments(settings)?);
        for step in &self.provision {
            segments.push(step.render()?);
        }
        segments.push(self.closing_segment()?);
        Ok(segments.join("\n"))
    }
}
