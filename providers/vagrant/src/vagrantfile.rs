use std::{collections::HashSet, fs, path::Path};

use common::config::LabConfig;
use tracing::info;

use crate::{
    templates::{self, Preamble},
    Error, FlavourTable, GeneratorSettings, GroupSpec, Host, Result, SwitchDevice,
};

pub const DEFAULT_FILE_NAME: &str = "Vagrantfile";

/// One generation request: every device of a lab and how to render it.
#[derive(Debug, Clone, PartialEq)]
pub struct Lab {
    pub hosts: Vec<Host>,
    pub switches: Vec<SwitchDevice>,
    pub groups: Option<GroupSpec>,
    pub settings: GeneratorSettings,
}

impl Lab {
    pub fn from_config(config: &LabConfig) -> Result<Self> {
        let settings = GeneratorSettings::from_config(config.settings.as_ref());
        let flavours = FlavourTable::from_config(settings.flavour_set, &config.flavours);
        let hosts = config
            .hosts
            .iter()
            .map(|h| Host::from_config(h, &flavours))
            .collect::<Result<_>>()?;

        Ok(Self {
            hosts,
            switches: config.switches.iter().map(SwitchDevice::from).collect(),
            groups: config.groups.as_ref().map(GroupSpec::from),
            settings,
        })
    }

    pub fn render(&self) -> Result<String> {
        render_vagrant_file(&self.hosts, &self.switches, self.groups.as_ref(), &self.settings)
    }

    pub fn write(&self, file_name: impl AsRef<Path>) -> Result<()> {
        generate_vagrant_file(
            &self.hosts,
            &self.switches,
            self.groups.as_ref(),
            &self.settings,
            file_name,
        )
    }
}

/// Vagrant identifies VM blocks by name, so every host and switch engine
/// needs its own.
fn check_unique_names(hosts: &[Host], switches: &[SwitchDevice]) -> Result<()> {
    let mut seen = HashSet::new();
    let names = switches
        .iter()
        .flat_map(|s| [s.re_name(), s.pfe_name()])
        .chain(hosts.iter().map(|h| h.name.clone()));
    for name in names {
        if !seen.insert(name.clone()) {
            return Err(Error::DuplicateName(name));
        }
    }
    Ok(())
}

/// The complete Vagrantfile: preamble, switches, hosts, the optional group
/// provisioning block and the closing line.
pub fn render_vagrant_file(
    hosts: &[Host],
    switches: &[SwitchDevice],
    groups: Option<&GroupSpec>,
    settings: &GeneratorSettings,
) -> Result<String> {
    check_unique_names(hosts, switches)?;

    let mut blocks = vec![templates::render(
        templates::PREAMBLE,
        &Preamble {
            api_version: settings.api_version,
        },
    )?];
    for switch in switches {
        blocks.push(switch.render(settings)?);
    }
    for host in hosts {
        blocks.push(host.render(settings)?);
    }
    if let Some(groups) = groups.filter(|g| !g.is_empty()) {
        blocks.push(groups.render()?);
    }
    blocks.push(templates::render_static(templates::CLOSING)?);

    let mut text = blocks.join("\n\n");
    text.push('\n');
    Ok(text)
}

/// Renders the lab and overwrites `file_name` with it. Nothing is written
/// when rendering fails.
pub fn generate_vagrant_file(
    hosts: &[Host],
    switches: &[SwitchDevice],
    groups: Option<&GroupSpec>,
    settings: &GeneratorSettings,
    file_name: impl AsRef<Path>,
) -> Result<()> {
    let path = file_name.as_ref();
    let text = render_vagrant_file(hosts, switches, groups, settings)?;
    fs::write(path, text).map_err(|source| Error::Io {
        path: path.to_owned(),
        source,
    })?;

    info!(
        "wrote {} ({} switches, {} hosts)",
        path.display(),
        switches.len(),
        hosts.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HostKind, Interface};

    fn small_host(name: &str) -> Host {
        Host::new(
            HostKind::Centos75,
            name,
            FlavourTable::default().get("small").unwrap().clone(),
        )
    }

    #[test]
    fn duplicate_host_names_are_rejected() {
        let hosts = [small_host("host1"), small_host("host1")];
        let err = render_vagrant_file(&hosts, &[], None, &GeneratorSettings::default()).unwrap_err();
        assert!(matches!(err, Error::DuplicateName(name) if name == "host1"));
    }

    #[test]
    fn host_clashing_with_switch_engine_is_rejected() {
        let hosts = [small_host("sw1_re")];
        let switches = [SwitchDevice::new("sw1", "10.0.0.1")];
        assert!(matches!(
            render_vagrant_file(&hosts, &switches, None, &GeneratorSettings::default()),
            Err(Error::DuplicateName(_))
        ));
    }

    #[test]
    fn empty_group_spec_is_skipped() {
        let text = render_vagrant_file(
            &[small_host("host1")],
            &[],
            Some(&GroupSpec::new("site.yml")),
            &GeneratorSettings::default(),
        )
        .unwrap();
        assert!(!text.contains("ansible.groups"));
    }

    #[test]
    fn empty_lab_is_preamble_and_closing() {
        let text = render_vagrant_file(&[], &[], None, &GeneratorSettings::default()).unwrap();
        assert!(text.starts_with("VAGRANTFILE_API_VERSION = \"2\"\n"));
        assert!(text.ends_with("do |config|\n\nend\n"));
    }

    #[test]
    fn lab_from_config() {
        let config: LabConfig = common::config::LabFormat::Toml
            .parse(
                r#"
[settings]
ansible_scripts_path = "/opt/ansible"
machines_path = "/srv/machines"

[[switches]]
name = "sw1"
gateway = "10.0.0.1"

[[hosts]]
name = "host1"

[[hosts.interfaces]]
ip = "10.0.0.2"
netmask = "255.255.255.0"
host_only = true
"#,
            )
            .unwrap();
        let lab = Lab::from_config(&config).unwrap();

        assert_eq!(lab.hosts[0].flavour.name, "small");
        assert_eq!(
            lab.hosts[0].interfaces,
            vec![Interface::host_only("10.0.0.2", "255.255.255.0")]
        );
        assert_eq!(lab.switches[0].name, "sw1");
        assert!(lab.groups.is_none());
        assert!(lab.render().unwrap().contains("/opt/ansible/set_interface.yml"));
    }
}
