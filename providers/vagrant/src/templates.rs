use std::collections::HashMap;

use serde::Serialize;
use tera::{Context, Tera, Value};

use crate::{Error, Result};

pub const PREAMBLE: &str = "preamble.rb";
pub const CLOSING: &str = "closing.rb";
pub const HOST_INITIAL: &str = "host_initial.rb";
pub const HOST_MANAGEMENT: &str = "host_management.rb";
pub const HOST_INTERFACE: &str = "host_interface.rb";
pub const HOST_ANSIBLE: &str = "host_ansible.rb";
pub const HOST_GENERIC: &str = "host_generic.rb";
pub const HOST_CLOSING: &str = "host_closing.rb";
pub const SWITCH_NAMES: &str = "switch_names.rb";
pub const SWITCH_ENGINE: &str = "switch_engine.rb";
pub const SWITCH_ROUTING: &str = "switch_routing.rb";
pub const GROUPS: &str = "groups.rb";

lazy_static::lazy_static! {
    static ref TEMPLATES: Tera = {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.register_filter("ruby", ruby_filter);
        tera.add_raw_templates(vec![
            (PREAMBLE, include_str!("../templates/preamble.rb.tera")),
            (CLOSING, include_str!("../templates/closing.rb.tera")),
            (HOST_INITIAL, include_str!("../templates/host_initial.rb.tera")),
            (HOST_MANAGEMENT, include_str!("../templates/host_management.rb.tera")),
            (HOST_INTERFACE, include_str!("../templates/host_interface.rb.tera")),
            (HOST_ANSIBLE, include_str!("../templates/host_ansible.rb.tera")),
            (HOST_GENERIC, include_str!("../templates/host_generic.rb.tera")),
            (HOST_CLOSING, include_str!("../templates/host_closing.rb.tera")),
            (SWITCH_NAMES, include_str!("../templates/switch_names.rb.tera")),
            (SWITCH_ENGINE, include_str!("../templates/switch_engine.rb.tera")),
            (SWITCH_ROUTING, include_str!("../templates/switch_routing.rb.tera")),
            (GROUPS, include_str!("../templates/groups.rb.tera")),
        ])
        .unwrap();
        tera
    };
}

/// Double-quoted Ruby string literal. `#` is escaped so values never start
/// an interpolation.
pub fn ruby_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '#' => out.push_str("\\#"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Hash key or keyword argument name, written bare when it is a plain
/// identifier and as a quoted symbol otherwise.
pub fn ruby_key(key: &str) -> String {
    let mut chars = key.chars();
    let plain = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        key.to_owned()
    } else {
        ruby_string(key)
    }
}

fn ruby_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(ruby_string(s))),
        Value::Number(n) => Ok(Value::String(ruby_string(&n.to_string()))),
        other => Err(tera::Error::msg(format!("cannot quote {other} as a Ruby string"))),
    }
}

/// Renders one segment. Trailing whitespace is dropped so owners can join
/// segments with a single newline.
pub fn render<T: Serialize>(template: &'static str, ctx: &T) -> Result<String> {
    let context = Context::from_serialize(ctx)
        .map_err(|source| Error::Template { template, source })?;
    let text = TEMPLATES
        .render(template, &context)
        .map_err(|source| Error::Template { template, source })?;
    Ok(text.trim_end().to_owned())
}

/// Renders a segment that takes no values.
pub fn render_static(template: &'static str) -> Result<String> {
    let text = TEMPLATES
        .render(template, &Context::new())
        .map_err(|source| Error::Template { template, source })?;
    Ok(text.trim_end().to_owned())
}

/// Ruby key and already rendered Ruby value of a hash entry or keyword argument.
#[derive(Debug, Serialize)]
pub struct Entry {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct Preamble {
    pub api_version: u8,
}

#[derive(Debug, Serialize)]
pub struct HostInitial<'a> {
    pub name: &'a str,
    pub box_image: &'a str,
    pub memory: u32,
    pub cpus: u32,
}

#[derive(Debug, Serialize)]
pub struct HostManagement<'a> {
    pub bridge: &'a str,
    pub playbook: String,
    pub interface: &'a str,
    pub gateway: &'a str,
    pub ip: &'a str,
    pub netmask: &'a str,
    pub dns_servers: &'a [String],
    pub domain: &'a str,
    pub ntp_server: &'a str,
    pub gateway_script: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HostInterface<'a> {
    pub ip: &'a str,
    pub netmask: &'a str,
    pub nic_type: &'a str,
    /// Internal network name, `None` for host-only attachments.
    pub segment: Option<&'a str>,
    pub playbook: String,
    pub device: String,
    /// Shell command that applies the generated interface file.
    pub apply_command: String,
}

#[derive(Debug, Serialize)]
pub struct HostAnsible<'a> {
    pub playbook: &'a str,
    pub has_extra_vars: bool,
    pub extra_vars: Vec<Entry>,
}

#[derive(Debug, Serialize)]
pub struct HostGeneric<'a> {
    pub method: &'a str,
    pub params: Vec<Entry>,
}

#[derive(Debug, Serialize)]
pub struct HostClosing {
    pub memory: u32,
    pub cpus: u32,
}

#[derive(Debug, Serialize)]
pub struct SwitchNames<'a> {
    pub re_name: &'a str,
    pub pfe_name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SwitchEngine<'a> {
    pub symbol: &'a str,
    pub var: &'a str,
    pub box_image: &'a str,
    pub boot_timeout: u32,
    pub nic_type: &'a str,
    pub internal_network: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SwitchRouting<'a> {
    pub hostname: &'a str,
    pub nic_type: &'a str,
    pub reserved_bridge: &'a str,
    pub interfaces: &'a [String],
    pub playbook: String,
    pub vagrant_root: String,
    pub lab_root: Option<&'a str>,
    pub switch_name: &'a str,
    pub interface_count: usize,
    pub vlan_id: u16,
    pub gateway: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Group<'a> {
    pub name: &'a str,
    /// Ruby array literal of the member names.
    pub members: String,
}

#[derive(Debug, Serialize)]
pub struct Groups<'a> {
    pub groups: Vec<Group<'a>>,
    pub playbook: &'a str,
}
