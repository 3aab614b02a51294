use common::config::ProvisionConfig;
pub use common::config::Scalar as ProvisionValue;

use crate::{
    templates::{self, ruby_key, ruby_string, Entry, HostAnsible, HostGeneric},
    Error, Result,
};

pub const ANSIBLE: &str = "ansible";

/// A post-boot action applied to a host, in the order it was declared.
#[derive(Debug, Clone, PartialEq)]
pub enum ProvisionStep {
    /// Playbook run with extra variables.
    Ansible {
        path: String,
        variables: Vec<(String, ProvisionValue)>,
    },
    /// Any other Vagrant provisioner, e.g. `shell`, with its keyword
    /// arguments.
    Generic {
        method: String,
        params: Vec<(String, ProvisionValue)>,
    },
}

impl ProvisionStep {
    pub fn ansible(path: &str) -> Self {
        ProvisionStep::Ansible {
            path: path.to_owned(),
            variables: Vec::new(),
        }
    }

    pub fn generic(method: &str) -> Self {
        ProvisionStep::Generic {
            method: method.to_owned(),
            params: Vec::new(),
        }
    }

    /// Appends an extra variable to an ansible step or a parameter to a
    /// generic one.
    pub fn with(mut self, key: &str, value: impl Into<ProvisionValue>) -> Self {
        match &mut self {
            ProvisionStep::Ansible { variables, .. } => variables.push((key.to_owned(), value.into())),
            ProvisionStep::Generic { params, .. } => params.push((key.to_owned(), value.into())),
        }
        self
    }

    pub fn from_config(host: &str, config: &ProvisionConfig) -> Result<Self> {
        if config.method != ANSIBLE {
            if !config.variables.is_empty() {
                tracing::warn!("`variables` is ignored on {} step of {host}", config.method);
            }
            return Ok(ProvisionStep::Generic {
                method: config.method.clone(),
                params: config.params.0.clone(),
            });
        }

        let path = config
            .params
            .get("path")
            .and_then(ProvisionValue::as_str)
            .ok_or_else(|| Error::MissingPlaybook(host.to_owned()))?;
        Ok(ProvisionStep::Ansible {
            path: path.to_owned(),
            variables: config.variables.0.clone(),
        })
    }

    pub(crate) fn render(&self) -> Result<String> {
        match self {
            ProvisionStep::Ansible { path, variables } => templates::render(
                templates::HOST_ANSIBLE,
                &HostAnsible {
                    playbook: path,
                    has_extra_vars: !variables.is_empty(),
                    extra_vars: entries(variables),
                },
            ),
            ProvisionStep::Generic { method, params } => templates::render(
                templates::HOST_GENERIC,
                &HostGeneric {
                    method,
                    params: entries(params),
                },
            ),
        }
    }
}

fn entries(pairs: &[(String, ProvisionValue)]) -> Vec<Entry> {
    pairs
        .iter()
        .map(|(key, value)| Entry {
            key: ruby_key(key),
            value: ruby_literal(value),
        })
        .collect()
}

/// Strings are quoted, everything else is written as a bare literal.
pub(crate) fn ruby_literal(value: &ProvisionValue) -> String {
    match value {
        ProvisionValue::String(s) => ruby_string(s),
        ProvisionValue::Integer(i) => i.to_string(),
        ProvisionValue::Float(f) if f.is_nan() => "Float::NAN".to_owned(),
        ProvisionValue::Float(f) if *f == f64::INFINITY => "Float::INFINITY".to_owned(),
        ProvisionValue::Float(f) if *f == f64::NEG_INFINITY => "-Float::INFINITY".to_owned(),
        ProvisionValue::Float(f) => format!("{f:?}"),
        ProvisionValue::Boolean(b) => b.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use common::config::OrderedVars;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn literals() {
        assert_eq!(ruby_literal(&"east".into()), "\"east\"");
        assert_eq!(ruby_literal(&ProvisionValue::Integer(8080)), "8080");
        assert_eq!(ruby_literal(&ProvisionValue::Float(1.0)), "1.0");
        assert_eq!(ruby_literal(&ProvisionValue::Boolean(true)), "true");
        assert_eq!(ruby_literal(&"#{`id`}".into()), r#""\#{`id`}""#);
    }

    #[test]
    fn non_finite_floats_use_ruby_constants() {
        assert_eq!(ruby_literal(&ProvisionValue::Float(f64::NAN)), "Float::NAN");
        assert_eq!(ruby_literal(&ProvisionValue::Float(f64::INFINITY)), "Float::INFINITY");
        assert_eq!(ruby_literal(&ProvisionValue::Float(f64::NEG_INFINITY)), "-Float::INFINITY");
        assert_eq!(ruby_literal(&ProvisionValue::Float(-2.5)), "-2.5");
    }

    #[test]
    fn ansible_step_keeps_variable_order() {
        let step = ProvisionStep::ansible("playbooks/web.yml")
            .with("zone", "east")
            .with("port", 8080i64)
            .with("debug", true);

        assert_eq!(
            step.render().unwrap(),
            r#"    srv.vm.provision :ansible do |ansible|
      ansible.playbook = "playbooks/web.yml"
      ansible.extra_vars = {
        zone: "east",
        port: 8080,
        debug: true
      }
    end"#
        );
    }

    #[test]
    fn hostile_values_stay_inside_their_literals() {
        let step = ProvisionStep::ansible(r#"site".yml"#)
            .with("v", "#{`id`}")
            .with("odd-key", 1i64);

        assert_eq!(
            step.render().unwrap(),
            r#"    srv.vm.provision :ansible do |ansible|
      ansible.playbook = "site\".yml"
      ansible.extra_vars = {
        v: "\#{`id`}",
        "odd-key": 1
      }
    end"#
        );
    }

    #[test]
    fn generic_step_lists_params() {
        let step = ProvisionStep::generic("shell")
            .with("inline", "echo hello")
            .with("privileged", false);

        assert_eq!(
            step.render().unwrap(),
            r#"    srv.vm.provision "shell", inline: "echo hello", privileged: false"#
        );
    }

    #[test]
    fn ansible_config_needs_a_path() {
        let config = ProvisionConfig {
            method: ANSIBLE.to_owned(),
            variables: OrderedVars::default(),
            params: OrderedVars(vec![("playbook".to_owned(), "site.yml".into())]),
        };
        let err = ProvisionStep::from_config("host1", &config).unwrap_err();
        assert!(matches!(err, Error::MissingPlaybook(host) if host == "host1"));
    }

    #[test]
    fn config_steps_convert() {
        let ansible = ProvisionConfig {
            method: ANSIBLE.to_owned(),
            variables: OrderedVars(vec![("role".to_owned(), "db".into())]),
            params: OrderedVars(vec![("path".to_owned(), "db.yml".into())]),
        };
        assert_eq!(
            ProvisionStep::from_config("host1", &ansible).unwrap(),
            ProvisionStep::ansible("db.yml").with("role", "db")
        );

        let shell = ProvisionConfig {
            method: "shell".to_owned(),
            variables: OrderedVars::default(),
            params: OrderedVars(vec![("path".to_owned(), "up.sh".into())]),
        };
        assert_eq!(
            ProvisionStep::from_config("host1", &shell).unwrap(),
            ProvisionStep::generic("shell").with("path", "up.sh")
        );
    }
}
