use std::collections::BTreeMap;

use common::config::GroupsConfig;

use crate::{
    templates::{self, ruby_string, Group, Groups},
    Result,
};

/// Ansible inventory groups plus the playbook run once across all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    pub groups: BTreeMap<String, Vec<String>>,
    pub playbook: String,
}

impl GroupSpec {
    pub fn new(playbook: &str) -> Self {
        Self {
            groups: BTreeMap::new(),
            playbook: playbook.to_owned(),
        }
    }

    pub fn with_group<S: AsRef<str>>(mut self, name: &str, members: &[S]) -> Self {
        self.groups.insert(
            name.to_owned(),
            members.iter().map(|m| m.as_ref().to_owned()).collect(),
        );
        self
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub(crate) fn render(&self) -> Result<String> {
        let groups = self
            .groups
            .iter()
            .map(|(name, members)| Group {
                name,
                members: format!(
                    "[{}]",
                    members.iter().map(|m| ruby_string(m)).collect::<Vec<_>>().join(", ")
                ),
            })
            .collect();
        templates::render(
            templates::GROUPS,
            &Groups {
                groups,
                playbook: &self.playbook,
            },
        )
    }
}

impl From<&GroupsConfig> for GroupSpec {
    fn from(c: &GroupsConfig) -> Self {
        Self {
            groups: c.members.clone(),
            playbook: c.playbook.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn renders_groups_block() {
        let spec = GroupSpec::new("site.yml")
            .with_group("switches", &["sw1_re"])
            .with_group("hosts", &["host1", "host2"]);

        assert_eq!(
            spec.render().unwrap(),
            r#"  if !Vagrant::Util::Platform.windows?
    config.vm.provision "ansible" do |ansible|
      ansible.groups = {
        "hosts" => ["host1", "host2"],
        "switches" => ["sw1_re"]
      }
      ansible.playbook = "site.yml"
    end
  end"#
        );
    }

    #[test]
    fn names_and_playbook_are_quoted_like_members() {
        let spec = GroupSpec::new(r#"site".yml"#).with_group(r#"g"1"#, &["h#{x}"]);
        let text = spec.render().unwrap();

        assert!(text.contains(r#"        "g\"1" => ["h\#{x}"]"#));
        assert!(text.contains(r#"      ansible.playbook = "site\".yml""#));
    }

    #[test]
    fn empty_group_renders_empty_array() {
        let spec = GroupSpec::new("site.yml").with_group::<&str>("spare", &[]);
        assert!(spec.render().unwrap().contains(r#""spare" => []"#));
    }
}
