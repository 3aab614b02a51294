use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown flavour `{0}`")]
    UnknownFlavour(String),

    #[error("unknown host kind `{0}`")]
    UnknownHostKind(String),

    #[error("interface {ip} on `{host}` is not host-only but names no internal network")]
    MissingSegmentName { host: String, ip: String },

    #[error("ansible provisioning step on `{0}` has no playbook path")]
    MissingPlaybook(String),

    #[error("device name `{0}` is used more than once")]
    DuplicateName(String),

    #[error("could not render {template}")]
    Template {
        template: &'static str,
        #[source]
        source: tera::Error,
    },

    #[error("could not write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
