//! Vagrantfile generation for labs of virtual servers and vQFX switches.
//!
//! Callers either build [`Host`], [`SwitchDevice`] and [`GroupSpec`] values
//! directly, or convert a parsed lab file with [`Lab::from_config`], and
//! hand them to the file assembler in [`vagrantfile`].

pub mod error;
pub mod flavour;
pub mod groups;
pub mod host;
pub mod provision;
pub mod settings;
pub mod switch;
mod templates;
pub mod vagrantfile;

pub use error::{Error, Result};
pub use flavour::{FlavourSpec, FlavourTable, DEFAULT_FLAVOUR};
pub use groups::GroupSpec;
pub use host::{Host, HostKind, Interface, ManagementIp, Network};
pub use provision::{ProvisionStep, ProvisionValue};
pub use settings::GeneratorSettings;
pub use switch::SwitchDevice;
pub use vagrantfile::{generate_vagrant_file, render_vagrant_file, Lab, DEFAULT_FILE_NAME};
