use std::path::Path;

use anyhow::Result;
use common::config::{parse_config, LabConfig};
use vagrant::{FlavourTable, GeneratorSettings};

use crate::args::Cli;

/// Built-in flavours, plus those of the lab file when there is one.
pub fn list(cli: &Cli) -> Result<()> {
    let config = if Path::new(&cli.file).exists() {
        parse_config(&cli.file)?
    } else {
        LabConfig::default()
    };
    let settings = GeneratorSettings::from_config(config.settings.as_ref());
    let table = FlavourTable::from_config(settings.flavour_set, &config.flavours);

    println!("{:<10} {:>8} {:>4} {:>10}", "NAME", "MEMORY", "CPU", "HUGEPAGES");
    for f in table.iter() {
        let hugepages = f.hugepages.map_or("-".to_owned(), |h| h.to_string());
        println!("{:<10} {:>8} {:>4} {:>10}", f.name, f.memory, f.cpu, hugepages);
    }
    Ok(())
}
