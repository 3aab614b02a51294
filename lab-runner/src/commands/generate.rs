use std::time::Instant;

use anyhow::Result;
use common::{
    config::{parse_config, LabConfig},
    exit,
    progress::{fail_progress, finish_progress, progress, GENERATE},
};
use tracing::info;
use vagrant::{Lab, DEFAULT_FILE_NAME};

use crate::args::{Cli, GenerateArgs};

fn output_file(args: &GenerateArgs, config: &LabConfig) -> String {
    args.output
        .clone()
        .or_else(|| config.output.clone())
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_owned())
}

pub fn generate(args: &GenerateArgs, cli: &Cli) -> Result<()> {
    let config = parse_config(&cli.file)?;
    let lab = match Lab::from_config(&config) {
        Ok(lab) => lab,
        Err(err) => exit!(err, "Invalid lab file {}", cli.file),
    };
    info!(
        "lab has {} switches and {} hosts",
        lab.switches.len(),
        lab.hosts.len()
    );

    if args.stdout {
        print!("{}", lab.render()?);
        return Ok(());
    }

    let output = output_file(args, &config);
    let pb = progress(GENERATE[0], cli.verbose);
    let start_time = Instant::now();
    if let Err(err) = lab.write(&output) {
        fail_progress(GENERATE[1], &output, pb);
        exit!(err, "{}", GENERATE[1]);
    }

    finish_progress(GENERATE[2], &output, start_time.elapsed(), pb);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_precedence() {
        let mut config = LabConfig::default();
        let mut args = GenerateArgs { output: None, stdout: false };
        assert_eq!(output_file(&args, &config), "Vagrantfile");

        config.output = Some("Vagrantfile.lab".into());
        assert_eq!(output_file(&args, &config), "Vagrantfile.lab");

        args.output = Some("out/Vagrantfile".into());
        assert_eq!(output_file(&args, &config), "out/Vagrantfile");
    }
}
