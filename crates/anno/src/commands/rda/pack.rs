use clap::Args;
use miette::{miette, Context, IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing::info;

use anno_rda::{RdaArchive, WriteOptions};

#[derive(Args)]
pub struct PackArgs {
    /// An input directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// A target RDA file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Encrypt the written blocks
    #[arg(long, default_value_t = false)]
    encrypt: bool,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl PackArgs {
    pub fn handle(&self) -> Result<()> {
        info!("creating {}", &self.file.display());

        let files = super::collect_files(&self.directory)?;
        if files.is_empty() {
            return Err(miette!("directory is empty"));
        }

        let mut rda = RdaArchive::new();
        rda.add_block();

        for (name, file) in files {
            info!("packing {}", name);

            let content = std::fs::read(file.path())
                .into_diagnostic()
                .context(format!("opening {}", file.path().display()))?;
            rda.update_file(&name, content)
                .context(format!("adding {name}"))?;
        }

        let data = rda
            .serialize(WriteOptions::builder().encrypt(self.encrypt).build())
            .context("finalizing rda file")?;
        super::write_output(&self.file, self.overwrite, &data)
    }
}
