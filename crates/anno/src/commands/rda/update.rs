use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing::info;

use anno_rda::{RdaArchive, WriteOptions};

#[derive(Args)]
pub struct UpdateArgs {
    /// An input RDA file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A directory whose files are added to the archive
    #[arg(short, long, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Remove a file from the archive
    #[arg(long, value_name = "PATH")]
    delete: Vec<String>,

    /// Where to write the result, defaults to the input file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Encrypt the written blocks
    #[arg(long, default_value_t = false)]
    encrypt: bool,
}

impl UpdateArgs {
    pub fn handle(&self) -> Result<()> {
        let mut rda = RdaArchive::open(&self.file)
            .context(format!("path: {}", &self.file.display()))?;

        if let Some(directory) = &self.directory {
            for (name, file) in super::collect_files(directory)? {
                let content = std::fs::read(file.path())
                    .into_diagnostic()
                    .context(format!("opening {}", file.path().display()))?;

                if rda.does_file_exist(&name) {
                    info!("replacing {}", name);
                } else {
                    info!("adding {}", name);
                }
                rda.update_file(&name, content)
                    .context(format!("updating {name}"))?;
            }
        }

        for name in &self.delete {
            info!("deleting {}", name);
            rda.delete_file(name).context(format!("deleting {name}"))?;
        }

        let data = rda
            .serialize(WriteOptions::builder().encrypt(self.encrypt).build())
            .context("finalizing rda file")?;

        let output = self.output.as_ref().unwrap_or(&self.file);
        info!("writing {}", output.display());
        super::write_output(output, true, &data)
    }
}
