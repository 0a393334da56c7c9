use clap::Args;
use miette::{miette, Context, IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing::info;

use anno_rda::RdaArchive;

#[derive(Args)]
pub struct ExtractArgs {
    /// An input RDA file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let mut rda = RdaArchive::open(&self.file)
            .context(format!("path: {}", &self.file.display()))?;

        let names = rda.file_names().map(str::to_owned).collect::<Vec<_>>();
        for name in names {
            let p = self.directory.join(&name);
            info!("writing {}", p.display());

            let parent = p
                .parent()
                .ok_or(miette!("unable to find parent of {}", p.display()))?;
            std::fs::create_dir_all(parent)
                .into_diagnostic()
                .context(format!("creating {}", parent.display()))?;

            let content = rda
                .extract_file(&name)
                .context(format!("extracting {name}"))?;
            super::write_output(&p, self.overwrite, content)?;
        }

        Ok(())
    }
}
