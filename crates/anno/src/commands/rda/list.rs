use clap::Args;
use itertools::Itertools;
use miette::{Context, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;

use anno_rda::RdaArchive;

#[derive(Args)]
pub struct ListArgs {
    /// An input RDA file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Also print the blocks of the archive
    #[arg(long, default_value_t = false)]
    blocks: bool,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let rda = RdaArchive::open(&self.file)
            .context(format!("path: {}", &self.file.display()))?;

        if self.blocks {
            for (i, block) in rda.blocks().iter().enumerate() {
                let flags = block.flags().iter_names().map(|(name, _)| name).join(" | ");
                println!(
                    "{} {} {} files",
                    format!("block {i}").blue(),
                    flags.dimmed(),
                    block.header().file_count
                );
            }
        }

        for file in rda.entries() {
            println!(
                "{:>12} {:>12}  {}",
                file.uncompressed_size(),
                file.compressed_size().dimmed(),
                file.path()
            );
        }

        println!(
            "{} files, {} bytes",
            rda.len().green(),
            rda.uncompressed_size().green()
        );

        Ok(())
    }
}
