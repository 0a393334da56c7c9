use std::{fs::File, io::Write, path::Path};

use itertools::Itertools;
use miette::{miette, Context, IntoDiagnostic, Result};
use walkdir::WalkDir;

pub mod extract;
pub mod list;
pub mod pack;
pub mod update;

#[derive(clap::Subcommand)]
pub enum RdaCommands {
    /// List the files of an RDA file
    List(list::ListArgs),
    /// Extract an RDA file into a directory
    Extract(extract::ExtractArgs),
    /// Pack a directory into a new RDA file
    Pack(pack::PackArgs),
    /// Add or replace files of an existing RDA file
    Update(update::UpdateArgs),
}

impl RdaCommands {
    pub fn name(&self) -> &'static str {
        match self {
            RdaCommands::List(_) => "list",
            RdaCommands::Extract(_) => "extract",
            RdaCommands::Pack(_) => "pack",
            RdaCommands::Update(_) => "update",
        }
    }

    pub fn handle(&self) -> miette::Result<()> {
        match self {
            RdaCommands::List(list) => list.handle(),
            RdaCommands::Extract(extract) => extract.handle(),
            RdaCommands::Pack(pack) => pack.handle(),
            RdaCommands::Update(update) => update.handle(),
        }
    }
}

/// Files below `directory` with their archive path
fn collect_files(directory: &Path) -> Result<Vec<(String, walkdir::DirEntry)>> {
    WalkDir::new(directory)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| !e.file_type().is_dir())
        .map(|e| {
            let relative = e.path().strip_prefix(directory).into_diagnostic()?;
            let name = relative
                .components()
                .map(|c| {
                    c.as_os_str()
                        .to_str()
                        .ok_or(miette!("unable to convert {} to a string", relative.display()))
                })
                .collect::<Result<Vec<_>>>()?
                .iter()
                .join("/");
            Ok((name, e))
        })
        .collect()
}

fn create_output(path: &Path, overwrite: bool) -> Result<File> {
    if !overwrite {
        File::create_new(path)
            .into_diagnostic()
            .context(format!("creating {}", path.display()))
    } else {
        File::create(path)
            .into_diagnostic()
            .context(format!("creating {}", path.display()))
    }
}

fn write_output(path: &Path, overwrite: bool, data: &[u8]) -> Result<()> {
    create_output(path, overwrite)?
        .write_all(data)
        .into_diagnostic()
        .context(format!("writing {}", path.display()))
}
