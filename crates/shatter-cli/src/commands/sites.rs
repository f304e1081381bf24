//! shatter sites command - print the partition site grid.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use shatter_core::{site_grid, Mesh};

use crate::{output, Cli};

#[derive(Serialize)]
struct SitesInfo {
    path: String,
    size: f64,
    sites: Vec<[f64; 3]>,
}

pub fn run(input: &Path, size: f64, cli: &Cli) -> Result<()> {
    let mesh =
        Mesh::load(input).with_context(|| format!("Failed to load mesh from {:?}", input))?;
    let bounds = mesh
        .bounds()
        .ok_or_else(|| shatter_core::ShatterError::empty_mesh("mesh has no vertices"))?;

    let sites = site_grid(bounds, size);
    let info = SitesInfo {
        path: input.display().to_string(),
        size,
        sites: sites.iter().map(|s| [s.x, s.y, s.z]).collect(),
    };

    if output::print_json(&info, cli.format, cli.quiet) {
        return Ok(());
    }

    if !cli.quiet {
        println!(
            "{} ({} sites, size {})",
            "Site Grid".bold().underline(),
            info.sites.len(),
            size
        );
        for (i, [x, y, z]) in info.sites.iter().enumerate() {
            println!("  {:>2}: ({:.4}, {:.4}, {:.4})", i, x, y, z);
        }
    }

    Ok(())
}
