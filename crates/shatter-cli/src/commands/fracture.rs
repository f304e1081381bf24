//! shatter fracture command - run the fragment generator.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use rayon::prelude::*;
use serde::Serialize;
use shatter_core::{
    log_fracture_outcome, log_mesh_stats, validate_fracture, FractureParams, Mesh,
};

use crate::{output, Cli};

#[derive(Serialize)]
struct FractureInfo {
    path: String,
    size: f64,
    sites: usize,
    groups: usize,
    skipped_groups: usize,
    shells: Vec<ShellInfo>,
    total_volume: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    open_shells: Option<usize>,
}

#[derive(Serialize)]
struct ShellInfo {
    site: usize,
    vertices: usize,
    triangles: usize,
    surface_triangles: usize,
    closure_triangles: usize,
    volume: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    closed: Option<bool>,
}

pub fn run(
    input: &Path,
    output_dir: Option<&Path>,
    size: f64,
    seed: Option<u64>,
    validate: bool,
    cli: &Cli,
) -> Result<()> {
    let mesh =
        Mesh::load(input).with_context(|| format!("Failed to load mesh from {:?}", input))?;
    log_mesh_stats(&mesh, "fracture input");

    let params = FractureParams {
        size,
        seed,
        ..Default::default()
    };
    let outcome = mesh.fracture(&params)?;
    log_fracture_outcome(&outcome);

    let report = validate.then(|| validate_fracture(&outcome.shells));

    let shells: Vec<ShellInfo> = outcome
        .shells
        .iter()
        .enumerate()
        .map(|(i, shell)| ShellInfo {
            site: shell.site,
            vertices: shell.vertex_count(),
            triangles: shell.triangle_count(),
            surface_triangles: shell.surface_triangles,
            closure_triangles: shell.closure_triangles,
            volume: shell.volume(),
            closed: report.as_ref().map(|r| r.shells[i].is_closed),
        })
        .collect();

    let info = FractureInfo {
        path: input.display().to_string(),
        size,
        sites: outcome.sites.len(),
        groups: outcome.groups,
        skipped_groups: outcome.skipped_groups,
        total_volume: outcome.total_volume(),
        shells,
        open_shells: report.as_ref().map(|r| r.open_shell_count()),
    };

    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {:?}", dir))?;

        // Fragments are independent; write them in parallel.
        outcome
            .shells
            .par_iter()
            .enumerate()
            .try_for_each(|(i, shell)| {
                let path = dir.join(format!("fragment_{i:03}.obj"));
                shell.to_mesh().save(&path)
            })
            .with_context(|| format!("Failed to write fragments to {:?}", dir))?;
    }

    if output::print_json(&info, cli.format, cli.quiet) {
        return Ok(());
    }

    if !cli.quiet {
        println!("{}", "Fracture Result".bold().underline());
        println!("  {}: {}", "File".cyan(), info.path);
        println!(
            "  {}: {} sites, {} groups ({} skipped)",
            "Partition".cyan(),
            info.sites,
            info.groups,
            info.skipped_groups
        );
        println!("  {}: {:.4}", "Total volume".cyan(), info.total_volume);
        println!();

        for (i, shell) in info.shells.iter().enumerate() {
            let closed = match shell.closed {
                Some(true) => " closed".green().to_string(),
                Some(false) => " OPEN".red().bold().to_string(),
                None => String::new(),
            };
            println!(
                "  fragment {:>3}: site {:>2}, {:>5} verts, {:>5} tris ({} surface + {} closure), volume {:.4}{}",
                i,
                shell.site,
                shell.vertices,
                shell.triangles,
                shell.surface_triangles,
                shell.closure_triangles,
                shell.volume,
                closed
            );
        }

        if let Some(open) = info.open_shells {
            println!();
            if open == 0 {
                println!("  {}", "All shells closed".green());
            } else {
                println!("  {} {} shells have open edges", "Warning:".yellow(), open);
            }
        }

        if let Some(dir) = output_dir {
            println!();
            println!(
                "  Wrote {} fragments to {}",
                info.shells.len(),
                dir.display()
            );
        }
    }

    Ok(())
}
