//! shatter info command - display mesh statistics.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use shatter_core::Mesh;

use crate::{output, Cli};

#[derive(Serialize)]
struct MeshInfo {
    path: String,
    vertices: usize,
    faces: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounds: Option<BoundsInfo>,
    volume: f64,
    surface_area: f64,
    has_uvs: bool,
}

#[derive(Serialize)]
struct BoundsInfo {
    min: [f64; 3],
    max: [f64; 3],
    dimensions: [f64; 3],
}

pub fn run(input: &Path, cli: &Cli) -> Result<()> {
    let mesh =
        Mesh::load(input).with_context(|| format!("Failed to load mesh from {:?}", input))?;

    let bounds = mesh.bounds().map(|(min, max)| {
        let dims = max - min;
        BoundsInfo {
            min: [min.x, min.y, min.z],
            max: [max.x, max.y, max.z],
            dimensions: [dims.x, dims.y, dims.z],
        }
    });

    let info = MeshInfo {
        path: input.display().to_string(),
        vertices: mesh.vertex_count(),
        faces: mesh.face_count(),
        bounds,
        volume: mesh.volume(),
        surface_area: mesh.surface_area(),
        has_uvs: mesh.has_uvs(),
    };

    if output::print_json(&info, cli.format, cli.quiet) {
        return Ok(());
    }

    if !cli.quiet {
        println!("{}", "Mesh Information".bold().underline());
        println!("  {}: {}", "File".cyan(), info.path);
        println!("  {}: {}", "Vertices".cyan(), info.vertices);
        println!("  {}: {}", "Faces".cyan(), info.faces);
        if let Some(ref b) = info.bounds {
            println!(
                "  {}: {:.3} x {:.3} x {:.3}",
                "Dimensions".cyan(),
                b.dimensions[0],
                b.dimensions[1],
                b.dimensions[2]
            );
        }
        println!("  {}: {:.4}", "Volume".cyan(), info.volume);
        println!("  {}: {:.4}", "Surface area".cyan(), info.surface_area);
        println!(
            "  {}: {}",
            "Has UVs".cyan(),
            if info.has_uvs { "yes" } else { "no" }
        );
    }

    Ok(())
}
