use crate::config::load_config;
use crate::project::Project;
use crate::render::{DiagramRenderer, write_output_svg};
use crate::scene_dump::write_scene_dump;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "amedit", version, about = "ArchiMate diagram renderer and editor")]
pub struct Args {
    /// Input project description (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Diagram view to render, by id or name. Defaults to the first view.
    #[arg(short = 'v', long = "view")]
    pub view: Option<String>,

    /// List the views in the project and exit
    #[arg(long = "listViews")]
    pub list_views: bool,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme and editor settings)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Write a JSON snapshot of the rendered scene
    #[arg(long = "dumpScene")]
    pub dump_scene: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let input = read_input(args.input.as_deref())?;
    let project = Project::from_json(&input)?;

    if args.list_views {
        for diagram in project.diagrams() {
            println!("{}\t{}", diagram.id, diagram.name);
        }
        return Ok(());
    }

    let diagram = match args.view.as_deref() {
        Some(selector) => project
            .diagrams()
            .iter()
            .find(|d| d.id == selector || d.name == selector)
            .ok_or_else(|| anyhow::anyhow!("no view named or identified by '{selector}'"))?,
        None => project
            .diagrams()
            .first()
            .ok_or_else(|| anyhow::anyhow!("project contains no views"))?,
    };

    let mut renderer = DiagramRenderer::new(&config);
    renderer.build(&project, diagram)?;
    let svg = renderer.svg();

    if let Some(path) = &args.dump_scene {
        write_scene_dump(path, &project, diagram, renderer.routed())?;
    }

    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&svg, &output)?;
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path) -> Result<()> {
    crate::render::write_output_png(svg, output)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path) -> Result<()> {
    Err(anyhow::anyhow!(
        "PNG output requires building with the 'png' feature"
    ))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok(buf);
        }
        return Ok(std::fs::read_to_string(path)?);
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
