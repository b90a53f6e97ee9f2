mod app;
mod data;
mod graph;
mod render;
mod util;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};

use crate::data::{EdgeSet, LoadOptions, load_dataset};
use crate::graph::{AnchorLayout, FREQUENCY_THRESHOLD, Scene};
use crate::render::{SvgOptions, layout_report, render_svg};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open the interactive cluster map viewer.
    View(ViewArgs),
    /// Settle the layout headlessly and write a static SVG document.
    Render(RenderArgs),
}

#[derive(Debug, Args)]
struct InputArgs {
    /// People table: name,role,organization,impOfPeople,impOforganization,clusterSize
    #[arg(long)]
    people: PathBuf,

    /// Official relationship table: source,target,frequency
    #[arg(long)]
    links: PathBuf,

    /// Optional second (unofficial) relationship table, same columns
    #[arg(long)]
    extra_links: Option<PathBuf>,

    /// Fixed anchor-table organization list (comma separated). People outside
    /// this list fail validation. Default: first-seen order from the data.
    #[arg(long, value_delimiter = ',')]
    organizations: Option<Vec<String>>,
}

impl InputArgs {
    fn into_load_options(self) -> LoadOptions {
        LoadOptions {
            people_path: self.people,
            links_path: self.links,
            extra_links_path: self.extra_links,
            organizations: self.organizations,
        }
    }
}

#[derive(Debug, Args)]
struct ViewArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Settle the layout before the first frame instead of animating it.
    #[arg(long)]
    settled: bool,
}

#[derive(Debug, Args)]
struct RenderArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output SVG path.
    #[arg(short, long)]
    out: PathBuf,

    /// Also write the settled layout (positions, radii, colors) as JSON.
    #[arg(long)]
    layout_json: Option<PathBuf>,

    /// Render the unofficial edge set instead of the official one.
    #[arg(long)]
    unofficial: bool,

    /// Base canvas height before margins (the width is fixed at 750).
    #[arg(long, default_value_t = 750.0)]
    canvas_height: f32,
}

fn main() -> Result<()> {
    match Cli::parse().cmd {
        Command::View(args) => run_view(args),
        Command::Render(args) => run_render(args),
    }
}

fn run_view(args: ViewArgs) -> Result<()> {
    let options = args.input.into_load_options();
    let settle_on_load = args.settled;

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1280.0, 860.0]),
        ..Default::default()
    };

    eframe::run_native(
        "orgmap",
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(app::ClusterMapApp::new(
                cc,
                options.clone(),
                settle_on_load,
            )))
        }),
    )
    .map_err(|error| anyhow!("failed to start the viewer: {error}"))
}

fn run_render(args: RenderArgs) -> Result<()> {
    let options = args.input.into_load_options();
    let dataset = load_dataset(&options)?;
    let anchors = AnchorLayout::new(&dataset.anchor_labels);

    let edge_set = if args.unofficial {
        EdgeSet::Unofficial
    } else {
        EdgeSet::Official
    };

    let mut scene = Scene::build(
        &dataset,
        &anchors,
        dataset.edges(edge_set),
        FREQUENCY_THRESHOLD,
    )?;
    let steps = scene.settle();

    let svg_options = SvgOptions {
        canvas_height: args.canvas_height,
        ..SvgOptions::default()
    };
    let svg = render_svg(&scene, &svg_options);
    fs::write(&args.out, svg).with_context(|| format!("failed to write {}", args.out.display()))?;
    println!(
        "Wrote {} ({} people, {} {} edges, settled in {} steps)",
        args.out.display(),
        scene.nodes.len(),
        scene.edges.len(),
        edge_set.label(),
        steps
    );

    if let Some(path) = args.layout_json {
        let report = layout_report(&scene, &dataset);
        let json = serde_json::to_string_pretty(&report).context("failed to encode layout JSON")?;
        fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}
