//! epitrends - HIV indicator trend analysis & chart generation
//!
//! Batch entry point: load the configured workbook once, run each
//! configured pipeline, write its artifact, exit.

use anyhow::{bail, Context, Result};
use epitrends::charts::{JsonExporter, Renderer, StaticRenderer};
use epitrends::config::RunConfig;
use epitrends::{data, pipeline};
use std::fs::{self, File};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let mut args = std::env::args().skip(1);
    let config_path = match args.next() {
        Some(path) => path,
        None => bail!("usage: epitrends <config.json> [out_dir]"),
    };
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "out".to_string()));

    let config: RunConfig = serde_json::from_reader(
        File::open(&config_path).with_context(|| format!("open {config_path}"))?,
    )
    .with_context(|| format!("parse {config_path}"))?;
    fs::create_dir_all(&out_dir)?;

    let observations = data::load(&config.source, &config.columns)?;
    if let Some(area_source) = &config.area_source {
        let area = data::load_sheet(area_source)?;
        info!(rows = area.height(), "loaded area grouping table");
    }

    let renderer = StaticRenderer::default();
    let exporter = JsonExporter;

    if let Some(params) = &config.map {
        let prepared = pipeline::map::prepare(&observations, params)?;
        let out = out_dir.join(format!("world_map_{}.json", params.year));
        exporter.render(&prepared.input, &prepared.spec, &out)?;
    }
    if let Some(params) = &config.bars {
        let prepared = pipeline::bars::prepare(&observations, params)?;
        let out = out_dir.join(format!("men_vs_women_{}.png", params.year));
        renderer.render(&prepared.input, &prepared.spec, &out)?;
    }
    if let Some(params) = &config.heatmap {
        let prepared = pipeline::heatmap::prepare(&observations, params)?;
        renderer.render(&prepared.input, &prepared.spec, &out_dir.join("indicator_heatmap.png"))?;
    }
    if let Some(params) = &config.gap {
        let prepared = pipeline::gap::prepare(&observations, params)?;
        renderer.render(&prepared.input, &prepared.spec, &out_dir.join("treatment_gap.png"))?;
    }
    if let Some(params) = &config.area {
        let prepared = pipeline::area::prepare(&observations, params)?;
        renderer.render(&prepared.input, &prepared.spec, &out_dir.join("stacked_area.png"))?;
    }

    info!("done");
    Ok(())
}
