use std::time::Instant;

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::{
    Cartogram, EngineConfig, Geography, Status, Tilegram,
    cli::{Cli, GenerateArgs},
    io::{csv::{read_csv, read_metrics}, fs::{assert_not_stdout, write_atomic}},
};

pub fn run(cli: &Cli, args: &GenerateArgs) -> Result<()> {
    assert_not_stdout(&args.output)?;

    info!("[generate] geography={} data={} -> {}",
        args.geography.display(), args.data.display(), args.output.display());

    let bytes = std::fs::read(&args.geography)
        .with_context(|| format!("[generate] Failed to read {}", args.geography.display()))?;
    let name = args.geography.file_stem().map_or("geography".into(), |s| s.to_string_lossy());
    let geography = Geography::from_geojson(name, &bytes, &args.id_key, args.name_key.as_deref())?;

    let (metric_name, records) = read_metrics(read_csv(&args.data)?)?;
    let dataset = geography.dataset(&metric_name, records)?;

    let config = EngineConfig {
        grace_steps: args.grace,
        policy: args.policy.into(),
        repair_fragments: !args.no_repair,
    };
    let mut tilegram = Tilegram::from_geography(&geography, dataset, args.scheme.into(), args.columns, args.tiles, config)?;
    if let Some(resolution) = args.resolution {
        tilegram.set_resolution(resolution)?;
    }

    let start = Instant::now();
    let status = tilegram.run(args.max_steps)?;
    let steps = tilegram.engine().steps();
    match &status {
        Status::Converged => info!("[generate] converged in {} steps ({:.2?})", steps, start.elapsed()),
        Status::Unsatisfiable(_) => warn!("[generate] stopped after {} steps: {}", steps, status),
        Status::Active => warn!("[generate] not converged after {} steps", steps),
    }
    if cli.verbose > 1 { log_states(tilegram.engine()) }

    write_atomic(&args.output, tilegram.export_topojson()?.as_bytes(), args.force)?;
    println!("Wrote tilegram -> {}", args.output.display());

    if let Some(svg) = &args.svg {
        write_atomic(svg, tilegram.to_svg()?.as_bytes(), args.force)?;
        println!("Wrote SVG -> {}", svg.display());
    }

    Ok(())
}

fn log_states(engine: &Cartogram) {
    for (id, state) in engine.states().filter(|(_, s)| !s.is_stable()) {
        debug!("[generate] {} is {:?}", id, state);
    }
}
