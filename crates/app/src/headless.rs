use forkview_core::{parse_key_script, Effect, Settings, StateReport, Visualization};
use serde::Serialize;

use crate::cli::CliArgs;

#[derive(Debug, Serialize)]
pub(crate) struct HeadlessOutput {
    pub(crate) settings: Settings,
    pub(crate) keys: usize,
    pub(crate) effects: Vec<Effect>,
    pub(crate) state: StateReport,
}

/// Builds the scene at the requested size and replays the key script against it.
pub(crate) fn replay(args: &CliArgs) -> HeadlessOutput {
    let settings = args.settings();
    let mut visualization = Visualization::new(&settings, args.size);
    let keys = parse_key_script(&args.keys);
    let effects: Vec<Effect> = keys.iter().map(|key| visualization.press(*key)).collect();

    let applied = effects.iter().filter(|effect| **effect != Effect::None).count();
    tracing::info!(
        "headless: replayed {} keys, {} changed state",
        keys.len(),
        applied
    );

    HeadlessOutput {
        settings,
        keys: keys.len(),
        effects,
        state: visualization.report(),
    }
}

pub(crate) fn run(args: &CliArgs) -> Result<(), String> {
    let output = replay(args);
    if output.state.degenerate_projection {
        tracing::warn!("headless: final projection is degenerate (near == far)");
    }

    if args.print {
        let json = serde_json::to_string_pretty(&output).map_err(|err| err.to_string())?;
        println!("{json}");
    }

    tracing::info!("headless: completed");
    Ok(())
}
