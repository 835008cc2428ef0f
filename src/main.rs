mod config;
mod error;
mod script;
mod storage;

use canvas::engine::EngineCore;

use crate::config::HostConfig;
use crate::error::HostError;
use crate::storage::FileStorage;

fn main() -> Result<(), HostError> {
    tracing_subscriber::fmt::init();

    let config = HostConfig::from_env()?;
    let mut core = EngineCore::new();
    core.set_viewport(config.viewport_width, config.viewport_height);

    if let Some(board_path) = &config.board_path {
        core.load_snapshot(script::load_board(board_path)?);
    }

    let mut comments = FileStorage::new(&config.comments_path);
    core.comments.load(&comments)?;

    let steps = script::load_steps(&config.script_path)?;
    let report = script::replay(&mut core, &steps);
    core.comments.save(&mut comments)?;

    tracing::info!(
        steps = report.steps,
        created = report.created,
        updated = report.updated,
        deleted = report.deleted,
        comments = report.comments,
        elements = core.doc.len(),
        "script replayed"
    );

    println!("{}", serde_json::to_string_pretty(&core.doc.snapshot())?);
    Ok(())
}
