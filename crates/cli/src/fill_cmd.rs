//! `mgrid fill` — headless range fill planning and apply.
//!
//! Drives the same planner as the interactive grid: diff the source
//! rectangle against the target rectangle, build the candidate actions,
//! then either print the plan (`--dry-run`) or run the first action and
//! report per-row results.

use std::path::PathBuf;

use metagrid_engine::apply::{apply_action, RowStore};
use metagrid_engine::geometry::Rect;
use metagrid_engine::fill::build_fill_actions;

use crate::tui::data::GridData;
use crate::tui::LocalStore;
use crate::{refs, CliError, ConnArgs};

pub struct FillArgs {
    pub file: Option<PathBuf>,
    pub class: Option<String>,
    pub parent: Option<u64>,
    pub source: String,
    pub target: String,
    pub dry_run: bool,
    pub conn: ConnArgs,
}

pub fn cmd_fill(args: FillArgs) -> Result<(), CliError> {
    let mut grid = load_grid(&args)?;

    let source = refs::parse_range(&args.source)?;
    let target = refs::parse_range(&args.target)?;
    check_bounds(&grid, &source, "source")?;
    check_bounds(&grid, &target, "target")?;

    let bound = source.union(&target);
    let backup: Vec<_> = bound
        .rows()
        .filter_map(|r| grid.rows.get(r).cloned())
        .collect();

    let actions =
        build_fill_actions(&grid.rows, &grid.columns, &source, &target, &backup)
            .unwrap_or_default();

    if args.dry_run {
        let plan = serde_json::json!({
            "source": source,
            "target": target,
            "actions": actions.iter().map(|a| serde_json::json!({
                "title": a.title,
                "kind": a.kind.as_str(),
                "loadingMessage": a.loading_message,
                "writes": a.writes,
            })).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&plan).unwrap_or_default());
        return Ok(());
    }

    let Some(action) = actions.first() else {
        let report = serde_json::json!({
            "action": serde_json::Value::Null,
            "applied": 0,
            "failed": [],
            "rows": grid.rows,
        });
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
        return Ok(());
    };

    let store = resolve_store(&args)?;
    let outcome = apply_action(store.as_ref(), action, &mut grid.rows, false);

    let report = serde_json::json!({
        "action": action.title,
        "applied": outcome.applied.len(),
        "failed": outcome.errors.iter().map(|e| serde_json::json!({
            "entityId": e.entity_id,
            "message": e.message,
        })).collect::<Vec<_>>(),
        "rows": grid.rows,
    });
    println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());

    match outcome.error_summary() {
        Some(summary) => Err(CliError::api(summary)),
        None => Ok(()),
    }
}

fn load_grid(args: &FillArgs) -> Result<GridData, CliError> {
    match (&args.file, &args.class) {
        (Some(path), _) => GridData::load_file(path),
        (None, Some(class)) => {
            let client = crate::resolve_client(&args.conn)?;
            let rows = crate::fetch_rows(&client, class, args.parent)?;
            Ok(GridData::from_rows(rows))
        }
        (None, None) => Err(CliError::args("either --file or --class is required")),
    }
}

/// Saves go to the API when one is reachable (explicit --api-base or a
/// saved login); a plain --file grid applies locally and the updated
/// rows land in the JSON report.
fn resolve_store(args: &FillArgs) -> Result<Box<dyn RowStore>, CliError> {
    if args.class.is_some() || args.conn.api_base.is_some() {
        let client = crate::resolve_client(&args.conn)?;
        Ok(Box::new(client))
    } else {
        Ok(Box::new(LocalStore))
    }
}

fn check_bounds(grid: &GridData, rect: &Rect, what: &str) -> Result<(), CliError> {
    if rect.end.row >= grid.num_rows() {
        return Err(CliError::args(format!(
            "{} extends past the last row ({} rows loaded)",
            what,
            grid.num_rows()
        )));
    }
    if rect.end.column >= grid.num_cols() {
        return Err(CliError::args(format!(
            "{} extends past the last column ({} columns)",
            what,
            grid.num_cols()
        )));
    }
    Ok(())
}
