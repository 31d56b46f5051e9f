use miette::Result;
use std::path::Path;

use slnmake_ops::ops_inspect;
use slnmake_ops::ops_locate::locate_solution;
use slnmake_util::errors::SlnmakeError;

pub fn exec(solution: Option<&Path>, json: bool) -> Result<()> {
    let cwd = std::env::current_dir().map_err(SlnmakeError::Io)?;
    let solution_path = locate_solution(solution, &cwd)?;
    tracing::debug!("using solution {}", solution_path.display());
    let report = ops_inspect::inspect(&solution_path)?;

    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}
