use std::fs;
use std::io::Read;

use voltguard_streak::{StreakSnapshot, StreakSummary};

use crate::cmd::StreakArgs;
use crate::exit::{io_error, streak_error, CliResult, SUCCESS};
use crate::output::{print_summary, OutputFormat};

pub fn run(args: StreakArgs, format: OutputFormat) -> CliResult<i32> {
    let input = read_input(&args)?;
    let snapshot = if args.strict {
        StreakSnapshot::from_json(&input).map_err(|err| streak_error("invalid snapshot", err))?
    } else {
        StreakSnapshot::from_json_lossy(&input)
    };

    let summary = StreakSummary::from_snapshot(&snapshot);
    tracing::debug!(tier = %summary.tier, streak = summary.current_streak, "summarised snapshot");
    print_summary(&summary, format);

    Ok(SUCCESS)
}

fn read_input(args: &StreakArgs) -> CliResult<String> {
    match &args.file {
        Some(path) => fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err)),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .map_err(|err| io_error("failed reading stdin", err))?;
            Ok(input)
        }
    }
}
