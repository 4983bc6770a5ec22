use std::process::ExitCode;

use gitdeck::cli::{self, Reported};
use gitdeck::ui::output;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if err.downcast_ref::<Reported>().is_none() {
                output::error(format!("{:#}", err));
            }
            ExitCode::FAILURE
        }
    }
}
