//! Headless day-cycle simulator for the garbage day engine.
//!
//! Reads maps, loot tables and a world description from `data/` under the
//! project root (or `GARBAGE_DAY_ROOT`), plays `GARBAGE_DAY_DAYS` days and
//! saves after each night.

use std::process::ExitCode;

mod app;

fn main() -> ExitCode {
    app::run()
}
