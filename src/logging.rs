/// File-backed logger.
///
/// The terminal is in raw mode on the alternate screen while the game runs,
/// so nothing may be written to stderr. Records go to the configured log file
/// instead. `RUST_LOG` overrides the configured level.

use std::fs::File;
use std::io::Write;

use env_logger::{Builder, Env, Target};

use crate::config::GameConfig;

pub fn init(config: &GameConfig) {
    let file = match File::create(&config.log_file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: could not open log file {}: {e}", config.log_file.display());
            return;
        }
    };

    let result = Builder::from_env(Env::default().default_filter_or(config.log_level.as_str()))
        .target(Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            writeln!(buf, "[{:<5} {}] {}", record.level(), record.target(), record.args())
        })
        .try_init();

    if let Err(e) = result {
        eprintln!("Warning: logger already initialized: {e}");
    }
}
