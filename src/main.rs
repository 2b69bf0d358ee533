// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::env;
use std::io;
use std::process;

use crowd_density::cli::count;
use crowd_density::{DEFAULT_MODEL, OutputPayload, YOLOModel, error};

/// Exit code for a model that can't be loaded at startup.
const MODEL_LOAD_EXIT_CODE: i32 = 2;

fn main() {
    // Loaded before arguments are looked at, so a bad model fails every invocation
    let mut model = match YOLOModel::load(DEFAULT_MODEL) {
        Ok(model) => model,
        Err(e) => {
            error!("{e}");
            process::exit(MODEL_LOAD_EXIT_CODE);
        }
    };

    let payload = count::run(env::args_os(), &mut model);

    if let Err(e) = payload.write_to(io::stdout().lock()) {
        error!("Failed to write output: {e}");
        process::exit(1);
    }

    if let OutputPayload::Failed { .. } = payload {
        process::exit(payload.exit_code());
    }
}
