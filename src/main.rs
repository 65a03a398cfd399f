use std::process;
use std::sync::Arc;

use handshake::{log, parse_args, parse_config, run, set_log_file, Config, StdoutTranscript};

fn main() {
    let args = parse_args();

    if let Some(log_file) = &args.log_file {
        if let Err(e) = set_log_file(log_file) {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }

    let _ = log("Begin of main()");

    let mut config = match &args.config_file {
        Some(path) => match parse_config(path) {
            Ok(config) => config,
            Err(e) => {
                let _ = log(&format!("Error reading config file {}: {}", path, e));
                eprintln!("Error reading config file {}: {}", path, e);
                process::exit(1);
            }
        },
        None => Config::default(),
    };
    if let Some(delay) = args.producer_delay_ms {
        config.producer_delay_ms = delay;
    }
    if let Some(order) = args.start_order {
        config.start_order = order;
    }

    if let Err(e) = run(&config, Arc::new(StdoutTranscript)) {
        let _ = log(&format!("Handshake failed: {}", e));
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let _ = log("End of main()");
}
