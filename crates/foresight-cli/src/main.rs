use clap::{Arg, Command};
use log::LevelFilter;

use foresight_cli::launcher;

fn main() {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("FORESIGHT_LOG", "error,foresight=info"))
        .init();

    // All positionals are optional: the launcher owns the missing-argument
    // path and reports it through the JSON envelope, not through clap.
    Command::new("foresight-train")
        .version(clap::crate_version!())
        .about("Train a binary classifier and report the outcome as a JSON envelope")
        .arg(
            Arg::new("modelid")
                .help("Model unique identifier")
                .required(false),
        )
        .arg(
            Arg::new("directory")
                .help("Directory to store all generated outputs")
                .required(false),
        )
        .arg(
            Arg::new("training_file")
                .help("Path to the training data file")
                .required(false),
        )
        .arg(
            Arg::new("extra")
                .help("Additional arguments are ignored")
                .num_args(0..)
                .hide(true),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    let argv: Vec<String> = std::env::args().collect();
    let outcome = launcher::run(&argv);

    match serde_json::to_string(&outcome) {
        Ok(line) => println!("{}", line),
        Err(err) => {
            // Should be unreachable; keep the single-JSON-line contract anyway.
            log::error!("Failed to serialize result envelope: {}", err);
            println!("{{\"status\":1,\"errors\":[\"Failed to serialize result envelope\"]}}");
        }
    }
    std::process::exit(outcome.status);
}
