//! Writes `class_names.json` so the label order shipped with a model matches
//! the one it was trained with.

use clap::Parser;
use leafcare_backend::classifier::labels::DEFAULT_LABELS;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "export-labels", about = "Write the class label list as JSON")]
struct Args {
    /// Where to write the label list.
    #[arg(long, default_value = "class_names.json")]
    output: PathBuf,
    /// Labels in model output order. The built-in tomato list is used when
    /// none are given.
    #[arg(long, num_args = 0..)]
    labels: Vec<String>,
}

impl Args {
    fn labels(&self) -> Vec<String> {
        if self.labels.is_empty() {
            DEFAULT_LABELS.iter().map(|l| l.to_string()).collect()
        } else {
            self.labels.clone()
        }
    }
}

fn main() -> ExitCode {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let args = Args::parse();
    let labels = args.labels();

    let json = match serde_json::to_string_pretty(&labels) {
        Ok(json) => json,
        Err(e) => {
            log::error!("Failed to serialize labels: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = std::fs::write(&args.output, json) {
        log::error!("Failed to write {}: {}", args.output.display(), e);
        return ExitCode::FAILURE;
    }

    let resolved = std::fs::canonicalize(&args.output).unwrap_or(args.output.clone());
    println!("Wrote {} labels to {}", labels.len(), resolved.display());
    println!("  Labels: {}", labels.join(", "));
    ExitCode::SUCCESS
}
