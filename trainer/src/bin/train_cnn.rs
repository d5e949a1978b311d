use std::process::ExitCode;

use log::{error, info};
use sketch_trainer::{TrainConfig, run_cnn};

fn main() -> ExitCode {
    env_logger::init();

    let cfg = match TrainConfig::cnn().with_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match run_cnn(&cfg) {
        Ok(report) => {
            info!(
                "done: {} epochs, best validation accuracy {:.3}",
                report.epochs_run, report.best_val_accuracy
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
