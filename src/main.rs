mod args;
mod utils;

use std::{process::ExitCode, time::Duration};

use arh_controller::{Pointer, ScreenCapper};
use arh_core::{
    timer::{CancelToken, ThreadTimer, Timer},
    vision::ocr,
    watcher::{click_once, Outcome, PollController},
};
use clap::Parser;
use color_print::cprintln;
use tracing::{error, info};

use crate::{
    args::{ClickArgs, Cli, Commands, WatchArgs},
    utils::{cancel_on_ctrl_c, init_logger},
};

fn main() -> ExitCode {
    init_logger();
    let cli = Cli::parse();

    let res = match cli.command {
        Commands::Watch(args) => watch(args),
        Commands::Click(args) => click(args),
    };
    match res {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn watch(args: WatchArgs) -> anyhow::Result<ExitCode> {
    let config = args.into_config()?;
    // fail on a missing OCR engine before touching the screen
    let engine = ocr::create_engine(&config.ocr)?;
    let (capper, pointer) = connect_desktop()?;

    let cancel = CancelToken::new();
    cancel_on_ctrl_c(cancel.clone())?;

    info!(
        "watching {} for {:?}, press Ctrl-C to stop",
        config
            .region
            .map_or("the full screen".to_string(), |r| r.to_string()),
        config.target_phrase
    );
    let report = PollController::new(config, capper, pointer, engine, ThreadTimer::new())
        .with_cancel_token(cancel)
        .run();

    let code = match &report.outcome {
        Outcome::Triggered(event) => {
            cprintln!(
                "<green>triggered</green> by {:?} after {} poll(s)",
                event.text.text,
                report.iterations
            );
            ExitCode::SUCCESS
        }
        Outcome::Cancelled => {
            cprintln!("<yellow>cancelled</yellow> after {} poll(s)", report.iterations);
            ExitCode::SUCCESS
        }
        Outcome::Exhausted => {
            cprintln!("<yellow>gave up</yellow> after {} poll(s)", report.iterations);
            ExitCode::SUCCESS
        }
        Outcome::Failed(err) => {
            cprintln!("<red>failed</red>: {}", err);
            ExitCode::FAILURE
        }
    };
    Ok(code)
}

fn click(args: ClickArgs) -> anyhow::Result<ExitCode> {
    let (capper, pointer) = connect_desktop()?;

    let cancel = CancelToken::new();
    cancel_on_ctrl_c(cancel.clone())?;
    if args.delay > 0.0 {
        info!("clicking in {:.1}s", args.delay);
        let delay = Duration::try_from_secs_f32(args.delay)?;
        if !ThreadTimer::new().sleep(delay, &cancel) {
            cprintln!("<yellow>cancelled</yellow>");
            return Ok(ExitCode::SUCCESS);
        }
    }

    let anchor = click_once(capper, pointer, &args.template, args.confidence)?;
    cprintln!(
        "<green>clicked</green> at {:?} (score {:.3})",
        anchor.center,
        anchor.score
    );
    Ok(ExitCode::SUCCESS)
}

#[cfg(feature = "desktop")]
fn connect_desktop() -> anyhow::Result<(impl ScreenCapper, impl Pointer)> {
    arh_controller::desktop::connect()
}

#[cfg(not(feature = "desktop"))]
fn connect_desktop() -> anyhow::Result<(Box<dyn ScreenCapper>, Box<dyn Pointer>)> {
    anyhow::bail!("configuration error: arh was built without desktop support, rebuild with `--features desktop`")
}
