//! arh-core watches a screen region for a phrase and clicks a fixed anchor
//! when it shows up.
//!
//! A run goes through [`watcher::PollController`]: the anchor image is found
//! once on the full screen, then the region is captured, recognized and
//! checked every poll interval until the phrase appears, the run is
//! cancelled, a bound runs out, or something fails.
//!
//! ```no_run
//! use arh_core::{config::WatchConfig, timer::ThreadTimer, vision::ocr, watcher::PollController};
//! # fn demo(capper: impl arh_controller::ScreenCapper, pointer: impl arh_controller::Pointer) -> arh_core::Result<()> {
//! let config = WatchConfig::new("sendBtn.png", "让场").with_region("500,800,500,400".parse().unwrap());
//! let engine = ocr::create_engine(&config.ocr)?;
//! let report = PollController::new(config, capper, pointer, engine, ThreadTimer::new()).run();
//! report.into_result()?;
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod config;
pub mod decision;
pub mod error;
pub mod frame;
pub mod resource;
pub mod timer;
pub mod vision;
pub mod watcher;

pub use error::{Error, Result};
