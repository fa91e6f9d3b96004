//! The detect-and-act loop.
//!
//! ```text
//! Resolving ──anchor found──▶ Polling ──phrase seen──▶ Triggered (click once)
//!     │                        │  ▲ │
//!     │                        │  └─┘ no match: sleep
//!     ▼                        ├──▶ Cancelled
//!   Failed ◀───────────────────┼──▶ Exhausted
//!                              └──▶ Failed
//! ```
//!
//! The anchor is resolved once against a full screen capture and reused for
//! the rest of the run. Cancellation is checked around every blocking step, so
//! a cancelled run never clicks.

use std::{fmt, path::Path, time::Duration};

use arh_controller::{Pointer, ScreenCapper};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::{
    action::{ActionCommand, ActionExecutor},
    config::WatchConfig,
    decision::{DecisionEngine, TriggerEvent},
    error::{Error, Result},
    frame::{CapturedFrame, FrameSource},
    resource::TemplateAsset,
    timer::{CancelToken, Timer},
    vision::{
        ocr::{OcrEngine, TextRecognizer},
        utils::{draw_box, save_image, Rect},
        ImagePreprocessor, TemplateMatcher,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WatchState {
    Resolving,
    Polling,
    Triggered,
    Cancelled,
    /// An iteration or duration bound ran out before the phrase appeared
    Exhausted,
    Failed,
}

impl WatchState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WatchState::Resolving | WatchState::Polling)
    }
}

impl fmt::Display for WatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug)]
pub enum Outcome {
    /// The phrase was seen and the anchor clicked
    Triggered(TriggerEvent),
    Cancelled,
    Exhausted,
    Failed(Error),
}

impl Outcome {
    pub fn state(&self) -> WatchState {
        match self {
            Outcome::Triggered(_) => WatchState::Triggered,
            Outcome::Cancelled => WatchState::Cancelled,
            Outcome::Exhausted => WatchState::Exhausted,
            Outcome::Failed(_) => WatchState::Failed,
        }
    }
}

/// The resolved click target
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Anchor {
    pub center: (u32, u32),
    pub score: f32,
    pub rect: Rect,
}

impl Anchor {
    pub fn command(&self) -> ActionCommand {
        ActionCommand::new(self.center.0 as i32, self.center.1 as i32)
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub outcome: Outcome,
    /// Set once Resolving succeeded
    pub anchor: Option<Anchor>,
    /// Number of completed or attempted poll iterations
    pub iterations: u64,
    /// Every state entered, in order, ending with the terminal one
    pub states: Vec<WatchState>,
}

impl RunReport {
    pub fn final_state(&self) -> WatchState {
        self.outcome.state()
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }

    pub fn into_result(self) -> Result<Outcome> {
        match self.outcome {
            Outcome::Failed(err) => Err(err),
            outcome => Ok(outcome),
        }
    }
}

/// Captures the full screen and looks for `template` in it.
///
/// Returns the frame alongside the anchor so callers can annotate it.
pub fn resolve_anchor<C: ScreenCapper>(
    frames: &FrameSource<C>,
    template: &TemplateAsset,
    confidence: f32,
) -> Result<(Anchor, CapturedFrame)> {
    let frame = frames.capture(None)?;
    let screen = ImagePreprocessor::to_gray(&frame);
    let Some(gray) = screen.as_gray() else {
        return Err(Error::Capture(anyhow::anyhow!(
            "grayscale conversion produced a {:?} frame",
            screen.image.color()
        )));
    };

    let res = TemplateMatcher::find(gray, template.gray(), confidence)?;
    match (res.center, res.rect) {
        (Some(center), Some(rect)) if res.found => Ok((
            Anchor {
                center,
                score: res.score,
                rect,
            },
            frame,
        )),
        _ => Err(Error::AnchorNotFound {
            score: res.score,
            confidence,
        }),
    }
}

/// Resolves the anchor once and clicks it, without any text condition.
pub fn click_once<C: ScreenCapper, P: Pointer>(
    capper: C,
    pointer: P,
    template_path: &Path,
    confidence: f32,
) -> Result<Anchor> {
    let template = TemplateAsset::load(template_path)?;
    let (anchor, _) = resolve_anchor(&FrameSource::new(capper), &template, confidence)?;
    info!(
        "anchor found at {:?} (score {:.3})",
        anchor.center, anchor.score
    );
    ActionExecutor::new(pointer).click(anchor.command())?;
    Ok(anchor)
}

#[derive(Default)]
struct Trace {
    anchor: Option<Anchor>,
    iterations: u64,
    states: Vec<WatchState>,
}

impl Trace {
    fn enter(&mut self, state: WatchState) {
        debug!("entering {state}");
        self.states.push(state);
    }
}

/// Drives one detect-and-act run over the injected collaborators.
pub struct PollController<C, P, E, T> {
    config: WatchConfig,
    frames: FrameSource<C>,
    executor: ActionExecutor<P>,
    recognizer: TextRecognizer<E>,
    timer: T,
    cancel: CancelToken,
}

impl<C, P, E, T> PollController<C, P, E, T>
where
    C: ScreenCapper,
    P: Pointer,
    E: OcrEngine,
    T: Timer,
{
    pub fn new(config: WatchConfig, capper: C, pointer: P, engine: E, timer: T) -> Self {
        let recognizer = TextRecognizer::new(engine, config.language.clone());
        Self {
            config,
            frames: FrameSource::new(capper),
            executor: ActionExecutor::new(pointer),
            recognizer,
            timer,
            cancel: CancelToken::new(),
        }
    }

    /// Replaces the internal token, e.g. with one shared with a signal handler
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// Runs until a terminal state. Never panics on collaborator errors,
    /// they end up in [`Outcome::Failed`].
    pub fn run(&mut self) -> RunReport {
        let mut trace = Trace::default();
        let outcome = self.drive(&mut trace);
        trace.enter(outcome.state());

        match &outcome {
            Outcome::Triggered(event) => info!(
                "triggered by {:?} after {} iteration(s)",
                event.text.text, trace.iterations
            ),
            Outcome::Cancelled => info!("cancelled after {} iteration(s)", trace.iterations),
            Outcome::Exhausted => info!(
                "gave up after {} iteration(s) without seeing {:?}",
                trace.iterations, self.config.target_phrase
            ),
            Outcome::Failed(err) => error!("failed: {err}"),
        }

        RunReport {
            outcome,
            anchor: trace.anchor,
            iterations: trace.iterations,
            states: trace.states,
        }
    }

    fn drive(&mut self, trace: &mut Trace) -> Outcome {
        trace.enter(WatchState::Resolving);
        let anchor = match self.resolve() {
            Ok(Some(anchor)) => anchor,
            Ok(None) => return Outcome::Cancelled,
            Err(err) => return Outcome::Failed(err),
        };
        trace.anchor = Some(anchor);
        info!(
            "anchor resolved at {:?} (score {:.3}), watching for {:?}",
            anchor.center, anchor.score, self.config.target_phrase
        );

        let interval = self.config.poll_interval();
        let max_duration = self.config.max_duration();
        let started = self.timer.now();
        loop {
            if self.cancel.is_cancelled() {
                return Outcome::Cancelled;
            }
            trace.enter(WatchState::Polling);
            trace.iterations += 1;

            match self.poll(trace.iterations) {
                Ok(Some(event)) => {
                    return match self.executor.click(anchor.command()) {
                        Ok(()) => Outcome::Triggered(event),
                        Err(err) => Outcome::Failed(err),
                    };
                }
                Ok(None) => {}
                // Ctrl-C also reaches an OCR child process and kills it
                Err(err) if self.cancel.is_cancelled() => {
                    debug!("ignoring error after cancellation: {err}");
                    return Outcome::Cancelled;
                }
                Err(err) => return Outcome::Failed(err),
            }
            if self.cancel.is_cancelled() {
                return Outcome::Cancelled;
            }

            if self
                .config
                .max_iterations
                .is_some_and(|max| trace.iterations >= max)
            {
                return Outcome::Exhausted;
            }
            if max_duration.is_some_and(|max| self.elapsed_since(started) >= max) {
                return Outcome::Exhausted;
            }

            if !self.timer.sleep(interval, &self.cancel) {
                return Outcome::Cancelled;
            }
        }
    }

    /// `Ok(None)` when cancelled before the anchor was found
    fn resolve(&mut self) -> Result<Option<Anchor>> {
        self.config.validate()?;
        let template = TemplateAsset::load(&self.config.template_path)?;

        let delay = self.config.start_delay();
        if !delay.is_zero() {
            info!("waiting {:.1}s before resolving the anchor", delay.as_secs_f32());
            if !self.timer.sleep(delay, &self.cancel) {
                return Ok(None);
            }
        }
        if self.cancel.is_cancelled() {
            return Ok(None);
        }

        let (anchor, frame) =
            resolve_anchor(&self.frames, &template, self.config.match_confidence)?;
        if let Some(dir) = &self.config.debug_dir {
            let annotated = draw_box(&frame.image, anchor.rect, [255, 0, 0]);
            dump(&annotated, &dir.join("anchor"));
        }

        if self.cancel.is_cancelled() {
            return Ok(None);
        }
        Ok(Some(anchor))
    }

    /// One capture, recognize, decide step. `Ok(None)` means "not yet" or cancelled.
    fn poll(&mut self, iteration: u64) -> Result<Option<TriggerEvent>> {
        let frame = self.frames.capture(self.config.region)?;
        if self.cancel.is_cancelled() {
            return Ok(None);
        }

        let prepared = ImagePreprocessor::prepare(&frame, self.config.binarize);
        if let Some(dir) = &self.config.debug_dir {
            // overwritten every poll, only the latest frame is kept
            dump(&prepared.image, &dir.join("poll"));
        }

        let text = self.recognizer.recognize_prepared(&prepared)?;
        info!(
            "#{iteration} recognized {:?} in {:.3}s",
            text.text,
            text.elapsed.as_secs_f32()
        );
        if self.cancel.is_cancelled() {
            return Ok(None);
        }

        Ok(DecisionEngine::evaluate(text, &self.config.target_phrase))
    }

    fn elapsed_since(&self, started: Duration) -> Duration {
        self.timer.now().saturating_sub(started)
    }
}

fn dump(image: &image::DynamicImage, path: &Path) {
    if let Err(err) = save_image(image, path) {
        warn!("failed to save debug frame: {err:#}");
    }
}

#[cfg(test)]
mod test {
    use std::{
        path::PathBuf,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Mutex,
        },
    };

    use arh_controller::ScreenRegion;
    use image::{DynamicImage, GrayImage, Rgb, RgbImage};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    const REGION: ScreenRegion = ScreenRegion {
        x: 10,
        y: 10,
        width: 80,
        height: 40,
    };

    fn noise_screen(seed: u64) -> RgbImage {
        let mut rng = StdRng::seed_from_u64(seed);
        RgbImage::from_fn(160, 240, |_, _| Rgb(rng.random::<[u8; 3]>()))
    }

    /// A fixed screen; captures are counted and region captures can be made to fail
    #[derive(Clone)]
    struct FakeScreen {
        screen: RgbImage,
        captures: Arc<AtomicUsize>,
        fail_regions: bool,
    }

    impl FakeScreen {
        fn new(screen: RgbImage) -> Self {
            Self {
                screen,
                captures: Arc::default(),
                fail_regions: false,
            }
        }
    }

    impl ScreenCapper for FakeScreen {
        fn screencap(&self, region: Option<ScreenRegion>) -> anyhow::Result<DynamicImage> {
            self.captures.fetch_add(1, Ordering::SeqCst);
            match region {
                None => Ok(DynamicImage::ImageRgb8(self.screen.clone())),
                Some(_) if self.fail_regions => anyhow::bail!("display went away"),
                Some(r) => Ok(DynamicImage::ImageRgb8(self.screen.clone()).crop_imm(
                    r.x as u32,
                    r.y as u32,
                    r.width,
                    r.height,
                )),
            }
        }
    }

    /// Returns the scripted lines in order, repeating the last one
    struct ScriptedOcr {
        lines: Vec<&'static str>,
        calls: Arc<AtomicUsize>,
        cancel_on_call: Option<(usize, CancelToken)>,
    }

    impl ScriptedOcr {
        fn new(lines: Vec<&'static str>) -> Self {
            Self {
                lines,
                calls: Arc::default(),
                cancel_on_call: None,
            }
        }
    }

    impl OcrEngine for ScriptedOcr {
        fn recognize_text(&mut self, image: &GrayImage, language: &str) -> anyhow::Result<String> {
            assert_eq!(image.dimensions(), (REGION.width, REGION.height));
            assert_eq!(language, "chi_sim");
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some((n, token)) = &self.cancel_on_call {
                if *n == call {
                    token.cancel();
                }
            }
            let line = self.lines[(call - 1).min(self.lines.len() - 1)];
            if line == "<error>" {
                anyhow::bail!("tesseract crashed");
            }
            if line == "<interrupted>" {
                anyhow::bail!("tesseract killed by SIGINT");
            }
            Ok(format!("  {line}\n"))
        }
    }

    #[derive(Default, Clone)]
    struct RecordingPointer {
        position: Option<(i32, i32)>,
        clicks: Arc<Mutex<Vec<(i32, i32)>>>,
    }

    impl Pointer for RecordingPointer {
        fn move_to(&mut self, x: i32, y: i32) -> anyhow::Result<()> {
            self.position = Some((x, y));
            Ok(())
        }

        fn click(&mut self) -> anyhow::Result<()> {
            let position = self
                .position
                .ok_or_else(|| anyhow::anyhow!("click before move"))?;
            self.clicks.lock().unwrap().push(position);
            Ok(())
        }
    }

    /// Virtual clock; optionally cancels during the n-th sleep
    struct ManualTimer {
        now: Duration,
        sleeps: Arc<AtomicUsize>,
        cancel_on_sleep: Option<(usize, CancelToken)>,
    }

    impl ManualTimer {
        fn new() -> Self {
            Self {
                now: Duration::ZERO,
                sleeps: Arc::default(),
                cancel_on_sleep: None,
            }
        }
    }

    impl Timer for ManualTimer {
        fn now(&self) -> Duration {
            self.now
        }

        fn sleep(&mut self, duration: Duration, cancel: &CancelToken) -> bool {
            let n = self.sleeps.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some((at, token)) = &self.cancel_on_sleep {
                if *at == n {
                    token.cancel();
                }
            }
            if cancel.is_cancelled() {
                return false;
            }
            self.now += duration;
            true
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        template_path: PathBuf,
        screen: FakeScreen,
        pointer: RecordingPointer,
    }

    /// A noise screen with `btn.png` cut from (100,200)-(140,230)
    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let screen = noise_screen(2024);
        let template_path = dir.path().join("btn.png");
        DynamicImage::ImageRgb8(screen.clone())
            .crop_imm(100, 200, 40, 30)
            .save(&template_path)
            .unwrap();
        Fixture {
            _dir: dir,
            template_path,
            screen: FakeScreen::new(screen),
            pointer: RecordingPointer::default(),
        }
    }

    fn config(fixture: &Fixture, phrase: &str) -> WatchConfig {
        WatchConfig::new(&fixture.template_path, phrase).with_region(REGION)
    }

    fn polling(n: usize) -> impl Iterator<Item = WatchState> {
        std::iter::repeat(WatchState::Polling).take(n)
    }

    #[test]
    fn test_triggered_on_third_iteration() {
        let f = fixture();
        let ocr = ScriptedOcr::new(vec!["loading…", "loading…", "Done"]);
        let ocr_calls = ocr.calls.clone();
        let timer = ManualTimer::new();
        let sleeps = timer.sleeps.clone();

        let mut controller = PollController::new(
            config(&f, "Done"),
            f.screen.clone(),
            f.pointer.clone(),
            ocr,
            timer,
        );
        let report = controller.run();

        assert_eq!(report.anchor.map(|a| a.center), Some((120, 215)));
        assert_eq!(report.iterations, 3);
        let expected = [WatchState::Resolving]
            .into_iter()
            .chain(polling(3))
            .chain([WatchState::Triggered])
            .collect::<Vec<_>>();
        assert_eq!(report.states, expected);
        match &report.outcome {
            Outcome::Triggered(event) => {
                assert!(event.triggered);
                assert_eq!(event.text.text, "Done");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(*f.pointer.clicks.lock().unwrap(), vec![(120, 215)]);
        assert_eq!(ocr_calls.load(Ordering::SeqCst), 3);
        assert_eq!(sleeps.load(Ordering::SeqCst), 2);
        // one full screen capture plus one region capture per iteration
        assert_eq!(f.screen.captures.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_cancelled_after_five_iterations() {
        let f = fixture();
        let cancel = CancelToken::new();
        let mut timer = ManualTimer::new();
        timer.cancel_on_sleep = Some((5, cancel.clone()));

        let mut controller = PollController::new(
            config(&f, "Done"),
            f.screen.clone(),
            f.pointer.clone(),
            ScriptedOcr::new(vec!["loading…"]),
            timer,
        )
        .with_cancel_token(cancel);
        let report = controller.run();

        let expected = [WatchState::Resolving]
            .into_iter()
            .chain(polling(5))
            .chain([WatchState::Cancelled])
            .collect::<Vec<_>>();
        assert_eq!(report.states, expected);
        assert!(matches!(report.outcome, Outcome::Cancelled));
        assert!(f.pointer.clicks.lock().unwrap().is_empty());
    }

    #[test]
    fn test_cancelled_before_run() {
        let f = fixture();
        let mut controller = PollController::new(
            config(&f, ""),
            f.screen.clone(),
            f.pointer.clone(),
            ScriptedOcr::new(vec!["Done"]),
            ManualTimer::new(),
        );
        controller.cancel_token().cancel();
        let report = controller.run();

        assert_eq!(report.states, vec![WatchState::Resolving, WatchState::Cancelled]);
        assert_eq!(report.iterations, 0);
        assert_eq!(f.screen.captures.load(Ordering::SeqCst), 0);
        assert!(f.pointer.clicks.lock().unwrap().is_empty());
    }

    #[test]
    fn test_cancel_wins_over_match() {
        let f = fixture();
        let cancel = CancelToken::new();
        let mut ocr = ScriptedOcr::new(vec!["Done"]);
        ocr.cancel_on_call = Some((1, cancel.clone()));

        let report = PollController::new(
            config(&f, "Done"),
            f.screen.clone(),
            f.pointer.clone(),
            ocr,
            ManualTimer::new(),
        )
        .with_cancel_token(cancel)
        .run();

        assert_eq!(report.final_state(), WatchState::Cancelled);
        assert!(f.pointer.clicks.lock().unwrap().is_empty());
    }

    #[test]
    fn test_ocr_error_after_cancel_is_cancelled() {
        let f = fixture();
        let cancel = CancelToken::new();
        let mut ocr = ScriptedOcr::new(vec!["loading…", "<interrupted>"]);
        ocr.cancel_on_call = Some((2, cancel.clone()));

        let report = PollController::new(
            config(&f, "Done"),
            f.screen.clone(),
            f.pointer.clone(),
            ocr,
            ManualTimer::new(),
        )
        .with_cancel_token(cancel)
        .run();

        assert_eq!(report.final_state(), WatchState::Cancelled);
        assert_eq!(report.iterations, 2);
    }

    #[test]
    fn test_missing_template() {
        let f = fixture();
        let config = WatchConfig::new(f.template_path.with_file_name("nope.png"), "Done");
        let report = PollController::new(
            config,
            f.screen.clone(),
            f.pointer.clone(),
            ScriptedOcr::new(vec!["Done"]),
            ManualTimer::new(),
        )
        .run();

        assert_eq!(report.states, vec![WatchState::Resolving, WatchState::Failed]);
        assert_eq!(report.anchor, None);
        let err = report.into_result().unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(f.screen.captures.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_oversized_delay_fails_cleanly() {
        let f = fixture();
        let config = WatchConfig {
            start_delay_secs: 1e20,
            ..config(&f, "Done")
        };
        let report = PollController::new(
            config,
            f.screen.clone(),
            f.pointer.clone(),
            ScriptedOcr::new(vec!["Done"]),
            ManualTimer::new(),
        )
        .run();

        assert_eq!(report.states, vec![WatchState::Resolving, WatchState::Failed]);
        assert!(report.into_result().unwrap_err().is_configuration());
        assert_eq!(f.screen.captures.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_anchor_not_found() {
        let f = fixture();
        let other = FakeScreen::new(noise_screen(7));
        let report = PollController::new(
            config(&f, "Done"),
            other,
            f.pointer.clone(),
            ScriptedOcr::new(vec!["Done"]),
            ManualTimer::new(),
        )
        .run();

        assert_eq!(report.states, vec![WatchState::Resolving, WatchState::Failed]);
        assert!(matches!(
            report.outcome,
            Outcome::Failed(Error::AnchorNotFound { confidence, .. }) if confidence == 0.8
        ));
        assert!(f.pointer.clicks.lock().unwrap().is_empty());
    }

    #[test]
    fn test_max_iterations() {
        let f = fixture();
        let timer = ManualTimer::new();
        let sleeps = timer.sleeps.clone();
        let report = PollController::new(
            config(&f, "Done").with_max_iterations(4),
            f.screen.clone(),
            f.pointer.clone(),
            ScriptedOcr::new(vec!["loading…"]),
            timer,
        )
        .run();

        assert_eq!(report.final_state(), WatchState::Exhausted);
        assert_eq!(report.iterations, 4);
        assert_eq!(sleeps.load(Ordering::SeqCst), 3);
        assert!(f.pointer.clicks.lock().unwrap().is_empty());
        assert!(!report.is_failed());
    }

    #[test]
    fn test_max_duration() {
        let f = fixture();
        let config = WatchConfig {
            max_duration_secs: Some(2.5),
            ..config(&f, "Done")
        };
        let report = PollController::new(
            config,
            f.screen.clone(),
            f.pointer.clone(),
            ScriptedOcr::new(vec!["loading…"]),
            ManualTimer::new(),
        )
        .run();

        assert_eq!(report.final_state(), WatchState::Exhausted);
        assert_eq!(report.iterations, 4);
    }

    #[test]
    fn test_capture_failure_while_polling() {
        let f = fixture();
        let mut screen = f.screen.clone();
        screen.fail_regions = true;
        let report = PollController::new(
            config(&f, "Done"),
            screen,
            f.pointer.clone(),
            ScriptedOcr::new(vec!["Done"]),
            ManualTimer::new(),
        )
        .run();

        assert_eq!(
            report.states,
            vec![WatchState::Resolving, WatchState::Polling, WatchState::Failed]
        );
        assert!(matches!(report.outcome, Outcome::Failed(Error::Capture(_))));
        assert!(report.anchor.is_some());
    }

    #[test]
    fn test_ocr_failure() {
        let f = fixture();
        let report = PollController::new(
            config(&f, "Done"),
            f.screen.clone(),
            f.pointer.clone(),
            ScriptedOcr::new(vec!["loading…", "<error>"]),
            ManualTimer::new(),
        )
        .run();

        assert_eq!(report.iterations, 2);
        let err = report.into_result().unwrap_err();
        assert!(matches!(err, Error::Ocr(_)));
        assert!(err.to_string().contains("tesseract crashed"));
        assert!(f.pointer.clicks.lock().unwrap().is_empty());
    }

    #[test]
    fn test_start_delay_is_cancellable() {
        let f = fixture();
        let cancel = CancelToken::new();
        let mut timer = ManualTimer::new();
        timer.cancel_on_sleep = Some((1, cancel.clone()));
        let config = WatchConfig {
            start_delay_secs: 3.0,
            ..config(&f, "Done")
        };

        let report = PollController::new(
            config,
            f.screen.clone(),
            f.pointer.clone(),
            ScriptedOcr::new(vec!["Done"]),
            timer,
        )
        .with_cancel_token(cancel)
        .run();

        assert_eq!(report.states, vec![WatchState::Resolving, WatchState::Cancelled]);
        assert_eq!(f.screen.captures.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_debug_dumps() {
        let f = fixture();
        let debug_dir = tempfile::tempdir().unwrap();
        let config = WatchConfig {
            debug_dir: Some(debug_dir.path().to_path_buf()),
            ..config(&f, "Done").with_binarize(true)
        };
        let report = PollController::new(
            config,
            f.screen.clone(),
            f.pointer.clone(),
            ScriptedOcr::new(vec!["loading…", "loading…", "loading…", "Done"]),
            ManualTimer::new(),
        )
        .run();

        assert_eq!(report.final_state(), WatchState::Triggered);
        assert_eq!(report.iterations, 4);
        let mut names = std::fs::read_dir(debug_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect::<Vec<_>>();
        names.sort();
        assert_eq!(names, vec!["anchor.png", "poll.png"]);
        let poll = image::open(debug_dir.path().join("poll.png")).unwrap();
        assert_eq!((poll.width(), poll.height()), (REGION.width, REGION.height));
    }

    #[test]
    fn test_click_once() {
        let f = fixture();
        let anchor = click_once(f.screen.clone(), f.pointer.clone(), &f.template_path, 0.8).unwrap();
        assert_eq!(anchor.center, (120, 215));
        assert_eq!(*f.pointer.clicks.lock().unwrap(), vec![(120, 215)]);
    }
}
