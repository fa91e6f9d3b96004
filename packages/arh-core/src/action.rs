use arh_controller::Pointer;
use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};

/// Where to click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionCommand {
    pub target: (i32, i32),
}

impl ActionCommand {
    pub fn new(x: i32, y: i32) -> Self {
        Self { target: (x, y) }
    }
}

/// Moves the pointer to the target and clicks there.
pub struct ActionExecutor<P> {
    pointer: P,
}

impl<P: Pointer> ActionExecutor<P> {
    pub fn new(pointer: P) -> Self {
        Self { pointer }
    }

    /// Consumes `command`; done once both pointer calls return.
    pub fn click(&mut self, command: ActionCommand) -> Result<()> {
        let (x, y) = command.target;
        self.pointer.move_to(x, y).map_err(Error::Action)?;
        self.pointer.click().map_err(Error::Action)?;
        info!("clicked at ({x}, {y})");
        Ok(())
    }

    pub fn pointer(&self) -> &P {
        &self.pointer
    }
}
