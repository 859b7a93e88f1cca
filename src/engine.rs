/// The narrow surface the game logic needs from its host: input, overlap
/// detection and a text overlay.  The tick clock is just the `dt` argument.

use std::collections::VecDeque;

use crate::collision::Overlap;
use crate::entities::{FrameInput, Ship};
use crate::formation::Formation;
use crate::pool::BulletPool;

pub trait InputSource {
    /// Sample the player's intent for the coming tick.
    fn poll(&mut self) -> FrameInput;
}

pub trait OverlapDetector {
    /// Append this tick's colliding pairs to `out`.
    fn detect(
        &mut self,
        ship: &Ship,
        formation: &Formation,
        bullets: &BulletPool,
        out: &mut Vec<Overlap>,
    );
}

pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

/// A one-shot text overlay anchored at a field position.
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

// ── Simple implementations ────────────────────────────────────────────────────

/// Replays a queued list of inputs, then idles.
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    frames: VecDeque<FrameInput>,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = FrameInput>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn push(&mut self, input: FrameInput) {
        self.frames.push_back(input);
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> FrameInput {
        self.frames.pop_front().unwrap_or_default()
    }
}

/// Keeps every notice it is handed, newest last.
#[derive(Clone, Debug, Default)]
pub struct NoticeBoard {
    notices: Vec<Notice>,
}

impl NoticeBoard {
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.notices.last()
    }
}

impl Notifier for NoticeBoard {
    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}
