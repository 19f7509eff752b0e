use crate::canvas::Canvas;
use crate::scheduler::Scheduler;

/// Everything a game is allowed to touch outside its own state.
#[derive(Debug)]
pub struct Host {
    pub scheduler: Scheduler,
    pub canvas: Canvas,
    pub status: String,
}

impl Host {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            scheduler: Scheduler::new(),
            canvas: Canvas::new(width, height),
            status: String::new(),
        }
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
    }
}
