//! Per-stage step queues.
//!
//! A stage's queue may grow while it drains; the stage ends only when its
//! queue is empty. Steps can be queued for the current stage or a later one,
//! never for one that has finished.

use std::collections::VecDeque;

use keel_core::{messages, OperationError, OperationResult};

use crate::stage::Stage;
use crate::step::Step;

#[derive(Debug, Default)]
pub(crate) struct StageQueues {
    queues: [VecDeque<Step>; 3],
    /// Stage currently draining, `None` before the first one starts.
    current: Option<Stage>,
    /// Set once the last stage drained.
    finished: bool,
}

impl StageQueues {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue `step` at the tail of `stage`.
    pub(crate) fn push(&mut self, stage: Stage, step: Step) -> OperationResult<()> {
        if !self.accepts(stage) {
            return Err(OperationError::internal(format!(
                "{} ({})",
                messages::ERR_STAGE_COMPLETED,
                stage
            )));
        }
        self.queues[stage.index()].push_back(step);
        Ok(())
    }

    /// Queue `step` at the head of `stage`, ahead of steps already waiting.
    pub(crate) fn push_front(&mut self, stage: Stage, step: Step) -> OperationResult<()> {
        if !self.accepts(stage) {
            return Err(OperationError::internal(format!(
                "{} ({})",
                messages::ERR_STAGE_COMPLETED,
                stage
            )));
        }
        self.queues[stage.index()].push_front(step);
        Ok(())
    }

    fn accepts(&self, stage: Stage) -> bool {
        match self.current {
            _ if self.finished => false,
            Some(current) => stage >= current,
            None => true,
        }
    }

    /// Start draining `stage`.
    pub(crate) fn begin(&mut self, stage: Stage) {
        self.current = Some(stage);
    }

    /// Next step of the current stage.
    pub(crate) fn pop(&mut self) -> Option<Step> {
        let stage = self.current?;
        self.queues[stage.index()].pop_front()
    }

    /// Stop accepting steps; drop whatever is still queued.
    pub(crate) fn close(&mut self) {
        self.finished = true;
        for queue in &mut self.queues {
            queue.clear();
        }
    }

    #[cfg(test)]
    pub(crate) fn pending(&self, stage: Stage) -> usize {
        self.queues[stage.index()].len()
    }
}
