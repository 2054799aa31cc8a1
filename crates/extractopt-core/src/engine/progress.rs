//! Progress events emitted while an optimization runs.
//!
//! The library never renders progress itself. Front ends install a callback and
//! translate events into whatever display they prefer.

#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// A named pipeline stage (descriptors, assembly, training, search) begins.
    PhaseStart { name: &'static str },
    PhaseFinish,

    /// A stage with a known number of units of work, e.g. trees or grid points.
    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Brackets `work` between `PhaseStart` and `PhaseFinish`.
    ///
    /// `PhaseFinish` is only sent when `work` succeeds.
    pub fn phase<T, E>(
        &self,
        name: &'static str,
        work: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        self.report(Progress::PhaseStart { name });
        let out = work()?;
        self.report(Progress::PhaseFinish);
        Ok(out)
    }
}
