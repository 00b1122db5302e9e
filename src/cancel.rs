use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};


/// Cooperative cancellation signal. Clones share the same flag, so one clone can be
/// handed to a timer thread while the search holds another.
/// Searches check it once per expansion.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
