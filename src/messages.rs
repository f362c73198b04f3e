use std::sync::Mutex;

/// Collects user-facing warnings and errors raised while processing airdrops.
///
/// Every message is also written to the log.
#[derive(Debug, Default)]
pub struct MessagesAggregator {
    warnings: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl MessagesAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_warning(&self, msg: impl Into<String>) {
        let msg = msg.into();
        log::warn!("{}", msg);
        push(&self.warnings, msg);
    }

    pub fn add_error(&self, msg: impl Into<String>) {
        let msg = msg.into();
        log::error!("{}", msg);
        push(&self.errors, msg);
    }

    pub fn warnings(&self) -> Vec<String> {
        snapshot(&self.warnings)
    }

    pub fn errors(&self) -> Vec<String> {
        snapshot(&self.errors)
    }

    pub fn consume_warnings(&self) -> Vec<String> {
        take(&self.warnings)
    }

    pub fn consume_errors(&self) -> Vec<String> {
        take(&self.errors)
    }
}

// A poisoned lock still holds valid strings
fn push(list: &Mutex<Vec<String>>, msg: String) {
    match list.lock() {
        Ok(mut guard) => guard.push(msg),
        Err(poisoned) => poisoned.into_inner().push(msg),
    }
}

fn snapshot(list: &Mutex<Vec<String>>) -> Vec<String> {
    match list.lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

fn take(list: &Mutex<Vec<String>>) -> Vec<String> {
    match list.lock() {
        Ok(mut guard) => std::mem::take(&mut *guard),
        Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
    }
}
