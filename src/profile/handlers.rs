//! Host application collaborators
//!
//! Each trait is implemented for matching closures, so a host can pass
//! either a closure or its own type.

use crate::record::ConfigRecord;

/// Receives the record captured on a client save request
pub trait SaveConfigHandler {
    /// `None` when the live values could not be captured or exported
    fn on_save_requested(&mut self, record: Option<&ConfigRecord>);
}

/// Receives client restart requests
pub trait RestartHandler {
    fn on_restart_requested(&mut self);
}

/// Observes client connection changes
pub trait ConnectionObserver {
    fn on_connection_changed(&mut self, connected: bool);
}

impl<F: FnMut(Option<&ConfigRecord>)> SaveConfigHandler for F {
    fn on_save_requested(&mut self, record: Option<&ConfigRecord>) {
        self(record)
    }
}

impl<F: FnMut()> RestartHandler for F {
    fn on_restart_requested(&mut self) {
        self()
    }
}

impl<F: FnMut(bool)> ConnectionObserver for F {
    fn on_connection_changed(&mut self, connected: bool) {
        self(connected)
    }
}

/// Observer that ignores connection changes
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObserver;

impl ConnectionObserver for NoObserver {
    fn on_connection_changed(&mut self, _connected: bool) {}
}
