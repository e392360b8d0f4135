//! Minor mode lifecycle
//!
//! A minor mode is switched on and off per buffer. The ModeSlot holds
//! the mode's state object and runs its enable/disable hooks; while the
//! mode is on, its key bindings are consulted before the global ones.

use tracing::debug;

use crate::host::Host;
use crate::input::Key;

/// A buffer-local minor mode
pub trait MinorMode {
    /// Command name that switches the mode on and off
    fn name(&self) -> &'static str;

    /// Mode-line text shown while the mode is on
    fn lighter(&self) -> String;

    /// Called when the mode is switched on
    fn on_enable(&mut self, host: &mut dyn Host);

    /// Called when the mode is switched off
    fn on_disable(&mut self, host: &mut dyn Host);

    /// In-mode key bindings as (key, command name)
    fn bindings(&self) -> Vec<(Key, &'static str)>;

    /// Run an in-mode command; returns false for unknown commands
    fn run_command(&mut self, command: &str, host: &mut dyn Host) -> bool;
}

/// A minor mode together with its on/off flag
pub struct ModeSlot<M: MinorMode> {
    mode: M,
    enabled: bool,
}

impl<M: MinorMode> ModeSlot<M> {
    /// Wrap a mode that starts switched off
    pub fn new(mode: M) -> Self {
        Self { mode, enabled: false }
    }

    pub fn mode(&self) -> &M {
        &self.mode
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Switch the mode on; does nothing if it already is
    pub fn enable(&mut self, host: &mut dyn Host) {
        if !self.enabled {
            debug!(mode = self.mode.name(), "enabling minor mode");
            self.enabled = true;
            self.mode.on_enable(host);
        }
    }

    /// Switch the mode off; does nothing if it already is
    pub fn disable(&mut self, host: &mut dyn Host) {
        if self.enabled {
            debug!(mode = self.mode.name(), "disabling minor mode");
            self.enabled = false;
            self.mode.on_disable(host);
        }
    }

    /// The mode command: flip on/off, returning the new flag
    pub fn toggle(&mut self, host: &mut dyn Host) -> bool {
        if self.enabled {
            self.disable(host);
        } else {
            self.enable(host);
        }
        self.enabled
    }

    /// Mode-line text, empty while the mode is off
    pub fn lighter(&self) -> String {
        if self.enabled {
            self.mode.lighter()
        } else {
            String::new()
        }
    }

    /// In-mode command bound to `key`, if the mode is on
    pub fn lookup(&self, key: Key) -> Option<&'static str> {
        if !self.enabled {
            return None;
        }
        self.mode
            .bindings()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, command)| command)
    }

    /// Run the in-mode command bound to `key`; returns whether one ran
    pub fn dispatch(&mut self, key: Key, host: &mut dyn Host) -> bool {
        match self.lookup(key) {
            Some(command) => self.mode.run_command(command, host),
            None => false,
        }
    }
}
