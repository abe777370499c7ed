/// Game-time timers.
///
/// Games never touch the wall clock: the engine hands them the elapsed
/// milliseconds of each tick and they push that into these timers. A game that
/// is paused simply stops advancing them, and dropping the game drops every
/// pending timer with it.

/// Fires once every `period` milliseconds of game time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repeating {
    period: u32,
    elapsed: u32,
}

impl Repeating {
    pub fn new(period: u32) -> Self {
        Self { period: period.max(1), elapsed: 0 }
    }

    /// Advance by `dt` and return how many periods completed.
    pub fn advance(&mut self, dt: u32) -> u32 {
        self.elapsed = self.elapsed.saturating_add(dt);
        let fired = self.elapsed / self.period;
        self.elapsed %= self.period;
        fired
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    /// Change the period and restart the phase from zero.
    pub fn set_period(&mut self, period: u32) {
        self.period = period.max(1);
        self.elapsed = 0;
    }

    pub fn reset(&mut self) {
        self.elapsed = 0;
    }
}

/// One-shot timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
    done: bool,
}

impl Countdown {
    pub fn new(ms: u32) -> Self {
        Self { remaining: ms, done: false }
    }

    /// Returns `true` exactly once, on the tick that reaches zero.
    pub fn advance(&mut self, dt: u32) -> bool {
        if self.done {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(dt);
        if self.remaining == 0 {
            self.done = true;
            return true;
        }
        false
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn rearm(&mut self, ms: u32) {
        self.remaining = ms;
        self.done = false;
    }
}
