//! Per-peer countdown clocks.
//!
//! Each playing peer runs its own pair of real-time counters, decremented
//! locally based on whose turn its own position says it is. Clock values
//! are never transmitted between peers; that is a protocol invariant, so
//! two peers with diverged move histories may reach different timeout
//! conclusions.

use chess::Color;

/// A pair of independent countdown clocks, one per color, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockPair {
    white: f32,
    black: f32,
}

impl ClockPair {
    pub fn new(seconds_per_side: f32) -> Self {
        Self {
            white: seconds_per_side,
            black: seconds_per_side,
        }
    }

    /// Burns `dt` seconds from `side`'s clock. Returns true if that clock
    /// just ran out. Clocks never go negative.
    pub fn tick(&mut self, side: Color, dt: f32) -> bool {
        let clock = match side {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        };
        if *clock <= 0.0 {
            return false;
        }
        *clock = (*clock - dt).max(0.0);
        *clock <= 0.0
    }

    pub fn remaining(&self, side: Color) -> f32 {
        match side {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }
}

/// `mm:ss` rendering of a clock value.
pub fn format_clock(seconds: f32) -> String {
    let whole = seconds.max(0.0) as u32;
    format!("{:02}:{:02}", whole / 60, whole % 60)
}
