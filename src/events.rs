#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    SimEvent(SimEvent),
    AppEvent(AppEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    /// Start or stop the timer
    TogglePause,

    /// Advance a single generation
    Step,

    /// Shorten the tick interval
    Faster,

    /// Lengthen the tick interval
    Slower,

    /// Seed the grid again
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The terminal changed size
    Resize { cols: u16, rows: u16 },

    /// Exit the application
    Exit,
}
