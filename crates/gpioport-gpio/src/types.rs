use std::fmt;
use std::str::FromStr;

/// Configuration state of the owned pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinState {
    Closed,
    Output,
    Input,
    InputWithInterrupts,
}

impl PinState {
    pub fn as_str(self) -> &'static str {
        match self {
            PinState::Closed => "closed",
            PinState::Output => "output",
            PinState::Input => "input",
            PinState::InputWithInterrupts => "input_with_interrupts",
        }
    }
}

impl fmt::Display for PinState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested pin direction, as named by the host (`input` / `output`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    /// Value written to the sysfs `direction` attribute.
    pub fn as_sysfs(self) -> &'static str {
        match self {
            Direction::Input => "in",
            Direction::Output => "out",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "input" => Ok(Direction::Input),
            "output" => Ok(Direction::Output),
            other => Err(format!("unknown direction '{other}'")),
        }
    }
}

/// Edge(s) that raise an interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
    Both,
}

impl Edge {
    /// Value written to the sysfs `edge` attribute.
    pub fn as_sysfs(self) -> &'static str {
        match self {
            Edge::Rising => "rising",
            Edge::Falling => "falling",
            Edge::Both => "both",
        }
    }
}

impl FromStr for Edge {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "rising" => Ok(Edge::Rising),
            "falling" => Ok(Edge::Falling),
            "both" => Ok(Edge::Both),
            other => Err(format!("unknown edge '{other}'")),
        }
    }
}

/// Logic level of the pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// `'1'` is high; every other byte reads as low.
    pub fn from_byte(byte: u8) -> Self {
        if byte == b'1' {
            Level::High
        } else {
            Level::Low
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Level::Low => b'0',
            Level::High => b'1',
        }
    }

    pub fn as_int(self) -> i64 {
        match self {
            Level::Low => 0,
            Level::High => 1,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}
