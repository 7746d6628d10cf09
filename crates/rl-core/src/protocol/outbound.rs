//! Outbound command records.
//!
//! Every command is a complete, newline-terminated text record. The session
//! manager writes the bytes as they are and never interprets them.

use std::fmt;
use std::str::FromStr;

use super::Heading;

/// A pre-formatted outbound record, terminator included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundCommand(String);

impl OutboundCommand {
    /// Wrap text verbatim. The caller is responsible for termination.
    pub fn raw(record: impl Into<String>) -> Self {
        Self(record.into())
    }

    /// Operator free text. `None` when the message is blank.
    pub fn free_text(message: &str) -> Option<Self> {
        let message = message.trim();
        if message.is_empty() {
            return None;
        }
        Some(Self(format!("{message}\n")))
    }

    /// Place or move the robot footprint; `col`/`row` is the bottom-left cell.
    pub fn robot_pose(col: i32, row: i32, heading: Heading) -> Self {
        Self(format!("ROBOT,{col},{row},{heading}\n"))
    }

    /// Place or update one obstacle.
    pub fn obstacle(id: i32, col: i32, row: i32, heading: Heading) -> Self {
        Self(format!("OBS,{id},{col},{row},{heading}\n"))
    }

    pub fn start() -> Self {
        Self("START\n".to_string())
    }

    pub fn stop() -> Self {
        Self("STOP\n".to_string())
    }

    /// Movement primitive, e.g. `FD=200`.
    pub fn movement(movement: Movement, amount: u32) -> Self {
        Self(format!("{}={amount}\n", movement.code()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for OutboundCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.trim_end())
    }
}

/// Drive primitives understood by the robot controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    /// `FD`, distance in millimetres.
    Forward,
    /// `BD`, distance in millimetres.
    Backward,
    /// `FL`, degrees.
    ForwardLeft,
    /// `FR`, degrees.
    ForwardRight,
    /// `BL`, degrees.
    BackLeft,
    /// `BR`, degrees.
    BackRight,
}

impl Movement {
    pub fn code(self) -> &'static str {
        match self {
            Movement::Forward => "FD",
            Movement::Backward => "BD",
            Movement::ForwardLeft => "FL",
            Movement::ForwardRight => "FR",
            Movement::BackLeft => "BL",
            Movement::BackRight => "BR",
        }
    }

    /// Amount sent by the on-screen drive pad.
    pub fn default_amount(self) -> u32 {
        match self {
            Movement::Forward | Movement::Backward => 200,
            _ => 45,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown movement `{0}` (expected FD, BD, FL, FR, BL or BR)")]
pub struct UnknownMovement(pub String);

impl FromStr for Movement {
    type Err = UnknownMovement;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FD" => Ok(Movement::Forward),
            "BD" => Ok(Movement::Backward),
            "FL" => Ok(Movement::ForwardLeft),
            "FR" => Ok(Movement::ForwardRight),
            "BL" => Ok(Movement::BackLeft),
            "BR" => Ok(Movement::BackRight),
            _ => Err(UnknownMovement(s.trim().to_string())),
        }
    }
}
