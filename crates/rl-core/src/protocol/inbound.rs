//! Classification of inbound protocol records.
//!
//! A record is one trimmed, newline-delimited line produced by
//! [`RecordFramer`](super::RecordFramer). Rules are tried in order and the
//! first match wins:
//!
//! | record                    | result                                   |
//! |---------------------------|------------------------------------------|
//! | `STOP`                    | `StatusUpdate("STOP")` + run-mode reset  |
//! | `TARGET,<id>,<label>`     | `ObstacleTargetAssignment`               |
//! | `ROBOT,<col>,<row>,<dir>` | `RobotPose`                              |
//! | `{"status":"<text>"}`     | `StatusUpdate(<TEXT>)`                   |
//! | anything else             | `RawLine`                                |
//!
//! Keywords match case-insensitively. A keyword record whose fields do not
//! validate is malformed; it is reported and dropped, never treated as raw.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::Heading;

const STOP_TOKEN: &str = "STOP";
const TARGET_PREFIX: &str = "TARGET,";
const ROBOT_PREFIX: &str = "ROBOT,";
const STATUS_KEY: &str = "status";

/// Typed message decoded from one inbound record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Robot footprint placement; `col`/`row` address the bottom-left cell.
    RobotPose { col: i32, row: i32, heading: Heading },
    /// Image-recognition result bound to an obstacle.
    ObstacleTargetAssignment { obstacle_id: i32, target_label: String },
    StatusUpdate { text: String },
    RawLine { text: String },
}

impl fmt::Display for InboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InboundMessage::RobotPose { col, row, heading } => {
                write!(f, "robot at ({col}, {row}) facing {heading}")
            }
            InboundMessage::ObstacleTargetAssignment {
                obstacle_id,
                target_label,
            } => write!(f, "obstacle {obstacle_id} -> target {target_label}"),
            InboundMessage::StatusUpdate { text } => write!(f, "status {text}"),
            InboundMessage::RawLine { text } => f.write_str(text),
        }
    }
}

/// Outcome of classifying one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub message: InboundMessage,
    /// The robot reported `STOP`: a running autonomous mode has ended.
    pub run_mode_reset: bool,
}

impl Classified {
    fn message(message: InboundMessage) -> Self {
        Self {
            message,
            run_mode_reset: false,
        }
    }
}

/// Keyword records that carry structured fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Target,
    Robot,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Target => f.write_str("TARGET"),
            RecordKind::Robot => f.write_str("ROBOT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("{kind} record needs at least {expected} fields, got {found}")]
    FieldCount {
        kind: RecordKind,
        expected: usize,
        found: usize,
    },

    #[error("{kind} record field `{field}` is not an integer: `{value}`")]
    NotAnInteger {
        kind: RecordKind,
        field: &'static str,
        value: String,
    },

    #[error(transparent)]
    InvalidHeading(#[from] super::heading::InvalidHeading),
}

/// Classify one trimmed, non-empty record.
pub fn classify(record: &str) -> Result<Classified, ClassifyError> {
    let record = record.trim();

    if record.eq_ignore_ascii_case(STOP_TOKEN) {
        return Ok(Classified {
            message: InboundMessage::StatusUpdate {
                text: STOP_TOKEN.to_string(),
            },
            run_mode_reset: true,
        });
    }

    if starts_with_ignore_case(record, TARGET_PREFIX) {
        return classify_target(record).map(Classified::message);
    }

    if starts_with_ignore_case(record, ROBOT_PREFIX) {
        return classify_robot(record).map(Classified::message);
    }

    if let Some(text) = status_envelope(record) {
        return Ok(Classified::message(InboundMessage::StatusUpdate {
            text: text.to_uppercase(),
        }));
    }

    Ok(Classified::message(InboundMessage::RawLine {
        text: record.to_string(),
    }))
}

fn starts_with_ignore_case(record: &str, prefix: &str) -> bool {
    record
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn fields(record: &str) -> Vec<&str> {
    record.split(',').map(str::trim).collect()
}

fn require_fields(kind: RecordKind, fields: &[&str], expected: usize) -> Result<(), ClassifyError> {
    if fields.len() < expected {
        return Err(ClassifyError::FieldCount {
            kind,
            expected,
            found: fields.len(),
        });
    }
    Ok(())
}

fn integer(kind: RecordKind, field: &'static str, value: &str) -> Result<i32, ClassifyError> {
    value.parse().map_err(|_| ClassifyError::NotAnInteger {
        kind,
        field,
        value: value.to_string(),
    })
}

fn classify_target(record: &str) -> Result<InboundMessage, ClassifyError> {
    let fields = fields(record);
    require_fields(RecordKind::Target, &fields, 3)?;

    Ok(InboundMessage::ObstacleTargetAssignment {
        obstacle_id: integer(RecordKind::Target, "obstacle_id", fields[1])?,
        target_label: fields[2].to_string(),
    })
}

fn classify_robot(record: &str) -> Result<InboundMessage, ClassifyError> {
    let fields = fields(record);
    require_fields(RecordKind::Robot, &fields, 4)?;

    Ok(InboundMessage::RobotPose {
        col: integer(RecordKind::Robot, "col", fields[1])?,
        row: integer(RecordKind::Robot, "row", fields[2])?,
        heading: fields[3].parse()?,
    })
}

/// Text of a `{"status": "<text>"}` envelope with exactly one key.
fn status_envelope(record: &str) -> Option<String> {
    if !record.starts_with('{') {
        return None;
    }
    let value: serde_json::Value = serde_json::from_str(record).ok()?;
    let object = value.as_object()?;
    if object.len() != 1 {
        return None;
    }
    object.get(STATUS_KEY)?.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(record: &str) -> InboundMessage {
        classify(record).unwrap().message
    }

    #[test]
    fn stop_is_status_with_run_mode_reset() {
        let classified = classify("stop").unwrap();
        assert!(classified.run_mode_reset);
        assert_eq!(
            classified.message,
            InboundMessage::StatusUpdate {
                text: "STOP".to_string()
            }
        );
    }

    #[test]
    fn robot_pose_is_decoded() {
        assert_eq!(
            message("ROBOT,3,4,N"),
            InboundMessage::RobotPose {
                col: 3,
                row: 4,
                heading: Heading::North
            }
        );
        assert_eq!(
            message("robot, 10 , 2 , w"),
            InboundMessage::RobotPose {
                col: 10,
                row: 2,
                heading: Heading::West
            }
        );
    }

    #[test]
    fn robot_with_bad_heading_is_malformed() {
        assert!(matches!(
            classify("ROBOT,3,4,Q"),
            Err(ClassifyError::InvalidHeading(_))
        ));
    }

    #[test]
    fn robot_with_non_integer_coordinates_is_malformed() {
        assert_eq!(
            classify("ROBOT,x,4,N"),
            Err(ClassifyError::NotAnInteger {
                kind: RecordKind::Robot,
                field: "col",
                value: "x".to_string()
            })
        );
    }

    #[test]
    fn target_assignment_is_decoded_with_trimmed_label() {
        assert_eq!(
            message("TARGET,7,B1 "),
            InboundMessage::ObstacleTargetAssignment {
                obstacle_id: 7,
                target_label: "B1".to_string()
            }
        );
    }

    #[test]
    fn target_with_two_fields_is_rejected() {
        assert_eq!(
            classify("TARGET,7"),
            Err(ClassifyError::FieldCount {
                kind: RecordKind::Target,
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn status_envelope_is_uppercased() {
        assert_eq!(
            message(r#"{"status":"done"}"#),
            InboundMessage::StatusUpdate {
                text: "DONE".to_string()
            }
        );
    }

    #[test]
    fn json_with_extra_keys_is_raw() {
        let record = r#"{"status":"done","extra":1}"#;
        assert_eq!(
            message(record),
            InboundMessage::RawLine {
                text: record.to_string()
            }
        );
    }

    #[test]
    fn anything_else_is_raw() {
        assert_eq!(
            message("hello"),
            InboundMessage::RawLine {
                text: "hello".to_string()
            }
        );
        // Prefix without the comma is not a keyword record.
        assert_eq!(
            message("ROBOTIC"),
            InboundMessage::RawLine {
                text: "ROBOTIC".to_string()
            }
        );
    }
}
