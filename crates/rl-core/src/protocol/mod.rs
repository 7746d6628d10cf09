//! Line-oriented robot protocol: framing, inbound classification and
//! outbound command records.

pub mod framer;
pub mod heading;
pub mod inbound;
pub mod obstacle_buffer;
pub mod outbound;

pub use framer::RecordFramer;
pub use heading::{Heading, InvalidHeading};
pub use inbound::{classify, Classified, ClassifyError, InboundMessage, RecordKind};
pub use obstacle_buffer::{ObstacleBuffer, ObstaclePlacement};
pub use outbound::{Movement, OutboundCommand, UnknownMovement};
