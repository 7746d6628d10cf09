use super::{Heading, OutboundCommand};

/// One obstacle placement made by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObstaclePlacement {
    pub id: i32,
    pub col: i32,
    pub row: i32,
    pub heading: Heading,
}

impl ObstaclePlacement {
    pub fn command(&self) -> OutboundCommand {
        OutboundCommand::obstacle(self.id, self.col, self.row, self.heading)
    }
}

/// Buffers obstacle placements until the operator sends them as one batch.
///
/// Re-placing an obstacle replaces its entry but keeps the position of the
/// id's first appearance.
#[derive(Debug, Default, Clone)]
pub struct ObstacleBuffer {
    entries: Vec<ObstaclePlacement>,
}

impl ObstacleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, placement: ObstaclePlacement) {
        match self.entries.iter_mut().find(|e| e.id == placement.id) {
            Some(existing) => *existing = placement,
            None => self.entries.push(placement),
        }
    }

    pub fn remove(&mut self, id: i32) -> Option<ObstaclePlacement> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn placements(&self) -> &[ObstaclePlacement] {
        &self.entries
    }

    /// All buffered obstacles concatenated into one record batch.
    ///
    /// `None` when nothing is buffered. The buffer is left intact.
    pub fn combined_command(&self) -> Option<OutboundCommand> {
        if self.entries.is_empty() {
            return None;
        }
        let batch: String = self
            .entries
            .iter()
            .map(|e| e.command().as_str().to_string())
            .collect();
        Some(OutboundCommand::raw(batch))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
