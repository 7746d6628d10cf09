use tokio::sync::mpsc;

use crate::link::LinkLayerEvent;

/// Physical link notifications (ACL connect/disconnect) from the radio stack.
pub trait LinkEventPort: Send + Sync {
    fn subscribe(&self) -> mpsc::UnboundedReceiver<LinkLayerEvent>;
}
