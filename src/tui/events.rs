use crossterm::event::{Event as CrosstermEvent, KeyEvent, KeyEventKind, MouseEvent};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, warn};

use crate::api::{FetchResult, ProductPage};
use crate::app::PendingLoad;

/// Application events
#[derive(Debug)]
pub enum Event {
    /// Keyboard input event
    Key(KeyEvent),

    /// Mouse input event
    Mouse(MouseEvent),

    /// Terminal resize event
    Resize(u16, u16),

    /// Periodic tick event
    Tick,

    /// A spawned page fetch finished
    FetchCompleted {
        pending: PendingLoad,
        result: FetchResult<ProductPage>,
    },
}

/// Event handler for managing input events
pub struct EventHandler {
    /// Event receiver channel
    receiver: mpsc::UnboundedReceiver<Event>,

    /// Event sender channel
    sender: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    /// Create a new event handler and start reading terminal input.
    ///
    /// Must be called from within a tokio runtime. The reader emits a
    /// `Tick` whenever `tick_rate` passes without input and stops once the
    /// handler is dropped.
    pub fn new(tick_rate: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        let reader = sender.clone();
        tokio::task::spawn_blocking(move || read_terminal(reader, tick_rate));

        Self { receiver, sender }
    }

    /// Create a handler that only carries internally sent events
    #[cfg(test)]
    pub fn detached() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { receiver, sender }
    }

    /// Get the next event
    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Send an internal event
    #[cfg(test)]
    pub fn send(&self, event: Event) -> anyhow::Result<()> {
        self.sender
            .send(event)
            .map_err(|_| anyhow::anyhow!("event channel closed"))?;
        Ok(())
    }

    /// Get a clone of the sender
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.sender.clone()
    }
}

fn read_terminal(sender: mpsc::UnboundedSender<Event>, tick_rate: Duration) {
    loop {
        let event = match crossterm::event::poll(tick_rate) {
            Ok(true) => match crossterm::event::read() {
                Ok(event) => convert_crossterm_event(event),
                Err(e) => {
                    warn!("Failed to read terminal event: {}", e);
                    continue;
                }
            },
            Ok(false) => Some(Event::Tick),
            Err(e) => {
                error!("Terminal polling failed: {}", e);
                break;
            }
        };

        if let Some(event) = event {
            if sender.send(event).is_err() {
                break;
            }
        }
    }
}

/// Convert crossterm events to application events
fn convert_crossterm_event(event: CrosstermEvent) -> Option<Event> {
    match event {
        // Some platforms report key releases too
        CrosstermEvent::Key(key_event) if key_event.kind == KeyEventKind::Press => {
            Some(Event::Key(key_event))
        }
        CrosstermEvent::Key(_) => None,
        CrosstermEvent::Mouse(mouse_event) => Some(Event::Mouse(mouse_event)),
        CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
        CrosstermEvent::FocusGained | CrosstermEvent::FocusLost | CrosstermEvent::Paste(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    #[test]
    fn test_key_release_dropped() {
        let mut key = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE);
        assert!(matches!(
            convert_crossterm_event(CrosstermEvent::Key(key)),
            Some(Event::Key(_))
        ));

        key.kind = KeyEventKind::Release;
        key.state = KeyEventState::NONE;
        assert!(convert_crossterm_event(CrosstermEvent::Key(key)).is_none());
    }

    #[test]
    fn test_resize_forwarded() {
        assert!(matches!(
            convert_crossterm_event(CrosstermEvent::Resize(80, 24)),
            Some(Event::Resize(80, 24))
        ));
        assert!(convert_crossterm_event(CrosstermEvent::FocusLost).is_none());
    }

    #[tokio::test]
    async fn test_internal_events_delivered() {
        let mut handler = EventHandler::detached();
        handler.send(Event::Tick).unwrap();
        handler
            .sender()
            .send(Event::Resize(100, 40))
            .unwrap();

        assert!(matches!(handler.next().await, Some(Event::Tick)));
        assert!(matches!(handler.next().await, Some(Event::Resize(100, 40))));
    }
}
