use std::sync::Arc;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use dynaform::{
    FieldMap,
    posts::{ApiError, Record},
};

use crate::widgets::{EnvHandle, Popup};

pub enum Message {
    // Invalidate the current frame and request a redraw
    Invalidate,
    Submit(FieldMap),
    Loaded(Result<Vec<Record>, ApiError>),
    Created {
        values: FieldMap,
        result: Result<(), ApiError>,
    },
    SetPopup(Box<dyn Popup + Send>),
    DismissPopup,
}

pub struct Env {
    tx: Arc<EnvTx>,
    rx: UnboundedReceiver<Message>,
}

struct EnvTx {
    tx: UnboundedSender<Message>,
}

impl EnvTx {
    fn new(tx: UnboundedSender<Message>) -> Self {
        EnvTx { tx }
    }

    fn send(&self, msg: Message) {
        // The receiver only goes away while the app is shutting down.
        let _ = self.tx.send(msg);
    }
}

impl crate::widgets::Env for EnvTx {
    fn invalidate(&self) {
        self.send(Message::Invalidate);
    }

    fn submit(&self, values: FieldMap) {
        self.send(Message::Submit(values));
    }

    fn set_popup(&self, popup: Box<dyn Popup + Send>) {
        self.send(Message::SetPopup(popup));
    }

    fn dismiss_popup(&self) {
        self.send(Message::DismissPopup);
    }
}

impl Env {
    pub fn new() -> Self {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<Message>();
        Env {
            tx: Arc::new(EnvTx::new(tx)),
            rx,
        }
    }

    pub fn tx(&self) -> EnvHandle {
        self.tx.clone()
    }

    /// Raw sender for background tasks that report results back to the loop.
    pub fn sender(&self) -> UnboundedSender<Message> {
        self.tx.tx.clone()
    }

    pub fn rx(&mut self) -> &mut UnboundedReceiver<Message> {
        &mut self.rx
    }
}
