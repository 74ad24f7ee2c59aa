//! Channel protocol between the tick loop and the scenario script.
//!
//! Both directions are single-slot rendezvous channels. The engine never
//! blocks: it posts events with `try_send` and polls for replies each
//! tick. The script side may block freely, it runs on its own thread. The
//! engine sends at most one event before seeing a reply, so a full slot on
//! send means the other side broke protocol.

use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TryRecvError};

use serde::{Deserialize, Serialize};

use crate::ActionExec;

/// Hook notification posted to the script.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EngineEvent {
    /// A hook point was reached (init, round start, round end). The script
    /// must answer before the turn machine moves on.
    Sync,
    /// An action just completed; the script may respond with one of its
    /// own.
    Action(ActionExec),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ScriptReply {
    Ack,
    /// Inject an action, e.g. a scripted haunt response.
    Exec(ActionExec),
}

/// Engine-side endpoints.
pub struct ScriptComm {
    events: SyncSender<EngineEvent>,
    replies: Receiver<ScriptReply>,
}

/// Script-side endpoints, handed to the scenario script thread.
pub struct ScriptHandle {
    pub events: Receiver<EngineEvent>,
    pub replies: SyncSender<ScriptReply>,
}

pub fn channels() -> (ScriptComm, ScriptHandle) {
    let (event_tx, event_rx) = sync_channel(1);
    let (reply_tx, reply_rx) = sync_channel(1);
    (
        ScriptComm {
            events: event_tx,
            replies: reply_rx,
        },
        ScriptHandle {
            events: event_rx,
            replies: reply_tx,
        },
    )
}

impl ScriptComm {
    /// Post an event without blocking the tick loop. A full slot is a
    /// protocol violation on the script side and the event is dropped.
    pub fn send(&self, event: EngineEvent) {
        use std::sync::mpsc::TrySendError::*;
        match self.events.try_send(event) {
            Ok(()) => {}
            Err(Full(event)) => {
                log::error!("script event slot full, dropping {event:?}")
            }
            Err(Disconnected(_)) => log::warn!("script thread is gone"),
        }
    }

    /// Poll for a reply. A hung-up script reads as an endless Ack so the
    /// turn machine can wind down instead of stalling.
    pub fn try_recv(&self) -> Option<ScriptReply> {
        match self.replies.try_recv() {
            Ok(reply) => Some(reply),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(ScriptReply::Ack),
        }
    }
}

/// Script that acknowledges every hook and never injects actions. Run it
/// on its own thread for games without a scenario script.
pub fn run_null_script(handle: ScriptHandle) {
    while let Ok(event) = handle.events.recv() {
        log::debug!("null script acking {event:?}");
        if handle.replies.send(ScriptReply::Ack).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_semantics() {
        let (comm, handle) = channels();
        assert_eq!(comm.try_recv(), None);

        comm.send(EngineEvent::Sync);
        assert_eq!(handle.events.try_recv(), Ok(EngineEvent::Sync));
        handle.replies.send(ScriptReply::Ack).unwrap();
        assert_eq!(comm.try_recv(), Some(ScriptReply::Ack));
        assert_eq!(comm.try_recv(), None);
    }

    #[test]
    fn full_slot_drops_event() {
        let (comm, handle) = channels();
        comm.send(EngineEvent::Sync);
        // Slot not drained; the second send must not block or panic.
        comm.send(EngineEvent::Sync);
        assert_eq!(handle.events.try_recv(), Ok(EngineEvent::Sync));
        assert!(handle.events.try_recv().is_err());
    }

    #[test]
    fn disconnected_script_acks_forever() {
        let (comm, handle) = channels();
        drop(handle);
        comm.send(EngineEvent::Sync);
        assert_eq!(comm.try_recv(), Some(ScriptReply::Ack));
        assert_eq!(comm.try_recv(), Some(ScriptReply::Ack));
    }

    #[test]
    fn null_script_acks_events() {
        let (comm, handle) = channels();
        let thread = std::thread::spawn(move || run_null_script(handle));

        comm.send(EngineEvent::Sync);
        let reply = loop {
            if let Some(r) = comm.try_recv() {
                break r;
            }
            std::thread::yield_now();
        };
        assert_eq!(reply, ScriptReply::Ack);

        drop(comm);
        thread.join().unwrap();
    }
}
