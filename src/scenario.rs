//! Replay scenarios
//!
//! A JSON list of timed switch notifications, used to drive the controller
//! offline against a recording channel.

use crate::controller::Controller;
use crate::ofp::{
    ConnectionDown, ConnectionUp, DatapathId, DeviceChannel, Frame, PacketIn, PortNo, PortStats,
    PortStatsReply,
};
use crate::sched::{ControlLoop, Event, LoopTime};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    pub events: Vec<TimedEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedEvent {
    #[serde(default)]
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: ScenarioEvent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioEvent {
    ConnectionUp {
        dpid: DatapathId,
        ports: Vec<String>,
    },
    ConnectionDown {
        dpid: DatapathId,
    },
    PacketIn {
        dpid: DatapathId,
        in_port: PortNo,
        frame: Frame,
        #[serde(default)]
        payload: Vec<u8>,
    },
    PortStats {
        dpid: DatapathId,
        stats: Vec<PortStats>,
    },
    Shutdown,
}

/// Stops the poll timer when dispatched.
#[derive(Debug, Clone, Copy)]
pub struct Shutdown;

impl<C: DeviceChannel + 'static> Event<Controller<C>> for Shutdown {
    fn execute(self: Box<Self>, _lp: &mut ControlLoop<Controller<C>>, ctl: &mut Controller<C>) {
        ctl.shutdown();
    }
}

impl Scenario {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Time of the last event.
    pub fn end(&self) -> LoopTime {
        let ms = self.events.iter().map(|e| e.at_ms).max().unwrap_or(0);
        LoopTime::from_millis(ms)
    }

    /// Post every event onto `lp` at its timestamp, in file order.
    pub fn schedule_into<C: DeviceChannel + 'static>(self, lp: &mut ControlLoop<Controller<C>>) {
        for TimedEvent { at_ms, event } in self.events {
            let at = LoopTime::from_millis(at_ms);
            match event {
                ScenarioEvent::ConnectionUp { dpid, ports } => {
                    lp.schedule(at, ConnectionUp { dpid, ports })
                }
                ScenarioEvent::ConnectionDown { dpid } => lp.schedule(at, ConnectionDown { dpid }),
                ScenarioEvent::PacketIn {
                    dpid,
                    in_port,
                    frame,
                    payload,
                } => lp.schedule(
                    at,
                    PacketIn {
                        dpid,
                        in_port,
                        frame,
                        payload,
                    },
                ),
                ScenarioEvent::PortStats { dpid, stats } => {
                    lp.schedule(at, PortStatsReply { dpid, stats })
                }
                ScenarioEvent::Shutdown => lp.schedule(at, Shutdown),
            }
        }
    }
}
