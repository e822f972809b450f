//! Audible alert collaborator.
//!
//! Classification stays pure; the monitoring loop hands alert edges to an
//! [`AlertSink`]. The default sink beeps through the system audio output
//! on a dedicated thread, since the audio objects are not `Send`.

use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use log::warn;
use rodio::source::{SineWave, Source};
use rodio::{OutputStream, Sink};

use crate::posture::PostureState;

pub trait AlertSink: Send + Sync {
    fn alert(&self, state: PostureState);
}

/// No-op sink for tests and headless runs.
#[derive(Default)]
pub struct NullAlert;

impl AlertSink for NullAlert {
    fn alert(&self, _state: PostureState) {}
}

struct Beep {
    freq: f32,
    duration: Duration,
}

fn tone_for(state: PostureState) -> Option<Beep> {
    match state {
        PostureState::Good => None,
        PostureState::Warning => Some(Beep {
            freq: 800.0,
            duration: Duration::from_millis(300),
        }),
        PostureState::Bad => Some(Beep {
            freq: 500.0,
            duration: Duration::from_millis(500),
        }),
    }
}

/// Sine-tone beeper. Lazily spawns its audio thread on first alert; if no
/// output device exists the alert is logged and dropped.
pub struct BeepAlert {
    tx: Arc<Mutex<Option<mpsc::Sender<Beep>>>>,
}

impl BeepAlert {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
        }
    }

    fn ensure_thread(&self) -> Option<mpsc::Sender<Beep>> {
        let mut guard = self.tx.lock().unwrap();
        if let Some(tx) = guard.as_ref() {
            return Some(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<Beep>();
        let spawned = thread::Builder::new()
            .name("posture-alert".to_string())
            .spawn(move || {
                let (_stream, handle) = match OutputStream::try_default() {
                    Ok(pair) => pair,
                    Err(err) => {
                        warn!("no audio output for alerts: {err}");
                        return;
                    }
                };

                while let Ok(beep) = rx.recv() {
                    match Sink::try_new(&handle) {
                        Ok(sink) => {
                            sink.append(
                                SineWave::new(beep.freq)
                                    .take_duration(beep.duration)
                                    .amplify(0.25),
                            );
                            sink.sleep_until_end();
                        }
                        Err(err) => warn!("failed to open alert sink: {err}"),
                    }
                }
            });

        match spawned {
            Ok(_) => {
                let tx_clone = tx.clone();
                *guard = Some(tx);
                Some(tx_clone)
            }
            Err(err) => {
                warn!("failed to spawn alert thread: {err}");
                None
            }
        }
    }
}

impl Default for BeepAlert {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertSink for BeepAlert {
    fn alert(&self, state: PostureState) {
        let Some(beep) = tone_for(state) else {
            return;
        };
        if let Some(tx) = self.ensure_thread() {
            let _ = tx.send(beep);
        }
    }
}
