//! Sound output for notifications.
//!
//! With the `audio` feature (on by default) the sound file is decoded and
//! played through rodio and the fallback tone is synthesized. The terminal
//! bell rings only when the tone cannot be played, or in builds without
//! audio support.

use std::io::Write;
use std::path::Path;

use clockwork_core::{PlaybackError, Player, Tone};
#[cfg(any(feature = "audio", test))]
use tracing::warn;

/// Pick the best player this build supports.
pub fn default_player() -> Box<dyn Player> {
    #[cfg(feature = "audio")]
    {
        Box::new(BellFallback(rodio_player::RodioPlayer::new()))
    }
    #[cfg(not(feature = "audio"))]
    {
        Box::new(BellPlayer)
    }
}

fn ring_bell() -> Result<(), PlaybackError> {
    let mut err = std::io::stderr();
    err.write_all(b"\x07")
        .and_then(|_| err.flush())
        .map_err(|e| PlaybackError::NoDevice(e.to_string()))
}

/// Rings the terminal bell when the wrapped player cannot produce the tone.
#[cfg(any(feature = "audio", test))]
pub struct BellFallback<P>(pub P);

#[cfg(any(feature = "audio", test))]
impl<P: Player> Player for BellFallback<P> {
    fn play_file(&self, path: &Path) -> Result<(), PlaybackError> {
        self.0.play_file(path)
    }

    fn play_tone(&self, tone: &Tone) -> Result<(), PlaybackError> {
        self.0.play_tone(tone).or_else(|e| {
            warn!(error = %e, "tone unavailable, ringing the terminal bell");
            ring_bell()
        })
    }
}

/// Terminal bell on stderr.
#[cfg(any(not(feature = "audio"), test))]
pub struct BellPlayer;

#[cfg(any(not(feature = "audio"), test))]
impl Player for BellPlayer {
    fn play_file(&self, path: &Path) -> Result<(), PlaybackError> {
        Err(PlaybackError::NoDevice(format!(
            "built without audio support, cannot play {}",
            path.display()
        )))
    }

    fn play_tone(&self, _tone: &Tone) -> Result<(), PlaybackError> {
        ring_bell()
    }
}

#[cfg(feature = "audio")]
mod rodio_player {
    use std::cell::RefCell;
    use std::fs::File;
    use std::io::BufReader;
    use std::path::{Path, PathBuf};
    use std::sync::mpsc;
    use std::thread::{self, JoinHandle};

    use clockwork_core::{PlaybackError, Player, Tone};
    use rodio::source::SineWave;
    use rodio::{Decoder, OutputStream, Sink, Source};
    use tracing::{debug, warn};

    type BoxedSource = Box<dyn Source<Item = f32> + Send>;

    /// Plays each sound on its own thread; the output stream is not `Send`
    /// so it is opened and dropped there.
    #[derive(Default)]
    pub struct RodioPlayer {
        playing: RefCell<Vec<JoinHandle<()>>>,
    }

    impl RodioPlayer {
        pub fn new() -> Self {
            Self::default()
        }

        /// Start playback and wait only until the device and source are
        /// ready, so open and decode failures reach the caller.
        fn spawn<F>(&self, make_source: F) -> Result<(), PlaybackError>
        where
            F: FnOnce() -> Result<BoxedSource, PlaybackError> + Send + 'static,
        {
            let (ready_tx, ready_rx) = mpsc::channel();
            let handle = thread::Builder::new()
                .name("clockwork-audio".into())
                .spawn(move || match open_sink(make_source) {
                    Ok((_stream, sink)) => {
                        let _ = ready_tx.send(Ok(()));
                        sink.sleep_until_end();
                        debug!("playback finished");
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                    }
                })
                .map_err(|e| PlaybackError::NoDevice(e.to_string()))?;

            let ready = ready_rx
                .recv()
                .unwrap_or_else(|_| Err(PlaybackError::NoDevice("audio thread exited".into())));

            let mut playing = self.playing.borrow_mut();
            playing.retain(|h| !h.is_finished());
            playing.push(handle);
            ready
        }
    }

    fn open_sink<F>(make_source: F) -> Result<(OutputStream, Sink), PlaybackError>
    where
        F: FnOnce() -> Result<BoxedSource, PlaybackError>,
    {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| PlaybackError::NoDevice(e.to_string()))?;
        let sink = Sink::try_new(&handle).map_err(|e| PlaybackError::NoDevice(e.to_string()))?;
        sink.append(make_source()?);
        Ok((stream, sink))
    }

    fn decode(path: PathBuf) -> Result<BoxedSource, PlaybackError> {
        let asset = |message: String| PlaybackError::Asset {
            path: path.clone(),
            message,
        };
        let file = File::open(&path).map_err(|e| asset(e.to_string()))?;
        let decoder = Decoder::new(BufReader::new(file)).map_err(|e| asset(e.to_string()))?;
        Ok(Box::new(decoder.convert_samples::<f32>()))
    }

    impl Player for RodioPlayer {
        fn play_file(&self, path: &Path) -> Result<(), PlaybackError> {
            let path = path.to_path_buf();
            self.spawn(move || decode(path))
        }

        fn play_tone(&self, tone: &Tone) -> Result<(), PlaybackError> {
            let tone = *tone;
            self.spawn(move || {
                let wave = SineWave::new(tone.frequency_hz)
                    .take_duration(tone.duration)
                    .amplify(tone.gain);
                Ok(Box::new(wave) as BoxedSource)
            })
        }
    }

    impl Drop for RodioPlayer {
        // Let in-flight sounds finish before the process exits.
        fn drop(&mut self) {
            for handle in self.playing.get_mut().drain(..) {
                if handle.join().is_err() {
                    warn!("audio thread panicked");
                }
            }
        }
    }
}
