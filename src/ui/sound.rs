/// Sound engine: procedural sound cues via rodio.
///
/// Cues are synthesized once at init into in-memory WAV buffers and played
/// fire-and-forget through a detached Sink, so the loop never waits on audio.
///
/// Cues:
///   jump     short rising chirp
///   pickup   bright two-note chime (cloak restored)
///   spotted  harsh alarm buzz
///   win      ascending fanfare
///   lose     slow descending tones
///
/// Build without the "sound" feature and the stub SoundEngine does nothing.

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::TAU;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_jump: Arc<Vec<u8>>,
        sfx_pickup: Arc<Vec<u8>>,
        sfx_spotted: Arc<Vec<u8>>,
        sfx_win: Arc<Vec<u8>>,
        sfx_lose: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("No audio output, sound disabled: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_jump: Arc::new(make_wav(&gen_jump())),
                sfx_pickup: Arc::new(make_wav(&gen_pickup())),
                sfx_spotted: Arc::new(make_wav(&gen_spotted())),
                sfx_win: Arc::new(make_wav(&gen_win())),
                sfx_lose: Arc::new(make_wav(&gen_lose())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            let sink = match Sink::try_new(&self.handle) {
                Ok(s) => s,
                Err(e) => {
                    log::debug!("Sink unavailable: {e}");
                    return;
                }
            };
            if let Ok(src) = rodio::Decoder::new(Cursor::new(buf.as_ref().clone())) {
                sink.append(src);
                sink.detach();
            }
        }

        pub fn play_jump(&self) { self.play(&self.sfx_jump); }
        pub fn play_pickup(&self) { self.play(&self.sfx_pickup); }
        pub fn play_spotted(&self) { self.play(&self.sfx_spotted); }
        pub fn play_win(&self) { self.play(&self.sfx_win); }
        pub fn play_lose(&self) { self.play(&self.sfx_lose); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn frames(duration: f32) -> usize {
        (SAMPLE_RATE as f32 * duration) as usize
    }

    /// Sequence of sine notes with a soft per-note decay and an optional
    /// octave overtone.
    fn gen_notes(notes: &[(f32, f32)], overtone: f32, volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(freq, dur) in notes {
            let n = frames(dur);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.4;
                let wave = (t * freq * TAU).sin() * (1.0 - overtone)
                    + (t * freq * 2.0 * TAU).sin() * overtone;
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Jump: quick upward sweep 300Hz → 700Hz
    fn gen_jump() -> Vec<f32> {
        let n = frames(0.09);
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 300.0 + t * 400.0;
                phase += freq / SAMPLE_RATE as f32;
                let env = (1.0 - t).powf(0.7);
                (phase * TAU).sin() * env * 0.2
            })
            .collect()
    }

    /// Pickup: E6 then A6, square-ish
    fn gen_pickup() -> Vec<f32> {
        gen_notes(&[(1319.0, 0.06), (1760.0, 0.12)], 0.3, 0.25)
    }

    /// Spotted: two pulses of a detuned square buzz
    fn gen_spotted() -> Vec<f32> {
        let pulse = frames(0.11);
        let gap = frames(0.04);
        let mut samples = Vec::with_capacity(2 * (pulse + gap));
        for _ in 0..2 {
            for i in 0..pulse {
                let t = i as f32 / SAMPLE_RATE as f32;
                let a = if (t * 220.0).fract() < 0.5 { 1.0 } else { -1.0 };
                let b = if (t * 233.0).fract() < 0.5 { 1.0 } else { -1.0 };
                let env = 1.0 - (i as f32 / pulse as f32) * 0.5;
                samples.push((a + b) * 0.5 * env * 0.2);
            }
            samples.extend(std::iter::repeat(0.0).take(gap));
        }
        samples
    }

    /// Win: C5→E5→G5→C6, last note held
    fn gen_win() -> Vec<f32> {
        gen_notes(&[(523.0, 0.1), (659.0, 0.1), (784.0, 0.1), (1047.0, 0.35)], 0.3, 0.3)
    }

    /// Lose: A4→F4→D4 descending, fading out
    fn gen_lose() -> Vec<f32> {
        let mut samples = gen_notes(&[(440.0, 0.18), (349.0, 0.18), (294.0, 0.3)], 0.0, 0.3);
        let fade_len = samples.len() / 3;
        let total = samples.len();
        for (k, s) in samples[total - fade_len..].iter_mut().enumerate() {
            *s *= 1.0 - k as f32 / fade_len as f32;
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a 16-bit mono PCM WAV
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_jump(&self) {}
    pub fn play_pickup(&self) {}
    pub fn play_spotted(&self) {}
    pub fn play_win(&self) {}
    pub fn play_lose(&self) {}
}
