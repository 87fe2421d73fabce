//! The demodulator driver: wires the DSP stages together and runs them on
//! a dedicated worker thread.

use crate::agc::Agc;
use crate::config::{DemodConfig, CHUNKSIZE, SYM_CHUNKSIZE};
use crate::costas::Costas;
use crate::errors::{ConfigError, SinkError};
use crate::gardner::Gardner;
use crate::interpolator::Interpolator;
use crate::sink::OutputSink;
use crate::source::SampleSource;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

/// Cheap, lock-free snapshot of the driver's state, safe to read from any
/// thread at any time.
#[derive(Clone, Debug, Default)]
pub struct DemodStatus {
    pub running: bool,
    pub pll_locked: bool,
    pub bytes_out: u64,
    pub done: u64,
    pub size: u64,
    pub freq_hz: f64,
    pub gain: f32,
    pub error: Option<String>,
}

struct Shared {
    running: AtomicBool,
    locked: AtomicBool,
    bytes_out: AtomicU64,
    done: AtomicU64,
    size: AtomicU64,
    freq_bits: AtomicU32,
    gain_bits: AtomicU32,
    error: Mutex<Option<String>>,
}

impl Shared {
    fn new(size: u64) -> Self {
        Self {
            running: AtomicBool::new(false),
            locked: AtomicBool::new(false),
            bytes_out: AtomicU64::new(0),
            done: AtomicU64::new(0),
            size: AtomicU64::new(size),
            freq_bits: AtomicU32::new(0.0_f32.to_bits()),
            gain_bits: AtomicU32::new(1.0_f32.to_bits()),
            error: Mutex::new(None),
        }
    }

    fn snapshot(&self) -> DemodStatus {
        DemodStatus {
            running: self.running.load(Ordering::Acquire),
            pll_locked: self.locked.load(Ordering::Relaxed),
            bytes_out: self.bytes_out.load(Ordering::Relaxed),
            done: self.done.load(Ordering::Relaxed),
            size: self.size.load(Ordering::Relaxed),
            freq_hz: f32::from_bits(self.freq_bits.load(Ordering::Relaxed)) as f64,
            gain: f32::from_bits(self.gain_bits.load(Ordering::Relaxed)),
            error: self.error.lock().unwrap().clone(),
        }
    }
}

/// Owns every DSP stage except the caller-supplied backend source, which it
/// borrows for its lifetime via the `Interpolator`.
pub struct Demod<S: SampleSource + Send + 'static> {
    interp: Option<Interpolator<S>>,
    config: DemodConfig,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl<S: SampleSource + Send + 'static> Demod<S> {
    /// Construct the pipeline, wire the interpolator onto `source`, and
    /// discard the RRC warm-up transient. Validates `config` synchronously;
    /// no worker is spawned on error.
    pub fn init(source: S, config: DemodConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut interp = Interpolator::new(source, config.l, config.rrc_order, config.alpha);
        let warmup = config.rrc_order * config.l;
        let _ = interp.read(warmup);

        let size = interp.size();
        Ok(Self {
            interp: Some(interp),
            config,
            shared: Arc::new(Shared::new(size)),
            worker: None,
        })
    }

    pub fn status(&self) -> DemodStatus {
        self.shared.snapshot()
    }

    /// Spawn the worker thread, which runs until end-of-stream or `stop()`.
    pub fn start<O: OutputSink + 'static>(&mut self, mut sink: O) {
        let mut interp = self.interp.take().expect("start called twice");
        let shared = Arc::clone(&self.shared);
        let config = self.config.clone();

        shared.running.store(true, Ordering::Release);

        let handle = std::thread::spawn(move || {
            let period = interp.samplerate() as f64 / config.sym_rate;
            let mut agc = Agc::new(config.agc_target);
            let mut costas = Costas::new(config.pll_bw_hz, config.sym_rate, std::f64::consts::FRAC_1_SQRT_2);
            let mut gardner = Gardner::new(period);
            let mut out_buf: Vec<u8> = Vec::with_capacity(SYM_CHUNKSIZE);

            'outer: loop {
                if !shared.running.load(Ordering::Acquire) {
                    break;
                }

                let produced = match interp.read(CHUNKSIZE) {
                    Ok(n) => n,
                    Err(e) => {
                        *shared.error.lock().unwrap() = Some(e.to_string());
                        break;
                    }
                };
                if produced == 0 {
                    break;
                }

                shared.done.store(interp.done(), Ordering::Relaxed);

                for i in 0..produced {
                    let x = interp.data()[i];
                    let x = agc.apply(x);
                    shared.gain_bits.store(agc.gain().to_bits(), Ordering::Relaxed);

                    if let Some(sym) = gardner.step(x, &mut costas) {
                        out_buf.push(sym.i as u8);
                        out_buf.push(sym.q as u8);
                        shared.locked.store(costas.locked(), Ordering::Relaxed);
                        shared
                            .freq_bits
                            .store((costas.freq_hz() as f32).to_bits(), Ordering::Relaxed);

                        if out_buf.len() >= SYM_CHUNKSIZE {
                            if let Err(e) = flush(&mut sink, &mut out_buf, &shared) {
                                *shared.error.lock().unwrap() = Some(e.to_string());
                                break 'outer;
                            }
                        }
                    }
                }
            }

            let _ = flush(&mut sink, &mut out_buf, &shared);
            let _ = sink.flush();
            interp.close();
            shared.running.store(false, Ordering::Release);
        });

        self.worker = Some(handle);
    }

    /// Request the worker stop at its next block boundary.
    pub fn stop(&self) {
        self.shared.running.store(false, Ordering::Release);
    }

    /// Block until the worker exits, whether that is from end-of-stream or
    /// from an earlier call to `stop`. Guarantees every stage buffer has
    /// been released and the sink has been flushed and closed.
    pub fn join(&mut self) {
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

fn flush<O: OutputSink>(sink: &mut O, buf: &mut Vec<u8>, shared: &Shared) -> Result<(), SinkError> {
    if buf.is_empty() {
        return Ok(());
    }
    sink.write(buf)?;
    shared.bytes_out.fetch_add(buf.len() as u64, Ordering::Relaxed);
    buf.clear();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::VecSink;
    use crate::source::VecSource;
    use num_complex::Complex32;

    #[test]
    fn init_rejects_invalid_config() {
        let source = VecSource::new(48_000, vec![Complex32::new(0.0, 0.0); 10]);
        let config = DemodConfig {
            l: 0,
            ..DemodConfig::default()
        };
        assert!(Demod::init(source, config).is_err());
    }

    #[test]
    fn silent_input_yields_zero_bytes_and_no_lock() {
        let num_samples = 10_000u64;
        let l = 2u64;
        let order = 32u64;
        let fs = 48_000u64;
        let sym_rate = 4800.0;

        let samples = vec![Complex32::new(0.0, 0.0); num_samples as usize];
        let source = VecSource::new(fs as u32, samples);
        let config = DemodConfig {
            l: l as usize,
            rrc_order: order as usize,
            alpha: 0.5,
            pll_bw_hz: 50.0,
            sym_rate,
            agc_target: 1.0,
        };
        let mut demod = Demod::init(source, config).expect("valid config");
        let sink = VecSink::default();
        demod.start(sink);
        demod.join();

        let interp_samples = num_samples * l;
        let period = (l * fs) as f64 / sym_rate;
        let expected_symbols = ((interp_samples - order * l) as f64 / period).floor() as u64;

        let status = demod.status();
        assert!(!status.pll_locked);
        assert_eq!(status.bytes_out, 2 * expected_symbols);
    }

    #[test]
    fn stop_flag_halts_worker() {
        let samples = vec![Complex32::new(0.0, 0.0); 2_000_000];
        let source = VecSource::new(48_000, samples);
        let config = DemodConfig::default();
        let mut demod = Demod::init(source, config).expect("valid config");
        demod.start(VecSink::default());
        std::thread::sleep(std::time::Duration::from_millis(5));
        demod.stop();
        demod.join();
        assert!(!demod.status().running);
    }
}
