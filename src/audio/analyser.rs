use std::sync::Arc;

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use serde::Deserialize;
use spectrum_analyzer::windows::hann_window;

use super::tap::SampleTap;

/// Analyser tuning, mirroring a browser analyser node.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyserSettings {
    pub fft_size: usize,
    /// Time constant in `[0, 1)`; higher is smoother.
    pub smoothing: f32,
    pub min_decibels: f32,
    pub max_decibels: f32,
}

impl Default for AnalyserSettings {
    fn default() -> Self {
        Self {
            fft_size: 4096,
            smoothing: 0.85,
            min_decibels: -90.0,
            max_decibels: 0.0,
        }
    }
}

/// Produces the byte magnitude frame the renderer consumes.
pub struct FrequencyAnalyser {
    settings: AnalyserSettings,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    frame: Vec<u8>,
}

impl FrequencyAnalyser {
    pub fn new(settings: AnalyserSettings) -> Self {
        let fft_size = settings.fft_size.max(2);
        let settings = AnalyserSettings {
            fft_size,
            smoothing: settings.smoothing.clamp(0.0, 0.999),
            ..settings
        };
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(fft_size);
        let bins = fft_size / 2;

        Self {
            settings,
            fft,
            window: vec![0.0; fft_size],
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; bins],
            frame: vec![0; bins],
        }
    }

    pub fn settings(&self) -> AnalyserSettings {
        self.settings
    }

    pub fn bin_count(&self) -> usize {
        self.frame.len()
    }

    /// Latest magnitude frame, one byte per bin.
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    /// Recomputes the frame in place from the newest tapped samples.
    pub fn refresh(&mut self, tap: &SampleTap) {
        tap.copy_latest(&mut self.window);
        let windowed = hann_window(&self.window);

        for (slot, &s) in self.buffer.iter_mut().zip(windowed.iter()) {
            *slot = Complex::new(s, 0.0);
        }
        self.fft.process(&mut self.buffer);

        let n = self.settings.fft_size as f32;
        let tau = self.settings.smoothing;
        let range = self.settings.max_decibels - self.settings.min_decibels;
        let scale = if range > 0.0 { 255.0 / range } else { 0.0 };

        for k in 0..self.frame.len() {
            let magnitude = self.buffer[k].norm() / n;
            self.smoothed[k] = tau * self.smoothed[k] + (1.0 - tau) * magnitude;

            let db = 20.0 * self.smoothed[k].log10();
            let byte = (scale * (db - self.settings.min_decibels)).floor();
            self.frame[k] = if byte.is_nan() {
                0
            } else {
                byte.clamp(0.0, 255.0) as u8
            };
        }
    }

    /// Drops smoothing history, e.g. when a new clip is loaded.
    pub fn reset(&mut self) {
        self.smoothed.fill(0.0);
        self.frame.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn silence_yields_a_flat_frame() {
        let mut analyser = FrequencyAnalyser::new(AnalyserSettings::default());
        let tap = SampleTap::new(4096);
        analyser.refresh(&tap);
        assert_eq!(analyser.bin_count(), 2048);
        assert!(analyser.frame().iter().all(|&b| b == 0));
    }

    #[test]
    fn tone_peaks_at_its_bin() {
        let settings = AnalyserSettings {
            fft_size: 1024,
            smoothing: 0.0,
            ..AnalyserSettings::default()
        };
        let mut analyser = FrequencyAnalyser::new(settings);
        let tap = SampleTap::new(1024);
        // Bin 64 of a 1024-point FFT at 44100 Hz.
        let freq = 64.0 * 44100.0 / 1024.0;
        tap.push_slice(&sine(freq, 44100.0, 1024));
        analyser.refresh(&tap);

        let frame = analyser.frame();
        let (peak, _) = frame
            .iter()
            .enumerate()
            .max_by_key(|&(_, v)| *v)
            .unwrap();
        assert_eq!(peak, 64);
        assert!(frame[64] > 150);
        assert_eq!(frame[400], 0);
    }

    #[test]
    fn smoothing_decays_after_input_stops() {
        let settings = AnalyserSettings {
            fft_size: 512,
            ..AnalyserSettings::default()
        };
        let mut analyser = FrequencyAnalyser::new(settings);
        let tap = SampleTap::new(512);
        tap.push_slice(&sine(44100.0 * 32.0 / 512.0, 44100.0, 512));
        analyser.refresh(&tap);
        let loud = analyser.frame()[32];

        tap.clear();
        analyser.refresh(&tap);
        let quieter = analyser.frame()[32];
        assert!(quieter < loud);
        assert!(quieter > 0, "smoothing keeps some energy for one tick");
    }
}
