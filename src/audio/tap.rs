use std::sync::{Arc, Mutex, MutexGuard};

/// Bounded window of the most recently played samples.
///
/// Output streams push into it from wherever they run; the analyser copies
/// the latest window out once per render tick.
#[derive(Debug, Clone)]
pub struct SampleTap {
    samples: Arc<Mutex<Vec<f32>>>,
    capacity: usize,
}

impl SampleTap {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Arc::new(Mutex::new(Vec::with_capacity(capacity * 2))),
            capacity,
        }
    }

    pub fn push_slice(&self, data: &[f32]) {
        let mut s = self.lock();
        s.extend_from_slice(data);
        if s.len() > self.capacity {
            let keep = s.len() - self.capacity;
            s.drain(0..keep);
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Copies the newest samples into the tail of `out`, zero-filling the
    /// front when fewer samples are available.
    pub fn copy_latest(&self, out: &mut [f32]) {
        let s = self.lock();
        let n = s.len().min(out.len());
        let split = out.len() - n;
        out[..split].fill(0.0);
        out[split..].copy_from_slice(&s[s.len() - n..]);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<f32>> {
        self.samples.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keeps_only_the_newest_samples() {
        let tap = SampleTap::new(4);
        tap.push_slice(&[1.0, 2.0, 3.0]);
        tap.push_slice(&[4.0, 5.0, 6.0]);
        let mut out = [0.0; 4];
        tap.copy_latest(&mut out);
        assert_eq!(out, [3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn short_history_is_zero_padded_in_front() {
        let tap = SampleTap::new(8);
        tap.push_slice(&[0.5, 0.25]);
        let mut out = [9.0; 4];
        tap.copy_latest(&mut out);
        assert_eq!(out, [0.0, 0.0, 0.5, 0.25]);

        tap.clear();
        tap.copy_latest(&mut out);
        assert_eq!(out, [0.0; 4]);
    }
}
