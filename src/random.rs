use uuid::Uuid;

/// Source of randomness for path selection and reply choice.
pub trait RandomSource: Send + Sync {
    /// Uniform value in `[0, 1)`.
    fn next_f64(&self) -> f64;

    /// Index in `0..len`; `len` must be non-zero.
    fn pick(&self, len: usize) -> usize {
        ((self.next_f64() * len as f64) as usize).min(len.saturating_sub(1))
    }
}

// OS entropy through v4 uuids; the low 53 bits of a v4 uuid are random
pub struct OsRandomSource;

impl RandomSource for OsRandomSource {
    fn next_f64(&self) -> f64 {
        let bits = (Uuid::new_v4().as_u128() as u64) & ((1u64 << 53) - 1);
        bits as f64 / (1u64 << 53) as f64
    }
}

// Deterministic source for tests
#[cfg(test)]
pub struct FixedRandomSource {
    pub roll: f64,
    pub index: usize,
}

#[cfg(test)]
impl RandomSource for FixedRandomSource {
    fn next_f64(&self) -> f64 {
        self.roll
    }

    fn pick(&self, len: usize) -> usize {
        self.index.min(len.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_source_stays_in_unit_interval() {
        let source = OsRandomSource;
        for _ in 0..1000 {
            let v = source.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn default_pick_stays_in_bounds() {
        let source = OsRandomSource;
        for _ in 0..1000 {
            assert!(source.pick(3) < 3);
        }
    }
}
