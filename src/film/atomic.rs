// Copyright @yucwang 2026

use std::sync::atomic::{AtomicU32, Ordering};

/// f32 with lock-free accumulation, stored as raw bits.
pub struct AtomicFloat {
    bits: AtomicU32,
}

impl Default for AtomicFloat {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl AtomicFloat {
    pub fn new(v: f32) -> Self {
        Self { bits: AtomicU32::new(bytemuck::cast(v)) }
    }

    pub fn load(&self, ordering: Ordering) -> f32 {
        bytemuck::cast(self.bits.load(ordering))
    }

    pub fn store(&self, v: f32, ordering: Ordering) {
        self.bits.store(bytemuck::cast(v), ordering)
    }

    pub fn fetch_add(&self, v: f32, ordering: Ordering) -> f32 {
        let mut old_bits = self.bits.load(Ordering::Relaxed);
        loop {
            let new_bits: u32 = bytemuck::cast(bytemuck::cast::<u32, f32>(old_bits) + v);
            match self.bits.compare_exchange_weak(old_bits, new_bits, ordering, Ordering::Relaxed) {
                Ok(_) => return bytemuck::cast(old_bits),
                Err(current) => old_bits = current,
            }
        }
    }
}
