// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Longitudinal slice schedule
//!
//! A single `f32` accumulator walks down the blank from z = 0, so every
//! slice ends bit-for-bit where the next begins. A final closing slice
//! always ends exactly at the blank length.

/// One longitudinal slice of the shaft
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slice {
    pub z_lo: f32,
    pub z_hi: f32,
    /// Image column sampled by this slice; negative before image zero
    pub column: isize,
    /// The bore-only slice that reaches the blank length
    pub closing: bool,
}

impl Slice {
    /// Slice before image zero
    #[inline]
    pub fn is_lead_in(&self) -> bool {
        self.column < 0
    }

    /// Whether the shaft samples the mask in this slice
    #[inline]
    pub fn samples_image(&self) -> bool {
        !self.closing && !self.is_lead_in()
    }
}

/// Ordered slices from z = 0 to the blank length
#[derive(Debug, Clone)]
pub struct SliceSchedule {
    slices: Vec<Slice>,
    lead_in: usize,
}

impl SliceSchedule {
    pub fn new(length: f32, step_size: f32, image_zero: f32) -> Self {
        let mut starts = Vec::new();
        let mut z = 0.0f32;
        while z < length - 2.0 * step_size {
            starts.push(z);
            z += step_size;
        }

        let lead_in = starts.iter().take_while(|&&start| start < image_zero).count();
        let mut slices: Vec<Slice> = starts
            .iter()
            .enumerate()
            .map(|(k, &z_lo)| Slice {
                z_lo,
                z_hi: z_lo + step_size,
                column: k as isize - lead_in as isize,
                closing: false,
            })
            .collect();

        slices.push(Slice {
            z_lo: z,
            z_hi: length,
            column: starts.len() as isize - lead_in as isize,
            closing: true,
        });

        Self { slices, lead_in }
    }

    #[inline]
    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    /// Number of slices before image zero
    #[inline]
    pub fn lead_in(&self) -> usize {
        self.lead_in
    }

    /// Number of slices that sample the image
    #[inline]
    pub fn image_slices(&self) -> usize {
        self.slices.len() - self.lead_in - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slices_are_contiguous() {
        let schedule = SliceSchedule::new(50.0, 0.04, 12.5);
        let slices = schedule.slices();

        assert_eq!(slices[0].z_lo, 0.0);
        for pair in slices.windows(2) {
            assert_eq!(pair[0].z_hi.to_bits(), pair[1].z_lo.to_bits());
        }
        assert_eq!(slices.last().unwrap().z_hi, 50.0);
    }

    #[test]
    fn test_closing_slice_height() {
        for (length, step) in [(50.0f32, 0.04f32), (50.8, 0.04), (10.0, 0.05), (1.0, 0.3)] {
            let schedule = SliceSchedule::new(length, step, 0.0);
            let closing = schedule.slices().last().unwrap();
            assert!(closing.closing);
            let height = closing.z_hi - closing.z_lo;
            assert!(height > step * 0.999 && height <= 2.0 * step * 1.001, "{} / {}", length, step);
            assert_eq!(schedule.slices().iter().filter(|s| s.closing).count(), 1);
        }
    }

    #[test]
    fn test_columns_start_at_image_zero() {
        let schedule = SliceSchedule::new(50.0, 0.04, 12.5);
        let lead_in = schedule.lead_in();
        // 12.5 / 0.04 = 312.5
        assert!((312..=313).contains(&lead_in));

        let first = schedule.slices()[lead_in];
        assert_eq!(first.column, 0);
        assert!(first.z_lo >= 12.5);
        assert!(schedule.slices()[lead_in - 1].z_lo < 12.5);
        assert!(schedule.slices()[0].is_lead_in());

        let columns: Vec<isize> = schedule
            .slices()
            .iter()
            .filter(|s| s.samples_image())
            .map(|s| s.column)
            .collect();
        assert_eq!(columns.len(), schedule.image_slices());
        assert!(columns.iter().enumerate().all(|(k, &c)| c == k as isize));
    }

    #[test]
    fn test_zero_image_zero_has_no_lead_in() {
        let schedule = SliceSchedule::new(4.0, 0.5, 0.0);
        // Starts 0.0 .. 2.5, closing slice 3.0 .. 4.0
        assert_eq!(schedule.lead_in(), 0);
        assert_eq!(schedule.slices().len(), 7);
        assert_eq!(schedule.image_slices(), 6);
        assert_eq!(schedule.slices()[6].z_lo, 3.0);
    }
}
