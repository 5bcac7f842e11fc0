#![cfg(not(target_arch = "wasm32"))]

use std::collections::{HashMap, HashSet};
use std::num::NonZeroU8;

use album_viz_wasm::palette::PALETTE_SIZE;
use album_viz_wasm::{extract_palette, Palette, PixelBuffer};
use proptest::prelude::*;

fn image() -> impl Strategy<Value = (u32, u32, Vec<u8>)> {
    (1u32..16, 1u32..16).prop_flat_map(|(w, h)| {
        let len = (w * h * 4) as usize;
        (Just(w), Just(h), prop::collection::vec(any::<u8>(), len))
    })
}

fn bucket_counts(data: &[u8], bucket: u8) -> HashMap<[u8; 3], usize> {
    let mut counts = HashMap::new();
    for px in data.chunks_exact(4) {
        let key = [
            px[0] / bucket * bucket,
            px[1] / bucket * bucket,
            px[2] / bucket * bucket,
        ];
        *counts.entry(key).or_default() += 1;
    }
    counts
}

proptest! {
    #[test]
    fn palette_is_bounded_and_normalized((w, h, data) in image(), bucket in 1u8..=255) {
        let pixels = PixelBuffer::new(w, h, &data).unwrap();
        let colors = extract_palette(&pixels, NonZeroU8::new(bucket).unwrap());

        prop_assert!(!colors.is_empty());
        prop_assert!(colors.len() <= PALETTE_SIZE);
        for color in &colors {
            for channel in color {
                prop_assert!((0.0..=1.0).contains(channel));
            }
        }
    }

    #[test]
    fn colors_come_out_busiest_first((w, h, data) in image(), bucket in 1u8..=64) {
        let pixels = PixelBuffer::new(w, h, &data).unwrap();
        let colors = extract_palette(&pixels, NonZeroU8::new(bucket).unwrap());
        let counts = bucket_counts(&data, bucket);

        let ranked: Vec<usize> = colors
            .iter()
            .map(|c| {
                let key = c.map(|v| (v * 255.0).round() as u8);
                counts[&key]
            })
            .collect();
        prop_assert!(ranked.windows(2).all(|pair| pair[0] >= pair[1]));
        prop_assert_eq!(colors.len(), counts.len().min(PALETTE_SIZE));

        // nothing left out is busier than the least busy colour kept
        let kept: HashSet<[u8; 3]> = colors
            .iter()
            .map(|c| c.map(|v| (v * 255.0).round() as u8))
            .collect();
        let floor = ranked.last().copied().unwrap_or(0);
        for (key, count) in &counts {
            if !kept.contains(key) {
                prop_assert!(*count <= floor, "{:?} x{} dropped below {}", key, count, floor);
            }
        }
    }

    #[test]
    fn busiest_buckets_survive_truncation(histogram in prop::collection::vec(1usize..20, 9..14)) {
        let mut data = Vec::new();
        for (i, &count) in histogram.iter().enumerate() {
            for _ in 0..count {
                data.extend_from_slice(&[i as u8 * 16, 0, 0, 255]);
            }
        }
        let pixels = PixelBuffer::new((data.len() / 4) as u32, 1, &data).unwrap();
        let colors = extract_palette(&pixels, NonZeroU8::new(1).unwrap());
        prop_assert_eq!(colors.len(), PALETTE_SIZE);

        let kept: Vec<usize> = colors
            .iter()
            .map(|c| histogram[((c[0] * 255.0).round() as usize) / 16])
            .collect();
        let mut sorted = histogram.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        prop_assert_eq!(kept, sorted[..PALETTE_SIZE].to_vec());
    }

    #[test]
    fn alpha_never_changes_the_palette((w, h, data) in image(), alpha in any::<u8>()) {
        let mut opaque = data.clone();
        for px in opaque.chunks_exact_mut(4) {
            px[3] = alpha;
        }
        let bucket = NonZeroU8::new(24).unwrap();
        let a = Palette::from_pixels(&PixelBuffer::new(w, h, &data).unwrap(), bucket);
        let b = Palette::from_pixels(&PixelBuffer::new(w, h, &opaque).unwrap(), bucket);
        prop_assert_eq!(a, b);
    }
}

#[test]
fn short_buffer_is_rejected() {
    assert!(PixelBuffer::new(2, 2, &[0; 15]).is_err());
}
