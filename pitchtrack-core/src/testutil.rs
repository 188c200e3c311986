//! Builders for synthetic moment arenas used across the unit tests.

use crate::moments::{Moment, Moments, Tone, ToneId};

/// Builds an arena of `count` moments spaced `step` seconds apart, with
/// one linked tone chain per `(start_moment, len, freq)` entry.
pub fn scripted_moments(count: usize, step: f32, chains: &[(usize, usize, f32)]) -> Moments {
    let mut tones: Vec<Vec<Tone>> = vec![Vec::new(); count];
    let mut links: Vec<(ToneId, ToneId)> = Vec::new();

    for &(start, len, freq) in chains {
        let mut prev: Option<ToneId> = None;
        for i in 0..len {
            let moment = start + i;
            let id = ToneId {
                moment,
                tone: tones[moment].len(),
            };
            tones[moment].push(Tone::new(freq, 0.5));
            if let Some(p) = prev {
                links.push((p, id));
            }
            prev = Some(id);
        }
    }

    let mut moments = Moments::new();
    for (i, t) in tones.into_iter().enumerate() {
        moments.push(Moment {
            time: i as f32 * step,
            tones: t,
        });
    }
    for (a, b) in links {
        moments.link(a, b);
    }
    moments
}
