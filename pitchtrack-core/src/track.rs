//! # Chain Walking and Path Assembly
//!
//! Turns the analyzer's linked tone structure into renderable pitch
//! paths. A chain is walked exactly once, starting from a tone's first
//! appearance, and becomes one path if it survives the minimum-length
//! filter.

use crate::moments::{Moments, ToneId};
use crate::scale::{MusicalScale, level_to_db};
use crate::{PitchFragment, PitchPath};

/// Follows continuation links forward from `start` until the chain
/// ends. The result is never empty; `start` itself is always included.
///
/// Callers only pass tones without a `prev` link, which guarantees each
/// physical tone is walked exactly once.
pub fn chain_from(moments: &Moments, start: ToneId) -> Vec<ToneId> {
    let mut chain = vec![start];
    let mut id = start;
    while let Some(next) = moments.tone(id).next {
        chain.push(next);
        id = next;
    }
    chain
}

/// Builds one pitch path from a walked chain, pairing each tone with
/// its moment's timestamp and converting frequency and level into note
/// number and decibels. Returns `None` when the chain is shorter than
/// `min_path_len`.
pub fn assemble_path(
    moments: &Moments,
    chain: &[ToneId],
    scale: &MusicalScale,
    min_path_len: usize,
) -> Option<PitchPath> {
    if chain.len() < min_path_len {
        return None;
    }
    let path = chain
        .iter()
        .map(|&id| {
            let tone = moments.tone(id);
            PitchFragment {
                time: moments.moment(id.moment).time,
                note: scale.note_from_freq(tone.freq),
                level_db: level_to_db(tone.level),
            }
        })
        .collect();
    Some(path)
}
