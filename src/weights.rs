//! # Topic Weights
//!
//! Per-topic adaptive multipliers applied to raw keyword scores.
//!
//! - Every topic starts at `1.0`.
//! - Values are clamped to `[0.5, 2.0]` on every update.
//! - The only mutators are `reinforce` (+0.07, topic a user corrected *to*)
//!   and `penalize` (-0.04, topic a user corrected *away from*).
//!
//! JSON shape (snapshot / export):
//! { "Политика": 1.0, "Экономика": 1.07, ... }

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::topic::Topic;

pub const MIN_WEIGHT: f32 = 0.5;
pub const MAX_WEIGHT: f32 = 2.0;
pub const REINFORCE_STEP: f32 = 0.07;
pub const PENALIZE_STEP: f32 = 0.04;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopicWeights {
    values: [f32; Topic::ALL.len()],
}

impl Default for TopicWeights {
    fn default() -> Self {
        Self {
            values: [1.0; Topic::ALL.len()],
        }
    }
}

impl TopicWeights {
    #[inline]
    pub fn get(&self, topic: Topic) -> f32 {
        self.values[topic.index()]
    }

    /// Raise the weight of a topic the user confirmed; capped at `MAX_WEIGHT`.
    pub fn reinforce(&mut self, topic: Topic) -> f32 {
        let w = &mut self.values[topic.index()];
        *w = (*w + REINFORCE_STEP).min(MAX_WEIGHT);
        *w
    }

    /// Lower the weight of a topic the user rejected; floored at `MIN_WEIGHT`.
    pub fn penalize(&mut self, topic: Topic) -> f32 {
        let w = &mut self.values[topic.index()];
        *w = (*w - PENALIZE_STEP).max(MIN_WEIGHT);
        *w
    }

    /// `(topic, weight)` pairs in stable topic order.
    pub fn iter(&self) -> impl Iterator<Item = (Topic, f32)> + '_ {
        Topic::ALL.into_iter().map(move |t| (t, self.get(t)))
    }
}

impl Serialize for TopicWeights {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (t, w) in self.iter() {
            map.serialize_entry(t.label(), &w)?;
        }
        map.end()
    }
}
