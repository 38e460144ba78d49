//! Decay topology matching
//!
//! Walks the ancestry index from every primary of the root species and fills
//! the four role slots of the fixed template.
//!
//! Tie-breaks are deliberately asymmetric:
//! - among the root's children, the first intermediate and the first companion win;
//! - among the intermediate's children, the last match of each grandchild code wins.

use super::config::DecayTemplate;
use super::forest::ParticleForest;
use super::types::{DecayCandidate, ParticleRecord, Role, TrackId};

/// Matches the decay template against a particle forest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecayMatcher {
    template: DecayTemplate,
}

impl DecayMatcher {
    /// Create a matcher for a template
    pub fn new(template: DecayTemplate) -> Self {
        Self { template }
    }

    /// Template being matched
    #[inline]
    pub fn template(&self) -> &DecayTemplate {
        &self.template
    }

    /// Build the forest for an event's particles with this matcher's root code
    pub fn forest<'a>(&self, particles: &'a [ParticleRecord]) -> ParticleForest<'a> {
        ParticleForest::build(particles, self.template.root)
    }

    /// One candidate per primary, in primary order
    pub fn match_event(&self, forest: &ParticleForest<'_>) -> Vec<DecayCandidate> {
        forest
            .primaries()
            .iter()
            .map(|&root| self.match_root(forest, root))
            .collect()
    }

    /// Match the template below a single root
    ///
    /// Always returns a candidate; slots without a qualifying track stay empty.
    pub fn match_root(&self, forest: &ParticleForest<'_>, root: TrackId) -> DecayCandidate {
        let mut candidate = DecayCandidate::unmatched(root);

        for &child_id in forest.children(root) {
            let Some(child) = forest.particle(child_id) else {
                continue;
            };
            let species = child.species();
            if candidate.intermediate.is_none() && species == self.template.intermediate {
                candidate.intermediate = Some(child_id);
            }
            if candidate.companion.is_none()
                && species == self.template.companion
                && child.mother_id == root
            {
                candidate.companion = Some(child_id);
            }
        }

        if let Some(intermediate) = candidate.intermediate {
            for &child_id in forest.children(intermediate) {
                let Some(child) = forest.particle(child_id) else {
                    continue;
                };
                if child.mother_id != intermediate {
                    continue;
                }
                match self.template.grandchild_role(child.species()) {
                    Some(Role::GrandchildA) => candidate.grandchild_a = Some(child_id),
                    Some(Role::GrandchildB) => candidate.grandchild_b = Some(child_id),
                    _ => {}
                }
            }
        }

        candidate
    }
}

impl Default for DecayMatcher {
    fn default() -> Self {
        Self::new(DecayTemplate::default())
    }
}
