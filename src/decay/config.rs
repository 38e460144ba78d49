//! Configuration types for the decay pipeline
//!
//! The decay template is fixed in shape (root → intermediate + companion,
//! intermediate → two grandchildren); only the species codes are configurable.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::errors::PipelineError;
use super::types::Role;

/// Species codes of the fixed decay template.
///
/// All codes are absolute: a record matches when `|pdg_code|` equals the code,
/// so particles and antiparticles are treated alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayTemplate {
    /// Primary decaying species (e.g. Omega, 3334)
    pub root: u32,
    /// Intermediate species decaying further (e.g. Lambda, 3122)
    pub intermediate: u32,
    /// Companion produced alongside the intermediate (e.g. kaon, 321)
    pub companion: u32,
    /// First grandchild species (e.g. pion, 211)
    pub grandchild_a: u32,
    /// Second grandchild species (e.g. proton, 2212)
    pub grandchild_b: u32,
}

impl DecayTemplate {
    /// Create a new template from absolute species codes
    pub fn new(
        root: u32,
        intermediate: u32,
        companion: u32,
        grandchild_a: u32,
        grandchild_b: u32,
    ) -> Self {
        Self {
            root,
            intermediate,
            companion,
            grandchild_a,
            grandchild_b,
        }
    }

    /// Omega → Lambda K, Lambda → π p
    pub fn omega() -> Self {
        Self::new(
            super::OMEGA,
            super::LAMBDA,
            super::KAON,
            super::PION,
            super::PROTON,
        )
    }

    /// Xi → Lambda π, Lambda → π p
    ///
    /// The companion and grandchild A share a species; they never compete
    /// because they are searched under different mothers.
    pub fn xi() -> Self {
        Self::new(
            super::XI,
            super::LAMBDA,
            super::PION,
            super::PION,
            super::PROTON,
        )
    }

    /// Create with builder pattern.
    pub fn builder() -> DecayTemplateBuilder {
        DecayTemplateBuilder::default()
    }

    /// Check that every code is set and the grandchild codes are distinct
    pub fn validate(&self) -> Result<(), PipelineError> {
        let named = [
            ("root", self.root),
            ("intermediate", self.intermediate),
            ("companion", self.companion),
            ("grandchild_a", self.grandchild_a),
            ("grandchild_b", self.grandchild_b),
        ];
        if let Some((name, _)) = named.iter().find(|(_, code)| *code == 0) {
            return Err(PipelineError::configuration(format!(
                "species code for {} must be non-zero",
                name
            )));
        }
        if self.grandchild_a == self.grandchild_b {
            return Err(PipelineError::configuration(format!(
                "grandchild codes must differ (both {})",
                self.grandchild_a
            )));
        }
        Ok(())
    }

    /// Grandchild role taken by a species, if any
    #[inline]
    pub fn grandchild_role(&self, species: u32) -> Option<Role> {
        if species == self.grandchild_a {
            Some(Role::GrandchildA)
        } else if species == self.grandchild_b {
            Some(Role::GrandchildB)
        } else {
            None
        }
    }

    /// Species expected in a role slot
    pub fn species_for(&self, role: Role) -> u32 {
        match role {
            Role::Root => self.root,
            Role::Companion => self.companion,
            Role::GrandchildA => self.grandchild_a,
            Role::GrandchildB => self.grandchild_b,
        }
    }
}

impl Default for DecayTemplate {
    fn default() -> Self {
        Self::omega()
    }
}

/// Builder for DecayTemplate.
#[derive(Debug, Default)]
pub struct DecayTemplateBuilder {
    root: Option<u32>,
    intermediate: Option<u32>,
    companion: Option<u32>,
    grandchild_a: Option<u32>,
    grandchild_b: Option<u32>,
}

impl DecayTemplateBuilder {
    /// Set root species code.
    pub fn root(mut self, code: u32) -> Self {
        self.root = Some(code);
        self
    }

    /// Set intermediate species code.
    pub fn intermediate(mut self, code: u32) -> Self {
        self.intermediate = Some(code);
        self
    }

    /// Set companion species code.
    pub fn companion(mut self, code: u32) -> Self {
        self.companion = Some(code);
        self
    }

    /// Set both grandchild species codes.
    pub fn grandchildren(mut self, a: u32, b: u32) -> Self {
        self.grandchild_a = Some(a);
        self.grandchild_b = Some(b);
        self
    }

    /// Build the template, filling unset codes from the Omega template.
    pub fn build(self) -> Result<DecayTemplate, PipelineError> {
        let defaults = DecayTemplate::omega();
        let template = DecayTemplate {
            root: self.root.unwrap_or(defaults.root),
            intermediate: self.intermediate.unwrap_or(defaults.intermediate),
            companion: self.companion.unwrap_or(defaults.companion),
            grandchild_a: self.grandchild_a.unwrap_or(defaults.grandchild_a),
            grandchild_b: self.grandchild_b.unwrap_or(defaults.grandchild_b),
        };
        template.validate()?;
        Ok(template)
    }
}

// ============================================================================
// PipelineConfig
// ============================================================================

/// Run configuration for a batch of events.
///
/// # Example
///
/// ```
/// use decay_hit_matcher::decay::{DecayTemplate, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .template(DecayTemplate::xi())
///     .event_limit(100)
///     .build()
///     .unwrap();
/// assert_eq!(config.event_limit, Some(100));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Species codes to match
    pub template: DecayTemplate,

    /// Number of events to process. `None` processes every event the
    /// source provides; a bound larger than the source is an error.
    pub event_limit: Option<usize>,

    /// Process events on the rayon pool (requires the `rayon` feature)
    pub parallel: bool,
}

impl PipelineConfig {
    /// Create a sequential configuration without an event bound
    pub fn new(template: DecayTemplate) -> Self {
        Self {
            template,
            event_limit: None,
            parallel: false,
        }
    }

    /// Create with builder pattern.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.template.validate()
    }

    /// Parse a configuration from JSON; missing fields take defaults
    pub fn from_json_str(json: &str) -> Result<Self, PipelineError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| PipelineError::parse("pipeline config", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| PipelineError::io(format!("reading {}", path.display()), e))?;
        Self::from_json_str(&content)
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Serialize to pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(DecayTemplate::default())
    }
}

/// Builder for PipelineConfig.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    template: Option<DecayTemplate>,
    event_limit: Option<usize>,
    parallel: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Set the decay template.
    pub fn template(mut self, template: DecayTemplate) -> Self {
        self.template = Some(template);
        self
    }

    /// Bound the number of processed events.
    pub fn event_limit(mut self, limit: usize) -> Self {
        self.event_limit = Some(limit);
        self
    }

    /// Enable or disable parallel event processing.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = Some(parallel);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<PipelineConfig, PipelineError> {
        let config = PipelineConfig {
            template: self.template.unwrap_or_default(),
            event_limit: self.event_limit,
            parallel: self.parallel.unwrap_or(false),
        };
        config.validate()?;
        Ok(config)
    }
}
