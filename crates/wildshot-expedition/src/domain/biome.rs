//! Biome catalog.

use serde::{Deserialize, Serialize};
use wildshot_core::error::DomainError;

use super::progression::ProgressionRules;

/// One themed scene the player explores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Biome {
    /// Short display name.
    pub name: String,
    /// Scene description fed to the image models.
    pub prompt: String,
    /// Background track played while exploring this biome.
    pub soundtrack: String,
}

/// Ordered, non-empty list of biomes an expedition walks through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BiomeCatalog {
    biomes: Vec<Biome>,
}

#[derive(Deserialize)]
struct CatalogFile {
    biomes: Vec<Biome>,
}

impl BiomeCatalog {
    /// Builds a catalog, rejecting an empty list or blank prompts.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the list is empty or any biome
    /// has a blank name or prompt.
    pub fn new(biomes: Vec<Biome>) -> Result<Self, DomainError> {
        if biomes.is_empty() {
            return Err(DomainError::Validation(
                "biome catalog must contain at least one biome".to_owned(),
            ));
        }
        if let Some(position) = biomes
            .iter()
            .position(|b| b.name.trim().is_empty() || b.prompt.trim().is_empty())
        {
            return Err(DomainError::Validation(format!(
                "biome {position} must have a name and a prompt"
            )));
        }
        Ok(Self { biomes })
    }

    /// Parses a catalog from YAML of the form `biomes: [{name, prompt, soundtrack}]`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for malformed YAML or an invalid catalog.
    pub fn from_yaml(source: &str) -> Result<Self, DomainError> {
        let file: CatalogFile = serde_yaml::from_str(source)
            .map_err(|e| DomainError::Validation(format!("invalid biome catalog: {e}")))?;
        Self::new(file.biomes)
    }

    /// Returns the biome at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Biome> {
        self.biomes.get(index)
    }

    /// Number of biomes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    /// Whether the catalog has no biomes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }

    /// Iterates the biomes in expedition order.
    pub fn iter(&self) -> impl Iterator<Item = &Biome> {
        self.biomes.iter()
    }

    /// Progression rules for this catalog with `selections_per_biome` photos each.
    #[must_use]
    pub fn rules(&self, selections_per_biome: u32) -> ProgressionRules {
        ProgressionRules::new(self.biomes.len(), selections_per_biome)
    }
}

impl Default for BiomeCatalog {
    fn default() -> Self {
        Self {
            biomes: vec![
                Biome {
                    name: "Rainforest".to_owned(),
                    prompt: "A dense tropical rainforest with towering trees, thick undergrowth, and a variety of colorful plants. The air is humid, and sunlight filters through the canopy, creating dappled patterns on the forest floor. Exotic birds, insects, and small mammals can be seen in their natural habitat.".to_owned(),
                    soundtrack: "audio/CanopyWhispers.mp3".to_owned(),
                },
                Biome {
                    name: "Savanna".to_owned(),
                    prompt: "A vast savanna with golden grasses stretching as far as the eye can see. Scattered acacia trees provide sparse shade, and the sky is a brilliant blue. Herds of zebras, antelopes, and giraffes roam the plains, while lions and other predators lurk in the distance".to_owned(),
                    soundtrack: "audio/CoralSerenity.mp3".to_owned(),
                },
                Biome {
                    name: "Arctic Tundra".to_owned(),
                    prompt: "A cold, snowy arctic tundra with vast expanses of ice and snow. The landscape is dotted with hardy shrubs and lichen, and the sky has a pale, ethereal glow. Polar bears, arctic foxes, and seals can be seen in this frozen wilderness".to_owned(),
                    soundtrack: "audio/RainforestRhapsody.mp3".to_owned(),
                },
            ],
        }
    }
}
