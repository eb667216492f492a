//! Prompt text sent to the image and vision models.

/// Prompt for generating a biome panorama.
#[must_use]
pub fn scene_prompt(biome_prompt: &str) -> String {
    format!(
        "A photograph of {biome_prompt}, possibly containing rare and exotic creatures. \
         Canon EOS 5D Mark IV, 24mm, f/8, 1/250s, ISO 100, 2019"
    )
}

/// Prompt for upscaling a photographed region.
#[must_use]
pub fn enhancement_prompt(biome_prompt: &str) -> String {
    format!(
        "You will be provided with an image of {biome_prompt}. Upscale the image, focusing on \
         exotic birds, insects, small mammals, highly detailed, high resolution, sharp."
    )
}

/// Prompt for identifying species in a photo.
#[must_use]
pub fn identification_prompt(biome_prompt: &str) -> String {
    format!(
        "You will be provided with an image of {biome_prompt}. Identify and list the species of \
         any creatures or plants present in the image. If no specific species can be identified, \
         provide a general description of the types of creatures or plants visible."
    )
}
