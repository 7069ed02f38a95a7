//! Prompt builders for the two generation requests.

/// Request one country's narrative payload (JSON per the schema in `types`).
pub fn narrative_prompt(country: &str) -> String {
    format!(
        "Tell a soul-stirring story about {country}. Include its capital, central \
         coordinates [lon, lat], 3 profound facts about its heritage, a short evocative \
         description, a visual description for a cinematic zoom, and a short 'cultural \
         essence' phrase."
    )
}

/// Request the cinematic descent video for a country.
pub fn cinematic_prompt(country: &str, landscape_description: &str) -> String {
    format!(
        "An ultra-high-definition cinematic journey into {country}. Starting from a \
         distant golden sunset view of the planet, smoothly descending through ethereal \
         clouds to reveal the stunning, vibrant {landscape_description}. Emotional, \
         cinematic lighting, 8k, photorealistic, awe-inspiring movement. No text."
    )
}
