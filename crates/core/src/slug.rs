//! Human-readable random slugs (`adjective-adjective-noun`).
//!
//! Used as the job id when the caller does not supply one. Word lists are
//! lowercase ASCII only, so every slug is a valid DNS label.

use rand::seq::IndexedRandom;

const ADJECTIVES: &[&str] = &[
    "able", "agile", "amber", "ancient", "arctic", "autumn", "bold", "brave", "breezy", "bright",
    "brisk", "calm", "candid", "clever", "cloudy", "cosmic", "crimson", "crisp", "curious", "dapper",
    "daring", "dawn", "deep", "distant", "dusty", "eager", "early", "electric", "elegant", "emerald",
    "epic", "fancy", "fearless", "fierce", "floral", "fluffy", "flying", "fresh", "frosty", "gentle",
    "giant", "gilded", "glad", "golden", "graceful", "grand", "happy", "hidden", "hollow", "humble",
    "icy", "jolly", "kind", "lively", "lucky", "lunar", "magic", "mellow", "merry", "mighty",
    "misty", "modern", "noble", "odd", "orange", "patient", "plain", "polite", "proud", "purple",
    "quick", "quiet", "rapid", "rare", "restless", "rising", "rocky", "rosy", "royal", "rustic",
    "shiny", "silent", "silver", "simple", "sleepy", "smooth", "snowy", "solar", "spicy", "steady",
    "stormy", "sunny", "swift", "tidy", "tiny", "vivid", "warm", "wild", "wise", "young",
];

const NOUNS: &[&str] = &[
    "anchor", "apple", "arrow", "badger", "banjo", "beacon", "bear", "beetle", "breeze", "bridge",
    "brook", "cactus", "canyon", "castle", "cedar", "cloud", "comet", "coral", "crane", "crystal",
    "delta", "desert", "dolphin", "dragon", "eagle", "ember", "falcon", "feather", "fern", "field",
    "forest", "fox", "galaxy", "garden", "glacier", "harbor", "hawk", "hill", "island", "jungle",
    "kettle", "koala", "lagoon", "lantern", "leaf", "lemur", "lion", "lotus", "maple", "meadow",
    "meteor", "mirror", "moon", "mountain", "nebula", "oak", "ocean", "orbit", "otter", "owl",
    "panda", "panther", "parrot", "pebble", "pine", "planet", "pond", "prairie", "quartz", "rabbit",
    "raven", "reef", "river", "rocket", "saddle", "sail", "scroll", "shadow", "shore", "sparrow",
    "spruce", "star", "stone", "summit", "sun", "thunder", "tiger", "tower", "trail", "tulip",
    "valley", "violet", "voyage", "walrus", "wave", "willow", "wind", "wolf", "yak", "zebra",
];

/// Generate a random three-word slug, e.g. `brave-quiet-harbor`.
pub fn generate_slug() -> String {
    let mut rng = rand::rng();
    let first = pick(ADJECTIVES, &mut rng);
    let second = pick(ADJECTIVES, &mut rng);
    let noun = pick(NOUNS, &mut rng);
    format!("{first}-{second}-{noun}")
}

fn pick(words: &[&'static str], rng: &mut rand::rngs::ThreadRng) -> &'static str {
    // Lists are non-empty constants.
    words.choose(rng).copied().unwrap_or("job")
}
