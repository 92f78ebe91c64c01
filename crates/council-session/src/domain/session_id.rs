//! Human-friendly session identifiers.
//!
//! Identifiers are three lowercase words joined by hyphens (adverb,
//! adjective, animal), e.g. `briskly-amber-heron`. They only ever contain
//! `[a-z-]`, so they are safe to use verbatim as a path segment.

use council_core::rng::DeterministicRng;

const ADVERBS: &[&str] = &[
    "boldly", "briskly", "calmly", "deftly", "eagerly", "gently", "gladly", "keenly", "kindly",
    "lightly", "merrily", "neatly", "nimbly", "openly", "quietly", "rapidly", "slowly", "smoothly",
    "softly", "swiftly", "truly", "warmly", "wisely", "yearly",
];

const ADJECTIVES: &[&str] = &[
    "amber", "ancient", "bold", "brave", "bright", "calm", "clever", "crimson", "daring", "eager",
    "fancy", "gentle", "golden", "happy", "jolly", "lucky", "mellow", "nimble", "proud", "quiet",
    "rustic", "silver", "sturdy", "witty",
];

const ANIMALS: &[&str] = &[
    "badger", "beaver", "bison", "crane", "falcon", "ferret", "gecko", "heron", "ibis", "jackal",
    "koala", "lemur", "lynx", "marten", "newt", "ocelot", "otter", "panda", "quail", "raven",
    "salmon", "tapir", "walrus", "yak",
];

/// Generates a three-word, hyphen-joined session identifier.
pub fn generate_session_id(rng: &mut dyn DeterministicRng) -> String {
    [ADVERBS, ADJECTIVES, ANIMALS]
        .iter()
        .map(|words| pick(words, rng))
        .collect::<Vec<_>>()
        .join("-")
}

fn pick(words: &[&'static str], rng: &mut dyn DeterministicRng) -> &'static str {
    let last = words.len() - 1;
    let drawn = rng.next_u32_range(0, u32::try_from(last).unwrap_or(u32::MAX));
    words[usize::try_from(drawn).map_or(last, |index| index.min(last))]
}
