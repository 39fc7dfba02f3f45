//! Genome naming - readable labels for offspring
//!
//! Offspring get two-word names (e.g. "wary-dove") derived from their
//! genes, so identical genomes always share a name across generations.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::genome::Gene;

const ADJECTIVES: [&str; 32] = [
    "wary", "loyal", "sly", "meek", "stern", "fickle", "patient", "bitter",
    "gentle", "stubborn", "eager", "silent", "honest", "cunning", "timid", "proud",
    "steady", "restless", "forgiving", "jaded", "hopeful", "grim", "sober", "brash",
    "humble", "vain", "calm", "rash", "kind", "cold", "sharp", "lucky",
];

const NOUNS: [&str; 32] = [
    "dove", "hawk", "fox", "crow", "wren", "heron", "owl", "lark",
    "broker", "envoy", "warden", "herald", "scout", "pilgrim", "judge", "hermit",
    "pact", "truce", "oath", "bargain", "wager", "gambit", "ledger", "token",
    "mirror", "shadow", "echo", "lantern", "anchor", "compass", "key", "bell",
];

/// Canonical text of a genome's behaviour. Gene ids are left out so
/// relabelled copies of the same rules compare equal.
pub fn genome_signature(genome: &[Gene]) -> String {
    genome
        .iter()
        .map(|gene| {
            let c = &gene.condition;
            format!(
                "{:?}/{:?}/{:?}->{:?}@{:?}",
                c.opponent_last_move,
                c.self_last_move,
                c.round_range.map(|r| (r.start, r.end)),
                gene.response,
                gene.weight
            )
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Map a signature onto a deterministic two-word name
pub fn signature_to_name(signature: &str) -> String {
    let mut hasher = DefaultHasher::new();
    signature.hash(&mut hasher);
    let h = hasher.finish();

    let adjective = ((h >> 5) & 0x1F) as usize;
    let noun = (h & 0x1F) as usize;

    format!("{}-{}", ADJECTIVES[adjective], NOUNS[noun])
}

pub fn genome_name(genome: &[Gene]) -> String {
    signature_to_name(&genome_signature(genome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::GeneCondition;
    use dilemma_core::Move;

    #[test]
    fn test_same_rules_same_name() {
        let a = vec![Gene::new("g1", GeneCondition::default(), Move::Defect)];
        let b = vec![Gene::new("other-id", GeneCondition::default(), Move::Defect)];
        assert_eq!(genome_signature(&a), genome_signature(&b));
        assert_eq!(genome_name(&a), genome_name(&b));
    }

    #[test]
    fn test_signature_tracks_response() {
        let a = vec![Gene::new("g", GeneCondition::default(), Move::Defect)];
        let b = vec![Gene::new("g", GeneCondition::default(), Move::Cooperate)];
        assert_ne!(genome_signature(&a), genome_signature(&b));
    }

    #[test]
    fn test_name_shape() {
        let name = signature_to_name("anything");
        let parts: Vec<&str> = name.split('-').collect();
        assert_eq!(parts.len(), 2);
        assert!(ADJECTIVES.contains(&parts[0]));
        assert!(NOUNS.contains(&parts[1]));
    }
}
