//! Firing sequences: drawn at random, or parsed from text.
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

/// Reproducible generator when `seed` is given, OS-seeded otherwise.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Draws `len` identifiers uniformly from `ids`, with replacement.
pub fn random_sequence<S, R>(ids: &[S], len: usize, rng: &mut R) -> Vec<String>
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    if ids.is_empty() {
        if len > 0 {
            log::warn!("no transitions to draw a firing sequence from");
        }
        return Vec::new();
    }
    (0..len)
        .filter_map(|_| ids.choose(rng))
        .map(|id| id.as_ref().to_owned())
        .collect()
}

/// Splits `t1 => t2, t3 t4` into identifiers.
pub fn parse_sequence(text: &str) -> Vec<String> {
    text.split("=>")
        .flat_map(|chunk| chunk.split(|c: char| c == ',' || c.is_whitespace()))
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let ids = ["t1", "t2"];
        let a = random_sequence(&ids, 20, &mut seeded_rng(Some(7)));
        let b = random_sequence(&ids, 20, &mut seeded_rng(Some(7)));

        assert_eq!(a.len(), 20);
        assert_eq!(a, b);
        assert!(a.iter().all(|id| ids.contains(&id.as_str())));
    }

    #[test]
    fn no_transitions_gives_empty_sequence() {
        let ids: [&str; 0] = [];
        assert!(random_sequence(&ids, 5, &mut seeded_rng(Some(1))).is_empty());
    }

    #[test]
    fn parses_arrows_commas_and_spaces() {
        assert_eq!(
            parse_sequence("t1 => t1,t2  t1=>t2"),
            vec!["t1", "t1", "t2", "t1", "t2"]
        );
        assert!(parse_sequence("  ,  => ").is_empty());
    }
}
