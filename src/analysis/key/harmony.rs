//! Harmonic adjacency on the Camelot wheel
//!
//! Each code is compatible with:
//! - +1/-1 on the wheel, same letter (wraps 12 <-> 1)
//! - Same number, opposite letter (relative major/minor)

/// Static adjacency table, one entry per Camelot code
static HARMONIES: [(&str, [&str; 3]); 24] = [
    ("a1", ["a12", "a2", "b1"]),
    ("a2", ["a1", "a3", "b2"]),
    ("a3", ["a2", "a4", "b3"]),
    ("a4", ["a3", "a5", "b4"]),
    ("a5", ["a4", "a6", "b5"]),
    ("a6", ["a5", "a7", "b6"]),
    ("a7", ["a6", "a8", "b7"]),
    ("a8", ["a7", "a9", "b8"]),
    ("a9", ["a8", "a10", "b9"]),
    ("a10", ["a9", "a11", "b10"]),
    ("a11", ["a10", "a12", "b11"]),
    ("a12", ["a11", "a1", "b12"]),
    ("b1", ["b12", "b2", "a1"]),
    ("b2", ["b1", "b3", "a2"]),
    ("b3", ["b2", "b4", "a3"]),
    ("b4", ["b3", "b5", "a4"]),
    ("b5", ["b4", "b6", "a5"]),
    ("b6", ["b5", "b7", "a6"]),
    ("b7", ["b6", "b8", "a7"]),
    ("b8", ["b7", "b9", "a8"]),
    ("b9", ["b8", "b10", "a9"]),
    ("b10", ["b9", "b11", "a10"]),
    ("b11", ["b10", "b12", "a11"]),
    ("b12", ["b11", "b1", "a12"]),
];

/// The three codes harmonically adjacent to `code`, or `None` for an unknown code
pub fn neighbors(code: &str) -> Option<&'static [&'static str; 3]> {
    HARMONIES
        .iter()
        .find(|(node, _)| *node == code)
        .map(|(_, adjacent)| adjacent)
}

/// The code itself plus its neighbours (the set a matched track must fall into)
pub fn compatible_set(code: &str) -> Option<[&'static str; 4]> {
    let (node, adjacent) = HARMONIES.iter().find(|(node, _)| *node == code)?;
    Some([*node, adjacent[0], adjacent[1], adjacent[2]])
}

/// Every code that has an adjacency entry
pub fn nodes() -> impl Iterator<Item = &'static str> {
    HARMONIES.iter().map(|(node, _)| *node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors() {
        let adjacent = neighbors("a8").unwrap();
        assert!(adjacent.contains(&"a7")); // -1
        assert!(adjacent.contains(&"a9")); // +1
        assert!(adjacent.contains(&"b8")); // Relative major
    }

    #[test]
    fn test_neighbors_wrap() {
        let adjacent = neighbors("a12").unwrap();
        assert!(adjacent.contains(&"a1")); // Wraps 12 -> 1
        assert!(adjacent.contains(&"a11"));

        let adjacent = neighbors("b1").unwrap();
        assert!(adjacent.contains(&"b12")); // Wraps 1 -> 12
        assert!(adjacent.contains(&"b2"));
    }

    #[test]
    fn test_b2_points_at_distinct_codes() {
        assert_eq!(neighbors("b2"), Some(&["b1", "b3", "a2"]));
    }

    #[test]
    fn test_relation_is_symmetric() {
        for node in nodes() {
            for neighbor in neighbors(node).unwrap() {
                assert!(
                    neighbors(neighbor).unwrap().contains(&node),
                    "{} -> {} has no way back",
                    node,
                    neighbor
                );
            }
        }
    }

    #[test]
    fn test_compatible_set_includes_self() {
        let set = compatible_set("a5").unwrap();
        assert_eq!(set, ["a5", "a4", "a6", "b5"]);
        assert_eq!(compatible_set("x9"), None);
        assert_eq!(neighbors("x9"), None);
    }
}
