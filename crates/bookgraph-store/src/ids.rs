//! Node identifier allocation.
//!
//! Identifiers are derived from a node's position in the store, so the next
//! free identifier is always `generate_id(nodes.len())` and nothing else needs
//! to be persisted.

const ALPHABET: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";

/// Map a node position to its identifier.
///
/// `0..26` map to `a..z`, `26..702` to `aa..zz` (first letter from
/// `index / 26 - 1`, second from `index % 26`), and larger positions keep
/// prepending letters the same way.
pub fn generate_id(index: usize) -> String {
    let mut id = if index < ALPHABET.len() {
        String::with_capacity(1)
    } else {
        generate_id(index / ALPHABET.len() - 1)
    };
    id.push(ALPHABET[index % ALPHABET.len()] as char);
    id
}
