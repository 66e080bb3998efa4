//! Posting list encoding.
//!
//! A posting maps `field~value` to the keys of every object declaring that
//! pair, joined by a tab byte in insertion order.

use lkv_types::IndexPair;

/// Separator between the field and the value in a posting key.
pub const FIELD_SEPARATOR: char = '~';

/// Separator between object keys inside a posting list.
pub const KEY_SEPARATOR: u8 = b'\t';

/// Store key of the posting for one `(field, value)` pair.
pub fn posting_key(field: &str, value: &str) -> Vec<u8> {
    format!("{field}{FIELD_SEPARATOR}{value}").into_bytes()
}

/// Store key of the posting for a flattened index pair.
pub fn posting_key_for(pair: &IndexPair) -> Vec<u8> {
    posting_key(&pair.field, &pair.value)
}

/// Returns `true` if `list` contains `key` as a whole entry.
pub fn contains_key(list: &[u8], key: &[u8]) -> bool {
    !list.is_empty() && list.split(|b| *b == KEY_SEPARATOR).any(|entry| entry == key)
}

/// Append `key` to `list`, adding a separator only when the list is not
/// empty. A key already present is not added again.
pub fn append_key(list: &[u8], key: &[u8]) -> Vec<u8> {
    if contains_key(list, key) {
        return list.to_vec();
    }
    let mut out = Vec::with_capacity(list.len() + 1 + key.len());
    out.extend_from_slice(list);
    if !out.is_empty() {
        out.push(KEY_SEPARATOR);
    }
    out.extend_from_slice(key);
    out
}

/// Remove the entry equal to `key` together with one adjacent separator.
///
/// Entries that merely contain `key` as a substring are left alone. If
/// `key` is absent the list is returned unchanged.
pub fn remove_key(list: &[u8], key: &[u8]) -> Vec<u8> {
    let mut start = 0;
    for entry in list.split(|b| *b == KEY_SEPARATOR) {
        let end = start + entry.len();
        if entry == key {
            let (cut_start, cut_end) = if end < list.len() {
                // Take the separator that follows.
                (start, end + 1)
            } else if start > 0 {
                // Last entry: take the separator before it.
                (start - 1, end)
            } else {
                (start, end)
            };
            let mut out = Vec::with_capacity(list.len() - (cut_end - cut_start));
            out.extend_from_slice(&list[..cut_start]);
            out.extend_from_slice(&list[cut_end..]);
            return out;
        }
        start = end + 1;
    }
    list.to_vec()
}

/// Decode a posting list into object keys.
pub fn decode_keys(list: &[u8]) -> Vec<String> {
    if list.is_empty() {
        return Vec::new();
    }
    list.split(|b| *b == KEY_SEPARATOR)
        .map(|k| String::from_utf8_lossy(k).into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(keys: &[&str]) -> Vec<u8> {
        keys.iter()
            .fold(Vec::new(), |list, k| append_key(&list, k.as_bytes()))
    }

    #[test]
    fn append_joins_with_tabs() {
        assert_eq!(build(&["yay", "woo!", "meow"]), b"yay\twoo!\tmeow".to_vec());
        assert_eq!(build(&["solo"]), b"solo".to_vec());
    }

    #[test]
    fn append_skips_duplicates() {
        assert_eq!(build(&["a", "b", "a"]), b"a\tb".to_vec());
    }

    #[test]
    fn remove_from_each_position() {
        let list = build(&["yay", "woo!", "meow"]);
        assert_eq!(remove_key(&list, b"yay"), b"woo!\tmeow".to_vec());
        assert_eq!(remove_key(&list, b"woo!"), b"yay\tmeow".to_vec());
        assert_eq!(remove_key(&list, b"meow"), b"yay\twoo!".to_vec());
    }

    #[test]
    fn remove_sole_entry_empties_list() {
        assert!(remove_key(b"only", b"only").is_empty());
    }

    #[test]
    fn remove_matches_whole_entries_only() {
        let list = build(&["ab", "b"]);
        assert_eq!(remove_key(&list, b"b"), b"ab".to_vec());
        assert_eq!(remove_key(&list, b"a"), list);
    }

    #[test]
    fn decode_round_trips_order() {
        let list = build(&["k1", "k2", "k3"]);
        assert_eq!(decode_keys(&list), vec!["k1", "k2", "k3"]);
        assert!(decode_keys(b"").is_empty());
    }

    #[test]
    fn posting_key_format() {
        assert_eq!(posting_key("color", "red"), b"color~red".to_vec());
        assert_eq!(posting_key_for(&IndexPair::new("f", "v")), b"f~v".to_vec());
    }
}
