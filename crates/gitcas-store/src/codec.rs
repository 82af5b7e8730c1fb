//! Canonical framed encoding of objects.
//!
//! Every object is stored and hashed as
//!
//! ```text
//! <kind> <decimal payload length>\0<payload>
//! ```
//!
//! Payloads:
//!
//! - blob: the raw bytes.
//! - tree: for each entry in canonical order, `<mode> <name>\0<20 raw id bytes>`.
//! - commit: `tree <hex>\n`, optional `parent <hex>\n`, `author <sig>\n`,
//!   `committer <sig>\n`, `\n`, then the message and a final `\n`.
//!
//! Any byte-level deviation changes every id, so frames are assembled as
//! explicit byte buffers and the declared length is checked on decode.

use gitcas_types::{ObjectId, Signature, OBJECT_ID_LEN};

use crate::error::{StoreError, StoreResult};
use crate::object::{Blob, Commit, EntryMode, Object, ObjectKind, Tree, TreeEntry};

fn malformed(reason: impl Into<String>) -> StoreError {
    StoreError::MalformedObject(reason.into())
}

/// Build the frame `<kind> <len>\0<payload>`.
pub fn frame(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
    let len = payload.len().to_string();
    let mut out = Vec::with_capacity(kind.keyword().len() + len.len() + 2 + payload.len());
    out.extend_from_slice(kind.keyword().as_bytes());
    out.push(b' ');
    out.extend_from_slice(len.as_bytes());
    out.push(0);
    out.extend_from_slice(payload);
    out
}

/// Split a frame into its kind and payload, validating the header.
pub fn parse_frame(bytes: &[u8]) -> StoreResult<(ObjectKind, &[u8])> {
    let nul = bytes
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| malformed("missing NUL after header"))?;
    let header = &bytes[..nul];
    let payload = &bytes[nul + 1..];

    let space = header
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| malformed("header has no length field"))?;
    let (keyword, len) = (&header[..space], &header[space + 1..]);

    let kind = ObjectKind::from_keyword(keyword).ok_or_else(|| {
        malformed(format!(
            "unknown object kind {:?}",
            String::from_utf8_lossy(keyword)
        ))
    })?;

    let declared = parse_length(len)?;
    if declared != payload.len() {
        return Err(malformed(format!(
            "declared length {declared} but payload is {} bytes",
            payload.len()
        )));
    }
    Ok((kind, payload))
}

/// Decimal digits only, no sign, no leading zeros.
fn parse_length(digits: &[u8]) -> StoreResult<usize> {
    let bad = || {
        malformed(format!(
            "invalid length {:?}",
            String::from_utf8_lossy(digits)
        ))
    };
    if digits.is_empty()
        || !digits.iter().all(u8::is_ascii_digit)
        || (digits.len() > 1 && digits[0] == b'0')
    {
        return Err(bad());
    }
    std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(bad)
}

/// Encode an object's payload (without the frame header).
pub fn encode_payload(object: &Object) -> Vec<u8> {
    match object {
        Object::Blob(blob) => blob.data.clone(),
        Object::Tree(tree) => encode_tree(tree),
        Object::Commit(commit) => encode_commit(commit),
    }
}

/// Encode an object into its full canonical frame. Total and deterministic.
pub fn encode(object: &Object) -> Vec<u8> {
    frame(object.kind(), &encode_payload(object))
}

/// Decode a full frame back into an object.
pub fn decode(bytes: &[u8]) -> StoreResult<Object> {
    let (kind, payload) = parse_frame(bytes)?;
    decode_payload(kind, payload)
}

/// Decode a payload whose kind is already known.
pub fn decode_payload(kind: ObjectKind, payload: &[u8]) -> StoreResult<Object> {
    match kind {
        ObjectKind::Blob => Ok(Object::Blob(Blob::new(payload.to_vec()))),
        ObjectKind::Tree => decode_tree(payload).map(Object::Tree),
        ObjectKind::Commit => decode_commit(payload).map(Object::Commit),
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

fn encode_tree(tree: &Tree) -> Vec<u8> {
    let mut out = Vec::new();
    for entry in tree.entries() {
        out.extend_from_slice(entry.mode.as_str().as_bytes());
        out.push(b' ');
        out.extend_from_slice(entry.name.as_bytes());
        out.push(0);
        out.extend_from_slice(entry.id.as_bytes());
    }
    out
}

fn decode_tree(mut rest: &[u8]) -> StoreResult<Tree> {
    let mut entries = Vec::new();
    while !rest.is_empty() {
        let space = rest
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| malformed("tree entry has no mode separator"))?;
        let mode = EntryMode::from_ascii(&rest[..space]).ok_or_else(|| {
            malformed(format!(
                "unknown tree entry mode {:?}",
                String::from_utf8_lossy(&rest[..space])
            ))
        })?;
        rest = &rest[space + 1..];

        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| malformed("tree entry name is not NUL-terminated"))?;
        let name = std::str::from_utf8(&rest[..nul])
            .map_err(|_| malformed("tree entry name is not UTF-8"))?
            .to_string();
        rest = &rest[nul + 1..];

        if rest.len() < OBJECT_ID_LEN {
            return Err(malformed(format!("tree entry {name:?} has a truncated id")));
        }
        let id = ObjectId::from_raw(&rest[..OBJECT_ID_LEN])
            .map_err(|e| malformed(e.to_string()))?;
        rest = &rest[OBJECT_ID_LEN..];

        entries.push(TreeEntry::new(mode, name, id));
    }

    Tree::from_sorted(entries).map_err(|e| match e {
        StoreError::InvalidTreeEntry { name, reason } => {
            malformed(format!("tree entry {name:?}: {reason}"))
        }
        other => other,
    })
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

fn encode_commit(commit: &Commit) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(format!("tree {}\n", commit.tree).as_bytes());
    if let Some(parent) = &commit.parent {
        out.extend_from_slice(format!("parent {parent}\n").as_bytes());
    }
    out.extend_from_slice(format!("author {}\n", commit.author).as_bytes());
    out.extend_from_slice(format!("committer {}\n", commit.committer).as_bytes());
    out.push(b'\n');
    out.extend_from_slice(commit.message.as_bytes());
    out.push(b'\n');
    out
}

fn decode_commit(payload: &[u8]) -> StoreResult<Commit> {
    let text =
        std::str::from_utf8(payload).map_err(|_| malformed("commit payload is not UTF-8"))?;
    let (headers, message) = text
        .split_once("\n\n")
        .ok_or_else(|| malformed("commit has no blank line before the message"))?;

    let mut lines = headers.split('\n').peekable();
    let tree = header_id(lines.next(), "tree")?;
    let parent = match lines.peek() {
        Some(line) if line.starts_with("parent ") => Some(header_id(lines.next(), "parent")?),
        _ => None,
    };
    let author = header_signature(lines.next(), "author")?;
    let committer = header_signature(lines.next(), "committer")?;
    if let Some(extra) = lines.next() {
        return Err(malformed(format!("unexpected commit header {extra:?}")));
    }

    let message = message
        .strip_suffix('\n')
        .ok_or_else(|| malformed("commit message is not newline-terminated"))?
        .to_string();
    Ok(Commit {
        tree,
        parent,
        author,
        committer,
        message,
    })
}

fn header_value<'a>(line: Option<&'a str>, key: &str) -> StoreResult<&'a str> {
    line.and_then(|l| l.strip_prefix(key))
        .and_then(|l| l.strip_prefix(' '))
        .ok_or_else(|| malformed(format!("missing {key} header")))
}

/// Ids in commit headers must be exactly 40 lowercase hex characters.
fn header_id(line: Option<&str>, key: &str) -> StoreResult<ObjectId> {
    let hex = header_value(line, key)?;
    let canonical = hex.len() == OBJECT_ID_LEN * 2
        && hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
    if !canonical {
        return Err(malformed(format!("invalid {key} id {hex:?}")));
    }
    ObjectId::from_hex(hex).map_err(|e| malformed(format!("invalid {key} id: {e}")))
}

fn header_signature(line: Option<&str>, key: &str) -> StoreResult<Signature> {
    header_value(line, key)?
        .parse()
        .map_err(|e| malformed(format!("invalid {key} line: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitcas_types::{GitTime, TzOffset};
    use proptest::prelude::*;

    const HI_BLOB: &str = "45b983be36b73c0788dc9cbcb76cbb80fc7bb057";
    const HI_TREE: &str = "b0e66a8a93b83161375f18dcdc9e9329af61e04f";
    const HI_COMMIT: &str = "411ff1b35685695f3398331b971e73d71e12c779";

    fn max() -> Signature {
        let when = GitTime::new(1_700_000_000, TzOffset::from_minutes(-420).unwrap());
        Signature::new("Max Henstell", "max@kapamaki.net", when).unwrap()
    }

    fn hi_tree() -> Tree {
        let blob = ObjectId::from_hex(HI_BLOB).unwrap();
        Tree::new(vec![TreeEntry::new(EntryMode::Regular, "hi.txt", blob)]).unwrap()
    }

    #[test]
    fn blob_frame_is_exact() {
        let encoded = encode(&Object::Blob(Blob::new(b"hi\n".to_vec())));
        assert_eq!(encoded, b"blob 3\0hi\n");
    }

    #[test]
    fn single_entry_tree_frame_is_exact() {
        let encoded = encode(&Object::Tree(hi_tree()));

        let mut entry = b"100644 hi.txt\0".to_vec();
        entry.extend_from_slice(ObjectId::from_hex(HI_BLOB).unwrap().as_bytes());
        assert_eq!(entry.len(), 34);
        let mut expected = b"tree 34\0".to_vec();
        expected.extend_from_slice(&entry);

        assert_eq!(encoded, expected);
        assert_eq!(Object::Tree(hi_tree()).id().to_hex(), HI_TREE);
    }

    #[test]
    fn commit_frame_matches_git() {
        let commit = Commit::new(ObjectId::from_hex(HI_TREE).unwrap(), max(), max(), "test");
        let encoded = encode(&Object::Commit(commit.clone()));
        let text = String::from_utf8(encoded).unwrap();
        assert_eq!(
            text,
            format!(
                "commit 167\0tree {HI_TREE}\n\
                 author Max Henstell <max@kapamaki.net> 1700000000 -0700\n\
                 committer Max Henstell <max@kapamaki.net> 1700000000 -0700\n\
                 \n\
                 test\n"
            )
        );
        assert_eq!(Object::Commit(commit).id().to_hex(), HI_COMMIT);
    }

    #[test]
    fn commit_with_parent_roundtrips() {
        let commit = Commit::new(ObjectId::from_hex(HI_TREE).unwrap(), max(), max(), "second")
            .with_parent(ObjectId::from_hex(HI_COMMIT).unwrap());
        let encoded = encode(&Object::Commit(commit.clone()));
        let text = String::from_utf8_lossy(&encoded);
        assert!(text.contains(&format!("\nparent {HI_COMMIT}\nauthor ")));
        assert_eq!(decode(&encoded).unwrap(), Object::Commit(commit));
    }

    #[test]
    fn multiline_message_roundtrips() {
        let commit = Commit::new(
            ObjectId::from_hex(HI_TREE).unwrap(),
            max(),
            max(),
            "subject\n\nbody line\n\ntrailer: x\n",
        );
        let object = Object::Commit(commit);
        assert_eq!(decode(&encode(&object)).unwrap(), object);
    }

    #[test]
    fn decode_known_frames() {
        assert_eq!(
            decode(b"blob 3\0hi\n").unwrap(),
            Object::Blob(Blob::new(b"hi\n".to_vec()))
        );
        assert_eq!(decode(&encode(&Object::Tree(hi_tree()))).unwrap(), Object::Tree(hi_tree()));
        assert_eq!(decode(b"tree 0\0").unwrap(), Object::Tree(Tree::empty()));
    }

    #[test]
    fn rejects_missing_header() {
        assert!(matches!(decode(b"blob 3hi\n"), Err(StoreError::MalformedObject(_))));
        assert!(matches!(decode(b"blob\0hi"), Err(StoreError::MalformedObject(_))));
        assert!(matches!(decode(b""), Err(StoreError::MalformedObject(_))));
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = decode(b"blob 4\0hi\n").unwrap_err();
        assert!(err.to_string().contains("declared length 4"));
        assert!(decode(b"blob 2\0hi\n").is_err());
    }

    #[test]
    fn rejects_non_canonical_lengths() {
        for bad in [&b"blob 03\0hi\n"[..], b"blob +3\0hi\n", b"blob \0", b"blob 3 \0hi\n"] {
            assert!(matches!(decode(bad), Err(StoreError::MalformedObject(_))), "{bad:?}");
        }
        assert!(decode(b"blob 99999999999999999999999\0").is_err());
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = decode(b"tag 0\0").unwrap_err();
        assert!(err.to_string().contains("unknown object kind"));
        assert!(decode(b"Blob 0\0").is_err());
    }

    #[test]
    fn rejects_truncated_tree_entry() {
        let mut payload = b"100644 hi.txt\0".to_vec();
        payload.extend_from_slice(&[0xab; 10]);
        assert!(decode(&frame(ObjectKind::Tree, &payload)).is_err());
        assert!(decode(&frame(ObjectKind::Tree, b"100644 hi.txt")).is_err());
        assert!(decode(&frame(ObjectKind::Tree, b"100644")).is_err());
    }

    #[test]
    fn rejects_unknown_mode_and_unsorted_trees() {
        let mut bad_mode = b"100664 a\0".to_vec();
        bad_mode.extend_from_slice(&[1; 20]);
        assert!(decode(&frame(ObjectKind::Tree, &bad_mode)).is_err());

        let mut unsorted = Vec::new();
        for name in ["b", "a"] {
            unsorted.extend_from_slice(format!("100644 {name}\0").as_bytes());
            unsorted.extend_from_slice(&[1; 20]);
        }
        let err = decode(&frame(ObjectKind::Tree, &unsorted)).unwrap_err();
        assert!(matches!(err, StoreError::MalformedObject(_)));

        let mut nested = b"100644 a/b\0".to_vec();
        nested.extend_from_slice(&[1; 20]);
        let err = decode(&frame(ObjectKind::Tree, &nested)).unwrap_err();
        assert!(matches!(err, StoreError::MalformedObject(_)));
    }

    #[test]
    fn rejects_malformed_commits() {
        let sig = "Max Henstell <max@kapamaki.net> 1700000000 -0700";
        let cases = [
            format!("author {sig}\ncommitter {sig}\n\nmsg\n"),
            format!("tree {HI_TREE}\ncommitter {sig}\n\nmsg\n"),
            format!("tree {HI_TREE}\nauthor {sig}\ncommitter {sig}\nmsg\n"),
            format!("tree {}\nauthor {sig}\ncommitter {sig}\n\nmsg\n", HI_TREE.to_uppercase()),
            format!("tree {HI_TREE}\nparent {HI_COMMIT}\nparent {HI_COMMIT}\nauthor {sig}\ncommitter {sig}\n\nmsg\n"),
            format!("tree {HI_TREE}\nauthor nobody\ncommitter {sig}\n\nmsg\n"),
            format!("tree {HI_TREE}\nauthor {sig}\ncommitter {sig}\nencoding latin1\n\nmsg\n"),
        ];
        for payload in cases {
            let err = decode(&frame(ObjectKind::Commit, payload.as_bytes())).unwrap_err();
            assert!(matches!(err, StoreError::MalformedObject(_)), "{payload:?}");
        }
    }

    #[test]
    fn rejects_commits_that_would_reencode_differently() {
        let sig = "Max Henstell <max@kapamaki.net> 1700000000 -0700";
        let cases = [
            format!("tree {HI_TREE}\nauthor Max Henstell <max@kapamaki.net> 0001700000000 -0700\ncommitter {sig}\n\ntest\n"),
            format!("tree {HI_TREE}\nauthor Max Henstell <max@kapamaki.net> +1700000000 -0700\ncommitter {sig}\n\ntest\n"),
            format!("tree {HI_TREE}\nauthor {sig}\ncommitter Max Henstell <max@kapamaki.net> 1700000000 -0000\n\ntest\n"),
            format!("tree {HI_TREE}\nauthor {sig}\ncommitter Max Henstell <max@kapamaki.net> 1700000000 +10000\n\ntest\n"),
            format!("tree {HI_TREE}\nauthor Max Henstell<max@kapamaki.net> 1700000000 -0700\ncommitter {sig}\n\ntest\n"),
            format!("tree {HI_TREE}\nauthor {sig}\ncommitter {sig}\n\ntest"),
        ];
        for payload in cases {
            let err = decode(&frame(ObjectKind::Commit, payload.as_bytes())).unwrap_err();
            assert!(matches!(err, StoreError::MalformedObject(_)), "{payload:?}");
        }

        let canonical = format!("tree {HI_TREE}\nauthor {sig}\ncommitter {sig}\n\ntest\n");
        let bytes = frame(ObjectKind::Commit, canonical.as_bytes());
        let object = decode(&bytes).unwrap();
        assert_eq!(encode(&object), bytes);
        assert_eq!(object.id().to_hex(), HI_COMMIT);
    }

    fn arb_signature() -> impl Strategy<Value = Signature> {
        ("[A-Za-z][A-Za-z .]{0,15}[A-Za-z]", "[a-z]{1,8}@[a-z]{1,8}", 0i64..4_000_000_000, -720i32..=840)
            .prop_map(|(name, email, seconds, minutes)| {
                let when = GitTime::new(seconds, TzOffset::from_minutes(minutes).unwrap());
                Signature::new(name, email, when).unwrap()
            })
    }

    fn arb_id() -> impl Strategy<Value = ObjectId> {
        any::<[u8; 20]>().prop_map(ObjectId::from_hash)
    }

    fn arb_object() -> impl Strategy<Value = Object> {
        let blob = proptest::collection::vec(any::<u8>(), 0..256)
            .prop_map(|data| Object::Blob(Blob::new(data)));
        let mode = prop_oneof![
            Just(EntryMode::Regular),
            Just(EntryMode::Executable),
            Just(EntryMode::Symlink),
            Just(EntryMode::Directory),
        ];
        let tree = proptest::collection::btree_map("[a-zA-Z0-9._-]{1,12}", (mode, arb_id()), 0..8)
            .prop_filter("relative components", |m| !m.contains_key(".") && !m.contains_key(".."))
            .prop_map(|entries| {
                let entries = entries
                    .into_iter()
                    .map(|(name, (mode, id))| TreeEntry::new(mode, name, id))
                    .collect();
                Object::Tree(Tree::new(entries).unwrap())
            });
        let commit = (arb_id(), proptest::option::of(arb_id()), arb_signature(), arb_signature(), "(?s).{0,64}")
            .prop_map(|(tree, parent, author, committer, message)| {
                let mut commit = Commit::new(tree, author, committer, message);
                commit.parent = parent;
                Object::Commit(commit)
            });
        prop_oneof![blob, tree, commit]
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(object in arb_object()) {
            let encoded = encode(&object);
            prop_assert_eq!(decode(&encoded).unwrap(), object);
        }

        #[test]
        fn accepted_frames_reencode_byte_exact(object in arb_object()) {
            let encoded = encode(&object);
            let decoded = decode(&encoded).unwrap();
            prop_assert_eq!(encode(&decoded), encoded);
        }

        #[test]
        fn id_is_digest_of_frame(object in arb_object()) {
            let encoded = encode(&object);
            prop_assert!(gitcas_crypto::ObjectHasher::verify(&encoded, &object.id()));
        }
    }
}
