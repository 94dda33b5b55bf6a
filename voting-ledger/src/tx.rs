// Copyright (C) Microsoft Corporation. All rights reserved.

//! The transaction grammar, per spec.md §4.3:
//!
//! - `vote:<uid>:<ciphertext-decimal>`
//! - `result:<payload>`
//!
//! Anything else is an unknown transaction, accepted as a no-op
//! (spec.md §9 "Unknown transactions").

use crypto_core::EncryptedNumber;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Vote {
        uid: String,
        ciphertext: String,
    },
    Result {
        payload: String,
    },
    /// Grammar matched `vote:` but the ciphertext or uid was malformed.
    VoteMalformed(String),
    /// Neither `vote:` nor `result:` — accepted as a no-op.
    Unknown(String),
}

impl Transaction {
    /// Parses a raw transaction byte string. Never fails: a transaction
    /// that doesn't fit the grammar is not a parse error, it's an
    /// `Unknown` or `VoteMalformed` transaction, both of which the
    /// ledger's `check_tx`/`deliver_tx` handle without propagating a
    /// Rust `Err` (spec.md §9's uniform-OK-code behavior starts here).
    pub fn parse(raw: &str) -> Transaction {
        if let Some(rest) = raw.strip_prefix("vote:") {
            return Self::parse_vote(rest);
        }
        if let Some(payload) = raw.strip_prefix("result:") {
            return Transaction::Result {
                payload: payload.to_string(),
            };
        }
        Transaction::Unknown(raw.to_string())
    }

    fn parse_vote(rest: &str) -> Transaction {
        let mut parts = rest.splitn(2, ':');
        let uid = match parts.next() {
            Some(uid) if !uid.is_empty() => uid,
            _ => return Transaction::VoteMalformed("empty uid".to_string()),
        };
        let ciphertext = match parts.next() {
            Some(c) if !c.is_empty() => c,
            _ => return Transaction::VoteMalformed("missing ciphertext".to_string()),
        };

        Transaction::Vote {
            uid: uid.to_string(),
            ciphertext: ciphertext.to_string(),
        }
    }

    /// Decodes the `ciphertext` field of a `Vote` transaction into an
    /// `EncryptedNumber`, or `None` if it isn't a well-formed decimal
    /// ciphertext. Only meaningful on `Transaction::Vote`.
    pub fn decode_ciphertext(&self) -> Option<EncryptedNumber> {
        match self {
            Transaction::Vote { ciphertext, .. } => {
                EncryptedNumber::from_decimal_str(ciphertext).ok()
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_vote() {
        let tx = Transaction::parse("vote:alice:12345");
        assert_eq!(
            tx,
            Transaction::Vote {
                uid: "alice".to_string(),
                ciphertext: "12345".to_string(),
            }
        );
    }

    #[test]
    fn parses_a_result_with_colons_in_payload() {
        let tx = Transaction::parse("result:Total Votes: 4, Sum: 3");
        assert_eq!(
            tx,
            Transaction::Result {
                payload: "Total Votes: 4, Sum: 3".to_string(),
            }
        );
    }

    #[test]
    fn rejects_vote_with_empty_uid() {
        let tx = Transaction::parse("vote::12345");
        assert!(matches!(tx, Transaction::VoteMalformed(_)));
    }

    #[test]
    fn rejects_vote_missing_ciphertext() {
        let tx = Transaction::parse("vote:alice");
        assert!(matches!(tx, Transaction::VoteMalformed(_)));
    }

    #[test]
    fn uid_may_not_contain_a_colon_so_ciphertext_may() {
        // splitn(2, ':') means everything after the first colon, including
        // further colons, belongs to the ciphertext field.
        let tx = Transaction::parse("vote:alice:123:456");
        assert_eq!(
            tx,
            Transaction::Vote {
                uid: "alice".to_string(),
                ciphertext: "123:456".to_string(),
            }
        );
    }

    #[test]
    fn unrecognized_prefix_is_unknown() {
        let tx = Transaction::parse("frobnicate:whatever");
        assert!(matches!(tx, Transaction::Unknown(_)));
    }
}
