//! Row-level read filtering.
//!
//! A row is readable when its `check_access_read` is NULL or equals one of the
//! caller's roles (the single role `Guest` for anonymous callers). Superusers
//! and the batch context read everything.

use crate::behavior::caller::{CallerContext, GUEST_ROLE};
use crate::behavior::criteria::{CONTENT_ALIAS, Join};
use crate::behavior::schema::Addressing;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadPredicate {
    /// Admit every row; no join is added.
    Unrestricted,
    Restricted {
        joins: Vec<Join>,
        alias: String,
        roles: Vec<String>,
    },
}

impl ReadPredicate {
    /// Evaluates the predicate against a row's `check_access_read`.
    pub fn admits(&self, check_access_read: Option<&str>) -> bool {
        match (self, check_access_read) {
            (ReadPredicate::Unrestricted, _) => true,
            (ReadPredicate::Restricted { .. }, None) => true,
            (ReadPredicate::Restricted { roles, .. }, Some(required)) => {
                roles.iter().any(|role| role == required)
            }
        }
    }
}

pub fn build_read_predicate(caller: &CallerContext, addressing: &Addressing) -> ReadPredicate {
    if caller.is_superuser() || caller.is_batch() {
        return ReadPredicate::Unrestricted;
    }

    let (joins, alias) = if addressing.is_self() {
        (Vec::new(), CONTENT_ALIAS.to_string())
    } else {
        (addressing.joins(), addressing.metadata_alias().to_string())
    };

    let roles = if caller.is_authenticated() {
        caller.roles().to_vec()
    } else {
        vec![GUEST_ROLE.to_string()]
    };

    ReadPredicate::Restricted {
        joins,
        alias,
        roles,
    }
}
