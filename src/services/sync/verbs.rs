// Maps the abstract operation vocabulary onto concrete wire verbs.

use crate::models::{Depth, Operation, Resource, ResourceKind};

/// Concrete wire verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Propfind,
    Proppatch,
    Mkcol,
    Put,
    Post,
    Delete,
}

impl Verb {
    pub fn method(self) -> &'static str {
        match self {
            Verb::Propfind => "PROPFIND",
            Verb::Proppatch => "PROPPATCH",
            Verb::Mkcol => "MKCOL",
            Verb::Put => "PUT",
            Verb::Post => "POST",
            Verb::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.method())
    }
}

/// Physical request plan for one abstract operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPlan {
    Single(Verb),
    /// Container-like resources cannot be created and have their properties
    /// set atomically: MKCOL first, then PROPPATCH, with the second leg only
    /// issued if the first succeeded.
    ContainerUpdate,
}

/// Resolves the verb(s) for an operation against a resource. This is the
/// single place where resource kind influences verb choice.
pub fn plan(operation: Operation, resource: &Resource) -> RequestPlan {
    match operation {
        Operation::Create => RequestPlan::Single(Verb::Post),
        Operation::Read => RequestPlan::Single(Verb::Propfind),
        Operation::Update => match resource.kind {
            ResourceKind::Container => RequestPlan::ContainerUpdate,
            ResourceKind::ReplaceOnly => RequestPlan::Single(Verb::Put),
            ResourceKind::Plain => RequestPlan::Single(Verb::Proppatch),
        },
        // Replacement semantics apply to full updates only; a patch is always
        // a property patch.
        Operation::Patch => RequestPlan::Single(Verb::Proppatch),
        Operation::Delete => RequestPlan::Single(Verb::Delete),
    }
}

/// Default read depth: collections list their immediate children, single
/// records only themselves.
pub fn default_read_depth(resource: &Resource) -> Depth {
    if resource.is_collection {
        Depth::One
    } else {
        Depth::Zero
    }
}
