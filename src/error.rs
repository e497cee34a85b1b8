use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The result of an operation that is recovered at its boundary rather than propagated.
pub type Outcome<T> = std::result::Result<T, Failure>;

/// Which user-facing operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The list of expenses could not be fetched.
    Load,
    /// The remote service did not create the expense.
    Create,
    /// The remote service did not update the expense.
    Update,
    /// The remote service did not delete the expense.
    Delete,
    /// The input was rejected before any request was sent.
    Validation,
    /// There is no record, or no open form, to edit.
    Edit,
}

serde_plain::derive_display_from_serialize!(FailureKind);
serde_plain::derive_fromstr_from_deserialize!(FailureKind);

impl FailureKind {
    /// A short phrase describing the failed action, e.g. "Could not load expenses".
    pub fn headline(&self) -> &'static str {
        match self {
            FailureKind::Load => "Could not load expenses",
            FailureKind::Create => "Could not add the expense",
            FailureKind::Update => "Could not save changes to the expense",
            FailureKind::Delete => "Could not delete the expense",
            FailureKind::Validation => "Invalid input",
            FailureKind::Edit => "Nothing to edit",
        }
    }
}

/// A failed operation: what failed, and why.
pub struct Failure {
    kind: FailureKind,
    source: Error,
}

impl Failure {
    pub fn new(kind: FailureKind, source: impl Into<Error>) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }

    pub fn msg(kind: FailureKind, message: impl Display + Debug + Send + Sync + 'static) -> Self {
        Self::new(kind, anyhow::anyhow!(message))
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }
}

impl Debug for Failure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Failure({:?}, {:?})", self.kind, self.source)
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:#}", self.kind.headline(), self.source)
    }
}

impl StdError for Failure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.source)
    }
}

/// Converts an `anyhow` result into an `Outcome` tagged with the operation that failed.
pub trait IntoOutcome<T> {
    fn or_fail(self, kind: FailureKind) -> Outcome<T>;
}

impl<T, E> IntoOutcome<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn or_fail(self, kind: FailureKind) -> Outcome<T> {
        self.map_err(|e| Failure::new(kind, e))
    }
}
