pub mod agent;
pub mod jsonblock;
pub mod pipeline;
pub mod tooling;
pub mod transcript;

/// Outcome of a best-effort extraction. `Missing` carries the reason the
/// value was absent so callers can tell "nothing there" apart from "there
/// but unusable" without consulting the logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted<T, R> {
    Found(T),
    Missing(R),
}

impl<T, R> Extracted<T, R> {
    pub fn is_found(&self) -> bool {
        matches!(self, Extracted::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Extracted::Found(value) => Some(value),
            Extracted::Missing(_) => None,
        }
    }

    pub fn as_found(&self) -> Option<&T> {
        match self {
            Extracted::Found(value) => Some(value),
            Extracted::Missing(_) => None,
        }
    }
}
