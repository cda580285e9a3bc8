use std::sync::Arc;

use crate::foundation::error::{TraitforgeError, TraitforgeResult};

/// Fixed stacking order of layer names, bottom first. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalOrder {
    names: Arc<[String]>,
}

impl CanonicalOrder {
    /// Built-in table.
    pub const BUILTIN: [&'static str; 7] =
        ["background", "body", "pattern", "swirl", "eyes", "teeth", "top"];

    /// Build from names; they must be non-empty and unique.
    pub fn new<I, S>(names: I) -> TraitforgeResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        for (i, n) in names.iter().enumerate() {
            if n.trim().is_empty() {
                return Err(TraitforgeError::validation(
                    "canonical order names must be non-empty",
                ));
            }
            if names[..i].contains(n) {
                return Err(TraitforgeError::validation(format!(
                    "canonical order lists '{n}' twice"
                )));
            }
        }
        Ok(Self {
            names: names.into(),
        })
    }

    /// Names bottom to top.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Stacking rank of `name`, if known.
    pub fn rank(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Split `requested` into known names (deduplicated, in canonical order) and unknown names
    /// (in request order).
    pub fn filter<'a, I>(&self, requested: I) -> (Vec<String>, Vec<String>)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut known: Vec<usize> = Vec::new();
        let mut unknown: Vec<String> = Vec::new();
        for name in requested {
            match self.rank(name) {
                Some(r) => known.push(r),
                None => {
                    if !unknown.iter().any(|u| u == name) {
                        unknown.push(name.to_owned());
                    }
                }
            }
        }
        known.sort_unstable();
        known.dedup();
        (
            known.into_iter().map(|r| self.names[r].clone()).collect(),
            unknown,
        )
    }
}

impl Default for CanonicalOrder {
    fn default() -> Self {
        Self {
            names: Self::BUILTIN.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/order.rs"]
mod tests;
