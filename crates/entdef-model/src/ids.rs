//! Shared uniqueness checks for id-keyed ordered collections

use entdef_core::{EntdefError, Result};

/// Append `item` unless another element already uses its id
pub(crate) fn push_unique<T>(items: &mut Vec<T>, item: T, id: fn(&T) -> &str) -> Result<()> {
    if items.iter().any(|existing| id(existing) == id(&item)) {
        return Err(EntdefError::DuplicateId(id(&item).to_string()));
    }
    items.push(item);
    Ok(())
}

/// First id that appears more than once, if any
pub fn first_duplicate<'a, I>(ids: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().find(|id| !seen.insert(*id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_duplicate() {
        assert_eq!(first_duplicate(["a", "b", "a"]), Some("a"));
        assert_eq!(first_duplicate(["a", "b"]), None);
    }
}
