//! Helpers for picking ids that do not collide with existing ones

/// Name for a duplicate of `base`.
///
/// `foo` becomes `foo_copy1`; an existing copy suffix is bumped instead of
/// stacked, so `foo_copy1` becomes `foo_copy2` and a bare `foo_copy` becomes
/// `foo_copy1`. Returns `base` unchanged when it is not taken yet.
pub fn generate_copy_name<'a, I>(base: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    let taken = |candidate: &str| existing.clone().into_iter().any(|n| n == candidate);

    if !taken(base) {
        return base.to_string();
    }

    let (prefix, start) = match split_copy_suffix(base) {
        Some((prefix, Some(n))) => match n.checked_add(1) {
            Some(next) => (prefix, next),
            // Suffix already at the top of the range, stack a fresh one
            None => (base, 1),
        },
        Some((prefix, None)) => (prefix, 1),
        None => (base, 1),
    };

    first_free(prefix, "_copy", start, taken)
}

/// `name` if free, otherwise `name_1`, `name_2`, ...
pub fn ensure_unique_name<'a, I>(name: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    let taken = |candidate: &str| existing.clone().into_iter().any(|n| n == candidate);

    if !taken(name) {
        return name.to_string();
    }

    first_free(name, "_", 1, taken)
}

/// First `{prefix}{sep}{n}` not taken, counting up from `start`.
///
/// The counter never wraps: once it runs out the last candidate becomes the
/// new prefix and counting restarts at 1.
fn first_free(prefix: &str, sep: &str, start: u64, taken: impl Fn(&str) -> bool) -> String {
    let mut prefix = prefix.to_string();
    let mut n = start;
    loop {
        let candidate = format!("{}{}{}", prefix, sep, n);
        if !taken(&candidate) {
            return candidate;
        }
        match n.checked_add(1) {
            Some(next) => n = next,
            None => {
                prefix = candidate;
                n = 1;
            }
        }
    }
}

/// Split `foo_copy12` into `("foo", Some(12))` and `foo_copy` into `("foo", None)`
fn split_copy_suffix(name: &str) -> Option<(&str, Option<u64>)> {
    let idx = name.rfind("_copy")?;
    let digits = &name[idx + "_copy".len()..];
    if digits.is_empty() {
        return Some((&name[..idx], None));
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().map(|n| (&name[..idx], Some(n)))
}
