use std::future::Future;

use crate::codes;
use crate::error::{AppError, AppResult};

pub const SLUG_SUFFIX_LENGTH: usize = 4;
pub const MAX_SLUG_ATTEMPTS: usize = 10;

/// Derive a URL slug from a display name: lowercase the alphanumeric runs and
/// join them with single hyphens. Input with no usable characters falls back
/// to `"item"` so the column never ends up empty.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_gap = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_gap && !slug.is_empty() {
                slug.push('-');
            }
            pending_gap = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_gap = true;
        }
    }
    if slug.is_empty() {
        "item".to_string()
    } else {
        slug
    }
}

fn random_suffix() -> String {
    codes::random_fragment(SLUG_SUFFIX_LENGTH).to_ascii_lowercase()
}

/// [`slugify`] with a uniqueness guarantee: when the base slug is taken, retry
/// with random `-xxxx` suffixes until `exists` clears a candidate or the
/// attempt cap runs out.
pub async fn unique_slug<F, Fut>(name: &str, mut exists: F) -> AppResult<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = AppResult<bool>>,
{
    let base = slugify(name);
    if !exists(base.clone()).await? {
        return Ok(base);
    }
    for _ in 1..MAX_SLUG_ATTEMPTS {
        let candidate = format!("{}-{}", base, random_suffix());
        if !exists(candidate.clone()).await? {
            return Ok(candidate);
        }
    }
    Err(AppError::GenerationExhausted)
}
