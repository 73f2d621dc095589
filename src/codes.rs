use std::future::Future;

use password_hash::rand_core::{OsRng, RngCore};

use crate::error::{AppError, AppResult};

/// Uppercase letters plus digits 1-9; zero is excluded because it reads like
/// the letter O in printed references.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ123456789";
pub const CODE_LENGTH: usize = 12;
pub const MAX_CODE_ATTEMPTS: usize = 10;

/// Uniform random string over [`CODE_ALPHABET`], drawn from the OS CSPRNG.
pub fn random_fragment(len: usize) -> String {
    // Rejection sampling: bytes at or above the largest multiple of the
    // alphabet size would skew the modulo, so they are discarded.
    let limit = u8::MAX - u8::MAX % CODE_ALPHABET.len() as u8;
    let mut out = String::with_capacity(len);
    let mut buf = [0u8; 32];
    while out.len() < len {
        OsRng.fill_bytes(&mut buf);
        for byte in buf {
            if byte < limit && out.len() < len {
                out.push(CODE_ALPHABET[(byte % CODE_ALPHABET.len() as u8) as usize] as char);
            }
        }
    }
    out
}

/// One candidate order reference.
pub fn draw_code() -> String {
    random_fragment(CODE_LENGTH)
}

/// Draw reference codes until `exists` reports the candidate free, giving up
/// after [`MAX_CODE_ATTEMPTS`] collisions rather than looping forever.
pub async fn generate_unique_code<F, Fut>(mut exists: F) -> AppResult<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = AppResult<bool>>,
{
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = draw_code();
        if !exists(code.clone()).await? {
            return Ok(code);
        }
    }
    Err(AppError::GenerationExhausted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabet_has_no_ambiguous_zero() {
        assert_eq!(CODE_ALPHABET.len(), 35);
        assert!(!CODE_ALPHABET.contains(&b'0'));
    }

    #[test]
    fn draw_code_stays_inside_the_alphabet() {
        for _ in 0..100 {
            let code = draw_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        }
    }

    #[tokio::test]
    async fn skips_colliding_draws() {
        let calls = std::cell::Cell::new(0usize);
        let code = generate_unique_code(|_| {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move { Ok::<bool, AppError>(n <= 3) }
        })
        .await
        .expect("a free code after three collisions");
        assert_eq!(calls.get(), 4);
        assert_eq!(code.len(), CODE_LENGTH);
    }

    #[tokio::test]
    async fn gives_up_after_the_attempt_cap() {
        let calls = std::cell::Cell::new(0usize);
        let err = generate_unique_code(|_| {
            calls.set(calls.get() + 1);
            async move { Ok::<bool, AppError>(true) }
        })
        .await
        .expect_err("every draw collides");
        assert!(matches!(err, AppError::GenerationExhausted));
        assert_eq!(calls.get(), MAX_CODE_ATTEMPTS);
    }

    #[tokio::test]
    async fn lookup_failures_propagate() {
        let err = generate_unique_code(|_| async move {
            Err(AppError::BadRequest("lookup failed".into()))
        })
        .await
        .expect_err("lookup error is terminal");
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
