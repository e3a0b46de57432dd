use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;

pub const MEMORY_ID_PREFIX: &str = "mem_";
pub const MEMORY_ID_TOKEN_LEN: usize = 12;

/// Generates a fresh record identifier: `mem_` followed by 12 alphanumeric
/// characters drawn from the operating system's CSPRNG.
pub fn generate_memory_id() -> String {
    let token: String = OsRng
        .sample_iter(&Alphanumeric)
        .take(MEMORY_ID_TOKEN_LEN)
        .map(char::from)
        .collect();
    format!("{MEMORY_ID_PREFIX}{token}")
}

/// Reports whether `candidate` has the shape produced by [`generate_memory_id`].
pub fn is_memory_id(candidate: &str) -> bool {
    candidate
        .strip_prefix(MEMORY_ID_PREFIX)
        .is_some_and(|token| {
            token.len() == MEMORY_ID_TOKEN_LEN && token.chars().all(|c| c.is_ascii_alphanumeric())
        })
}
