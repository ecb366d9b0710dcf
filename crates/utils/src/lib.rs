use rand::Rng;

/// Creates a random alphanumeric secret of the given length.
/// Used for correlation ids on background job runs and generated
/// fallback credentials.
pub fn create_random_secret(secret_len: usize) -> String {
    let rng = rand::thread_rng();
    rng.sample_iter(rand::distributions::Alphanumeric)
        .take(secret_len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_secret_of_given_length() {
        for len in &[0, 1, 8, 32] {
            let secret = create_random_secret(*len);
            assert_eq!(secret.len(), *len);
            assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn generates_different_secrets() {
        assert_ne!(create_random_secret(16), create_random_secret(16));
    }
}
