use chrono::Utc;
use rand::Rng;

use super::domain::AdmitId;

const ADMIT_TAG: &str = "AZM";
const SUFFIX_LEN: usize = 4;
const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Mint an admission identifier of the form `AZM-<unixMillis>-<SSSS>` where
/// `SSSS` is four random base36 uppercase characters.
///
/// Uniqueness is probabilistic only. The store's unique index on the admit
/// id is the sole collision guard; a collision surfaces as a duplicate-key
/// error on insert and the caller re-registers with a fresh id. No retry
/// loop lives here or anywhere else.
pub fn generate_admit_id() -> AdmitId {
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();

    AdmitId(format!(
        "{ADMIT_TAG}-{}-{suffix}",
        Utc::now().timestamp_millis()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admit_id_has_tag_timestamp_and_suffix() {
        let id = generate_admit_id();
        let parts: Vec<&str> = id.as_str().split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "AZM");
        assert!(!parts[1].is_empty());
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn consecutive_ids_differ() {
        let ids: Vec<String> = (0..32).map(|_| generate_admit_id().0).collect();
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len(), "suffix entropy should not repeat in a short run");
    }
}
