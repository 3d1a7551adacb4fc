//! SSH private key auto-detection.

use std::path::{Path, PathBuf};

/// Conventional key locations, tried in order.
pub const DEFAULT_KEY_CANDIDATES: &[&str] = &[
    "~/.ssh/id_rsa",
    "~/.ssh/id_ed25519",
    "~/.ssh/aws-key-2025",
    "~/.ssh/id_ecdsa",
];

/// Expand a leading `~` to the current user's home directory.
///
/// Paths without a leading `~`, or when no home directory is known, are
/// returned unchanged.
pub fn expand_home(raw: &str) -> PathBuf {
    let home = match dirs::home_dir() {
        Some(home) => home,
        None => return PathBuf::from(raw),
    };

    if raw == "~" {
        home
    } else if let Some(rest) = raw.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(raw)
    }
}

/// Return the first candidate for which `exists` holds.
pub fn detect_key<P, F>(candidates: &[P], exists: F) -> Option<PathBuf>
where
    P: AsRef<Path>,
    F: Fn(&Path) -> bool,
{
    candidates
        .iter()
        .map(|candidate| candidate.as_ref())
        .find(|candidate| exists(candidate))
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn fake_fs(present: &[&str]) -> impl Fn(&Path) -> bool {
        let present: HashSet<PathBuf> = present.iter().map(|p| PathBuf::from(*p)).collect();
        move |path: &Path| present.contains(path)
    }

    mod detection {
        use super::*;

        #[test]
        fn test_picks_first_existing_candidate() {
            let candidates = ["/k/id_rsa", "/k/id_ed25519", "/k/id_ecdsa"];
            let exists = fake_fs(&["/k/id_ed25519", "/k/id_ecdsa"]);
            assert_eq!(
                detect_key(&candidates, exists),
                Some(PathBuf::from("/k/id_ed25519"))
            );
        }

        #[test]
        fn test_candidate_order_wins_over_fs_order() {
            let candidates = ["/k/id_ecdsa", "/k/id_rsa"];
            let exists = fake_fs(&["/k/id_rsa", "/k/id_ecdsa"]);
            assert_eq!(
                detect_key(&candidates, exists),
                Some(PathBuf::from("/k/id_ecdsa"))
            );
        }

        #[test]
        fn test_none_when_nothing_exists() {
            let candidates = ["/k/id_rsa", "/k/id_ed25519"];
            assert_eq!(detect_key(&candidates, fake_fs(&[])), None);
        }

        #[test]
        fn test_empty_candidate_list() {
            let candidates: [&str; 0] = [];
            assert_eq!(detect_key(&candidates, |_| true), None);
        }

        #[test]
        fn test_real_filesystem() {
            let dir = tempfile::tempdir().unwrap();
            let present = dir.path().join("id_ed25519");
            std::fs::write(&present, "key").unwrap();
            let candidates = [dir.path().join("id_rsa"), present.clone()];

            assert_eq!(detect_key(&candidates, Path::exists), Some(present));
        }
    }

    mod home_expansion {
        use super::*;

        #[test]
        fn test_absolute_path_unchanged() {
            assert_eq!(expand_home("/keys/aws.pem"), PathBuf::from("/keys/aws.pem"));
        }

        #[test]
        fn test_relative_path_unchanged() {
            assert_eq!(expand_home("keys/aws.pem"), PathBuf::from("keys/aws.pem"));
        }

        #[test]
        fn test_tilde_prefix_expands() {
            if let Some(home) = dirs::home_dir() {
                assert_eq!(expand_home("~/.ssh/id_rsa"), home.join(".ssh/id_rsa"));
                assert_eq!(expand_home("~"), home);
            }
        }

        #[test]
        fn test_tilde_user_form_unchanged() {
            assert_eq!(expand_home("~other/key"), PathBuf::from("~other/key"));
        }
    }
}
