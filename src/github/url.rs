//! Repository URL parsing.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::RepoId;

use super::GithubError;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.\-]+$").expect("valid regex"));

/// Parse `https://github.com/owner/repo` (and common variants) into a [`RepoId`].
///
/// Accepts a missing scheme, `www.`, a trailing slash, a `.git` suffix,
/// and extra path segments such as `/tree/main`.
pub fn parse_repo_url(input: &str) -> Result<RepoId, GithubError> {
    let invalid = || GithubError::InvalidUrl(input.trim().to_string());

    let mut rest = input.trim().trim_end_matches('/');
    rest = rest.strip_suffix(".git").unwrap_or(rest);
    for scheme in ["https://", "http://"] {
        if let Some(stripped) = rest.strip_prefix(scheme) {
            rest = stripped;
            break;
        }
    }
    rest = rest.strip_prefix("www.").unwrap_or(rest);

    let path = rest.strip_prefix("github.com/").ok_or_else(invalid)?;
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let (Some(owner), Some(repo)) = (segments.next(), segments.next()) else {
        return Err(invalid());
    };

    if !NAME_RE.is_match(owner) || !NAME_RE.is_match(repo) {
        return Err(invalid());
    }
    Ok(RepoId::new(owner, repo))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_forms() {
        for url in [
            "https://github.com/psf/requests",
            "http://github.com/psf/requests",
            "https://www.github.com/psf/requests",
            "github.com/psf/requests",
            "https://github.com/psf/requests/",
            "https://github.com/psf/requests.git",
            "  https://github.com/psf/requests  ",
            "https://github.com/psf/requests/tree/main/src",
        ] {
            assert_eq!(
                parse_repo_url(url).unwrap(),
                RepoId::new("psf", "requests"),
                "{url}"
            );
        }
    }

    #[test]
    fn keeps_dots_and_dashes() {
        let id = parse_repo_url("https://github.com/my-org/repo.name_2").unwrap();
        assert_eq!(id.to_string(), "my-org/repo.name_2");
    }

    #[test]
    fn rejects_bad_input() {
        for url in [
            "",
            "https://gitlab.com/a/b",
            "https://github.com/onlyowner",
            "https://github.com/",
            "https://github.com/own er/repo",
            "not a url",
        ] {
            assert!(
                matches!(parse_repo_url(url), Err(GithubError::InvalidUrl(_))),
                "{url}"
            );
        }
    }
}
