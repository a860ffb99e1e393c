use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use url::Url;

static PROVIDER_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:https?://)?(?:www\.)?lichess\.org(?:[/?#]|$)")
        .expect("provider pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmbedError {
    #[error("Lichess blocks full tournament pages. Use Lichess TV or a specific game link instead.")]
    Unembeddable { url: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Scripts,
    SameOrigin,
}

impl Capability {
    pub fn token(self) -> &'static str {
        match self {
            Capability::Scripts => "allow-scripts",
            Capability::SameOrigin => "allow-same-origin",
        }
    }
}

/// Capabilities granted to the embedding frame. Top-level navigation is never granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sandbox(&'static [Capability]);

pub const EMBED_SANDBOX: Sandbox = Sandbox(&[Capability::Scripts, Capability::SameOrigin]);

impl fmt::Display for Sandbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<&str> = self.0.iter().map(|c| c.token()).collect();
        f.write_str(&tokens.join(" "))
    }
}

/// The URL handed to the viewer together with its sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedTarget {
    pub url: String,
    pub sandbox: Sandbox,
}

impl EmbedTarget {
    fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            sandbox: EMBED_SANDBOX,
        }
    }

    pub fn iframe_html(&self, title: &str) -> String {
        format!(
            r#"<iframe src="{}" title="{}" allowfullscreen sandbox="{}"></iframe>"#,
            escape_attr(&self.url),
            escape_attr(title),
            self.sandbox
        )
    }
}

/// Turns a saved feed URL into something the viewer can embed.
///
/// Lichess game links are rewritten to their `/embed/` form, tournament pages
/// are refused, and every other URL is passed through untouched.
pub fn normalize(raw: &str) -> Result<EmbedTarget, EmbedError> {
    if !PROVIDER_URL.is_match(raw) {
        return Ok(EmbedTarget::new(raw));
    }

    // Links pasted without a scheme keep that shape after rewriting
    let implied_scheme = if raw.contains("://") { "" } else { "https://" };
    let Ok(mut parsed) = Url::parse(&format!("{implied_scheme}{raw}")) else {
        return Ok(EmbedTarget::new(raw));
    };

    let (tournament, embeddable) = {
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        let tournament = segments.iter().any(|s| s.eq_ignore_ascii_case("tournament"));
        let embeddable = match segments.first() {
            None => true,
            Some(first) => {
                first.eq_ignore_ascii_case("embed") || segments.iter().any(|s| s.contains("frame"))
            }
        };
        (tournament, embeddable)
    };

    if tournament {
        tracing::warn!("Refusing to embed tournament page {}", raw);
        return Err(EmbedError::Unembeddable {
            url: raw.to_string(),
        });
    }

    if embeddable {
        return Ok(EmbedTarget::new(raw));
    }

    let path = format!("/embed{}", parsed.path());
    parsed.set_path(&path);
    tracing::debug!("Rewrote {} to {}", raw, parsed);

    let rewritten = parsed.to_string();
    let rewritten = rewritten
        .strip_prefix(implied_scheme)
        .unwrap_or(&rewritten)
        .to_string();
    Ok(EmbedTarget::new(rewritten))
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_game_links_to_embed_form() {
        let target = normalize("https://lichess.org/abcd1234").unwrap();
        assert_eq!(target.url, "https://lichess.org/embed/abcd1234");
    }

    #[test]
    fn keeps_query_and_fragment_when_rewriting() {
        let target = normalize("https://lichess.org/abcd1234/black?theme=brown#12").unwrap();
        assert_eq!(
            target.url,
            "https://lichess.org/embed/abcd1234/black?theme=brown#12"
        );
    }

    #[test]
    fn rejects_tournament_pages() {
        let err = normalize("https://lichess.org/tournament/arena123").unwrap_err();
        assert_eq!(
            err,
            EmbedError::Unembeddable {
                url: "https://lichess.org/tournament/arena123".to_string()
            }
        );
        assert!(err.to_string().contains("tournament"));
    }

    #[test]
    fn rejects_tournament_segments_anywhere_with_or_without_scheme() {
        for url in [
            "www.lichess.org/tournament/arena123",
            "lichess.org/tournament/arena123",
            "https://lichess.org/api/tournament/x",
            "https://lichess.org/broadcast/r1/tournament/x",
            "http://www.lichess.org/Tournament/arena123?page=2",
        ] {
            assert!(
                matches!(normalize(url), Err(EmbedError::Unembeddable { .. })),
                "{url} should be refused"
            );
        }
    }

    #[test]
    fn rewrites_game_links_without_scheme() {
        for (url, expected) in [
            ("lichess.org/abcd1234", "lichess.org/embed/abcd1234"),
            ("www.lichess.org/abcd1234", "www.lichess.org/embed/abcd1234"),
            ("lichess.org/embed/abcd1234", "lichess.org/embed/abcd1234"),
            ("lichess.org", "lichess.org"),
        ] {
            assert_eq!(normalize(url).unwrap().url, expected);
        }
    }

    #[test]
    fn passes_through_embed_and_frame_links() {
        for url in [
            "https://lichess.org/embed/abcd1234",
            "https://lichess.org/tv/frame",
            "https://www.lichess.org/embed/game/xyz",
        ] {
            assert_eq!(normalize(url).unwrap().url, url);
        }
    }

    #[test]
    fn passes_through_other_hosts_untouched() {
        for url in [
            "https://example.com/stream",
            "https://example.com",
            "https://notlichess.org/abcd1234",
            "https://lichess.org.evil.test/abcd1234",
            "https://lichess.org",
            "not a url at all",
        ] {
            assert_eq!(normalize(url).unwrap().url, url);
        }
    }

    #[test]
    fn sandbox_never_grants_navigation() {
        let target = normalize("https://example.com/stream").unwrap();
        assert_eq!(target.sandbox.to_string(), "allow-scripts allow-same-origin");
        assert_eq!(target.sandbox, EMBED_SANDBOX);
        assert!(!target.sandbox.to_string().contains("top-navigation"));
    }

    #[test]
    fn iframe_markup_escapes_attributes() {
        let target = normalize("https://example.com/stream?a=1&b=2").unwrap();
        let html = target.iframe_html("Rook \"Lift\"");
        assert_eq!(
            html,
            r#"<iframe src="https://example.com/stream?a=1&amp;b=2" title="Rook &quot;Lift&quot;" allowfullscreen sandbox="allow-scripts allow-same-origin"></iframe>"#
        );
    }
}
