/// Season/episode extraction from file names
use regex::Regex;

/// Extracts `(season, episode)` pairs from media file names.
///
/// Patterns are tried in a fixed priority order, first match wins. The
/// combined patterns outrank the season-only fallback because combined
/// tokens are less ambiguous.
pub struct SeasonEpisodeParser {
    /// Two-capture patterns: S01E02, 1x02, Season 1 Episode 2.
    combined: Vec<Regex>,
    /// Bare episode token; season defaults to 1.
    episode_only: Regex,
    /// Season token used by the fallback.
    season_only: Regex,
}

impl SeasonEpisodeParser {
    pub fn new() -> Self {
        let combined = vec![
            Regex::new(r"(?i)s(\d+)e(\d+)").unwrap(),
            Regex::new(r"(\d+)[xX](\d+)").unwrap(),
            Regex::new(r"(?i)season\s*(\d+)\s*episode\s*(\d+)").unwrap(),
        ];

        Self {
            combined,
            episode_only: Regex::new(r"(?i)ep(?:isode)?\s*(\d+)").unwrap(),
            season_only: Regex::new(r"(?i)season\s*(\d+)").unwrap(),
        }
    }

    /// Parse a file name. Returns both numbers or neither.
    pub fn parse(&self, name: &str) -> Option<(u32, u32)> {
        for pattern in &self.combined {
            if let Some(caps) = pattern.captures(name) {
                let season = caps.get(1).and_then(|m| m.as_str().parse().ok());
                let episode = caps.get(2).and_then(|m| m.as_str().parse().ok());
                if let (Some(season), Some(episode)) = (season, episode) {
                    return Some((season, episode));
                }
            }
        }

        // Bare episode number, assume season 1
        if let Some(caps) = self.episode_only.captures(name) {
            if let Some(episode) = caps.get(1).and_then(|m| m.as_str().parse().ok()) {
                return Some((1, episode));
            }
        }

        // Fallback: a season token plus an independent episode token
        if let Some(caps) = self.season_only.captures(name) {
            if let Some(season) = caps.get(1).and_then(|m| m.as_str().parse().ok()) {
                if let Some(ep_caps) = self.episode_only.captures(name) {
                    if let Some(episode) = ep_caps.get(1).and_then(|m| m.as_str().parse().ok()) {
                        return Some((season, episode));
                    }
                }
            }
        }

        None
    }
}

impl Default for SeasonEpisodeParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sxxeyy_pattern() {
        let parser = SeasonEpisodeParser::new();
        assert_eq!(parser.parse("Show.S01E02.1080p.mkv"), Some((1, 2)));
        assert_eq!(parser.parse("show.s3e12.mkv"), Some((3, 12)));
        assert_eq!(parser.parse("SHOW S10E05"), Some((10, 5)));
    }

    #[test]
    fn test_leading_zeros_ignored() {
        let parser = SeasonEpisodeParser::new();
        assert_eq!(parser.parse("Show.S001E007.mkv"), Some((1, 7)));
    }

    #[test]
    fn test_nxm_pattern() {
        let parser = SeasonEpisodeParser::new();
        assert_eq!(parser.parse("Show 1x02.avi"), Some((1, 2)));
        assert_eq!(parser.parse("show.4X13.mp4"), Some((4, 13)));
    }

    #[test]
    fn test_season_episode_words() {
        let parser = SeasonEpisodeParser::new();
        assert_eq!(parser.parse("Show Season 2 Episode 9.mkv"), Some((2, 9)));
    }

    #[test]
    fn test_bare_episode_defaults_to_season_one() {
        let parser = SeasonEpisodeParser::new();
        assert_eq!(parser.parse("Show Episode 7.mkv"), Some((1, 7)));
        assert_eq!(parser.parse("Show Ep 3.mkv"), Some((1, 3)));
    }

    #[test]
    fn test_episode_token_outranks_season_fallback() {
        let parser = SeasonEpisodeParser::new();
        // The bare-episode pattern fires before the season-only fallback,
        // so a detached season token does not override the default
        assert_eq!(parser.parse("Season 3 - Episode 11.mkv"), Some((1, 11)));
    }

    #[test]
    fn test_combined_patterns_outrank_fallback() {
        let parser = SeasonEpisodeParser::new();
        // S05E01 must win over the surrounding "Season 1" text
        assert_eq!(parser.parse("Season 1 pack S05E01.mkv"), Some((5, 1)));
    }

    #[test]
    fn test_unrecognizable_names() {
        let parser = SeasonEpisodeParser::new();
        assert_eq!(parser.parse("Inception.2010.1080p.mkv"), None);
        assert_eq!(parser.parse("Some Movie (2009).avi"), None);
        assert_eq!(parser.parse(""), None);
    }
}
