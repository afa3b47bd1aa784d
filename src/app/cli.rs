use clap::Parser;

/// musebar - a terminal control strip for Spotify and Apple Music
#[derive(Parser, Debug)]
#[command(name = "musebar", version, about)]
pub struct Args {
    /// Player to show first (music or spotify)
    #[arg(long, value_parser = parse_player)]
    pub player: Option<crate::player::PlayerId>,

    /// Generate default config.toml to stdout
    #[arg(long)]
    pub generate_config: bool,

    /// Handle a muse:// callback URL (Spotify authorisation) and exit
    #[arg(long, value_name = "URL")]
    pub open_url: Option<String>,
}

fn parse_player(s: &str) -> Result<crate::player::PlayerId, String> {
    use crate::player::PlayerId;

    match s.to_ascii_lowercase().as_str() {
        "music" => Ok(PlayerId::Music),
        "spotify" => Ok(PlayerId::Spotify),
        other => Err(format!("unknown player '{other}', expected music or spotify")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerId;

    #[test]
    fn test_parse_args() {
        let args = Args::parse_from(["musebar", "--player", "Spotify"]);
        assert_eq!(args.player, Some(PlayerId::Spotify));
        assert!(!args.generate_config);

        let args = Args::parse_from(["musebar", "--open-url", "muse://callback?code=x"]);
        assert_eq!(args.open_url.as_deref(), Some("muse://callback?code=x"));

        assert!(Args::try_parse_from(["musebar", "--player", "winamp"]).is_err());
    }
}
