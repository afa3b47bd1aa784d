use std::collections::HashMap;

use anyhow::{Context, Result};
use image::{DynamicImage, GenericImageView};
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ItunesResponse {
    results: Vec<ItunesResult>,
}

#[derive(Debug, Deserialize)]
struct ItunesResult {
    #[serde(rename = "artworkUrl100")]
    artwork_url: String,
    #[serde(rename = "collectionName")]
    collection_name: Option<String>,
    #[serde(rename = "artistName")]
    artist_name: Option<String>,
}

pub type Rgb = (u8, u8, u8);

/// `NSColor.lightGray`
const LIGHT_GRAY: Rgb = (170, 170, 170);
const PALETTE_SAMPLE_SIZE: u32 = 25;
/// Minimum channel distance between two palette colours
const MIN_CONTRAST: u32 = 96;

/// Where the artwork for a song comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtworkRequest {
    Url(String),
    /// Encoded image data straight from the player
    Bytes(Vec<u8>),
    /// Catalogue lookup for players that don't expose artwork
    Search { artist: String, album: String },
}

/// Colours picked from the artwork, already softened for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgb,
    pub primary: Rgb,
    pub secondary: Rgb,
}

pub struct ResolvedArtwork {
    pub image: DynamicImage,
    /// Remote location, when there is one
    pub url: Option<String>,
}

pub struct ArtworkRenderer {
    client: Client,
}

impl ArtworkRenderer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn resolve(&self, request: &ArtworkRequest) -> Result<ResolvedArtwork> {
        match request {
            ArtworkRequest::Url(url) => Ok(ResolvedArtwork {
                image: self.fetch_image(url).await?,
                url: Some(url.clone()),
            }),
            ArtworkRequest::Bytes(bytes) => Ok(ResolvedArtwork {
                image: decode(bytes)?,
                url: None,
            }),
            ArtworkRequest::Search { artist, album } => {
                let url = self.fetch_itunes_artwork(artist, album).await?;
                Ok(ResolvedArtwork {
                    image: self.fetch_image(&url).await?,
                    url: Some(url),
                })
            }
        }
    }

    pub async fn fetch_image(&self, url: &str) -> Result<DynamicImage> {
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        decode(&bytes).with_context(|| format!("artwork at {url}"))
    }

    fn clean_string(s: &str) -> String {
        // Drop "(Deluxe)", "[Remastered]" and featured artists
        let s = s.to_lowercase();
        let s = s.split('(').next().unwrap_or("");
        let s = s.split('[').next().unwrap_or("");
        let s = s.split("feat").next().unwrap_or("");
        s.trim().to_string()
    }

    pub async fn fetch_itunes_artwork(&self, artist: &str, album: &str) -> Result<String> {
        let clean_artist = Self::clean_string(artist);
        let clean_album = Self::clean_string(album);
        let term = format!("{} {}", clean_artist, clean_album);

        // US storefront first, then IN for regional catalogues
        for country in ["US", "IN"] {
            let params = [
                ("term", term.as_str()),
                ("entity", "album"),
                ("limit", "5"),
                ("country", country),
            ];

            let resp = match self
                .client
                .get("https://itunes.apple.com/search")
                .query(&params)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    tracing::debug!(country, error = %e, "itunes search failed");
                    continue;
                }
            };

            let Ok(data) = resp.json::<ItunesResponse>().await else {
                continue;
            };

            if let Some(url) = Self::best_match(&data.results, &clean_artist, &clean_album) {
                return Ok(url);
            }
        }

        anyhow::bail!("no iTunes artwork for {artist} - {album}")
    }

    fn best_match(results: &[ItunesResult], artist: &str, album: &str) -> Option<String> {
        // Strict artist check first
        let candidates: Vec<&ItunesResult> = results
            .iter()
            .filter(|r| match &r.artist_name {
                Some(name) => {
                    let r_clean = Self::clean_string(name);
                    r_clean.contains(artist) || artist.contains(&r_clean)
                }
                None => true,
            })
            .collect();

        let album_match = candidates.iter().find(|r| {
            r.collection_name.as_deref().is_some_and(|name| {
                let r_clean = Self::clean_string(name);
                r_clean.contains(album) || album.contains(&r_clean)
            })
        });

        album_match
            .or(candidates.first())
            .map(|r| r.artwork_url.replace("100x100bb", "600x600bb"))
    }

    /// Half-block thumbnail `size` cells wide and `size / 2` lines tall.
    pub fn render_thumbnail(img: &DynamicImage, size: u32) -> Vec<ratatui::text::Line<'static>> {
        use ratatui::style::{Color, Style};
        use ratatui::text::{Line, Span};

        let size = size.max(2) & !1;
        let resized = img.resize_exact(size, size, image::imageops::FilterType::Triangle);

        (0..size)
            .step_by(2)
            .map(|y| {
                let spans: Vec<Span<'static>> = (0..size)
                    .map(|x| {
                        let top = resized.get_pixel(x, y);
                        let bottom = resized.get_pixel(x, y + 1);
                        let fg = Color::Rgb(top[0], top[1], top[2]);
                        let bg = Color::Rgb(bottom[0], bottom[1], bottom[2]);
                        Span::styled("▀", Style::default().fg(fg).bg(bg))
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).context("failed to decode artwork")
}

/// Picks background, primary and secondary colours from a small sample of
/// the image. The background is the dominant border colour, the others the
/// most frequent colours that stand out from it.
pub fn extract_palette(img: &DynamicImage) -> Palette {
    let sample = img
        .resize_exact(
            PALETTE_SAMPLE_SIZE,
            PALETTE_SAMPLE_SIZE,
            image::imageops::FilterType::Nearest,
        )
        .to_rgb8();
    let (w, h) = sample.dimensions();

    let mut edges: HashMap<Rgb, usize> = HashMap::new();
    let mut all: HashMap<Rgb, usize> = HashMap::new();
    for (x, y, p) in sample.enumerate_pixels() {
        let color = quantize((p[0], p[1], p[2]));
        *all.entry(color).or_default() += 1;
        if x == 0 || y == 0 || x == w - 1 || y == h - 1 {
            *edges.entry(color).or_default() += 1;
        }
    }

    let background = ranked(edges).first().copied().unwrap_or((0, 0, 0));
    let colors = ranked(all);

    let primary = colors
        .iter()
        .copied()
        .find(|&c| distance(c, background) > MIN_CONTRAST)
        .unwrap_or_else(|| contrasting(background));
    let secondary = colors
        .iter()
        .copied()
        .find(|&c| distance(c, background) > MIN_CONTRAST && distance(c, primary) > MIN_CONTRAST)
        .unwrap_or(primary);

    Palette {
        background: blend(background, LIGHT_GRAY, 0.5),
        primary: blend(primary, LIGHT_GRAY, 0.5),
        secondary: blend(secondary, LIGHT_GRAY, 0.5),
    }
}

/// Most frequent first; ties broken by colour so results are stable.
fn ranked(counts: HashMap<Rgb, usize>) -> Vec<Rgb> {
    let mut entries: Vec<(Rgb, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    entries.into_iter().map(|(c, _)| c).collect()
}

fn quantize((r, g, b): Rgb) -> Rgb {
    let q = |c: u8| (c / 16) * 16 + 8;
    (q(r), q(g), q(b))
}

fn distance(a: Rgb, b: Rgb) -> u32 {
    a.0.abs_diff(b.0) as u32 + a.1.abs_diff(b.1) as u32 + a.2.abs_diff(b.2) as u32
}

fn contrasting((r, g, b): Rgb) -> Rgb {
    let luma = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
    if luma > 128.0 {
        (0, 0, 0)
    } else {
        (255, 255, 255)
    }
}

/// Mixes `fraction` of `other` into `color`.
pub fn blend(color: Rgb, other: Rgb, fraction: f64) -> Rgb {
    let mix = |a: u8, b: u8| (a as f64 * (1.0 - fraction) + b as f64 * fraction).round() as u8;
    (mix(color.0, other.0), mix(color.1, other.1), mix(color.2, other.2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb as Pixel};

    fn framed_square() -> DynamicImage {
        // White 50x50 canvas with a black 30x30 square in the middle
        let img = ImageBuffer::from_fn(50, 50, |x, y| {
            if (10..40).contains(&x) && (10..40).contains(&y) {
                Pixel([0u8, 0, 0])
            } else {
                Pixel([255u8, 255, 255])
            }
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_clean_string() {
        assert_eq!(
            ArtworkRenderer::clean_string("Abbey Road (Remastered)"),
            "abbey road"
        );
        assert_eq!(
            ArtworkRenderer::clean_string("Song [Live] feat. Someone"),
            "song"
        );
        assert_eq!(ArtworkRenderer::clean_string("Daft Punk feat. Pharrell"), "daft punk");
    }

    #[test]
    fn test_best_match_prefers_album() {
        let results = vec![
            ItunesResult {
                artwork_url: "https://a/100x100bb.jpg".into(),
                collection_name: Some("Greatest Hits".into()),
                artist_name: Some("Queen".into()),
            },
            ItunesResult {
                artwork_url: "https://b/100x100bb.jpg".into(),
                collection_name: Some("A Night at the Opera (Deluxe)".into()),
                artist_name: Some("Queen".into()),
            },
            ItunesResult {
                artwork_url: "https://c/100x100bb.jpg".into(),
                collection_name: Some("A Night at the Opera".into()),
                artist_name: Some("Tribute Band".into()),
            },
        ];

        assert_eq!(
            ArtworkRenderer::best_match(&results, "queen", "a night at the opera").as_deref(),
            Some("https://b/600x600bb.jpg")
        );
        assert_eq!(
            ArtworkRenderer::best_match(&results, "queen", "innuendo").as_deref(),
            Some("https://a/600x600bb.jpg")
        );
        assert!(ArtworkRenderer::best_match(&results, "abba", "arrival").is_none());
    }

    #[test]
    fn test_blend_with_light_gray() {
        assert_eq!(blend((0, 0, 0), LIGHT_GRAY, 0.5), (85, 85, 85));
        assert_eq!(blend((255, 255, 255), LIGHT_GRAY, 0.0), (255, 255, 255));
    }

    #[test]
    fn test_palette_from_framed_square() {
        let palette = extract_palette(&framed_square());

        // Quantised white 248 and black 8, each blended with 170
        assert_eq!(palette.background, (209, 209, 209));
        assert_eq!(palette.primary, (89, 89, 89));
        // Only two colours, so secondary falls back to primary
        assert_eq!(palette.secondary, palette.primary);
    }

    #[test]
    fn test_decode_png_bytes() {
        let mut bytes = std::io::Cursor::new(Vec::new());
        framed_square()
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();

        let img = decode(bytes.get_ref()).unwrap();
        assert_eq!(img.dimensions(), (50, 50));
        assert!(decode(b"not an image").is_err());
    }

    #[test]
    fn test_thumbnail_dimensions() {
        let lines = ArtworkRenderer::render_thumbnail(&framed_square(), 8);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].spans.len(), 8);
    }
}
