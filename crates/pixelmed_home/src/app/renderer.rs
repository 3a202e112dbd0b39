use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{ImageError, ImageReader};
use nav_engine::{
    validate_sprite_key, BoundingBox, Dimensions, InteractionCoordinator, Position,
    SpriteKeyError, Visibility, Zone, ZoneEffect, ZoneHandler,
};
use pixels::{Error as PixelsError, Pixels, SurfaceTexture};
use thiserror::Error;
use tracing::warn;
use winit::window::Window;

const HOME_BACKGROUND_COLOR: [u8; 4] = [224, 247, 250, 255];
const AWAY_BACKGROUND_COLOR: [u8; 4] = [187, 222, 251, 255];
const NAVIGATE_ZONE_COLOR: [u8; 4] = [173, 216, 230, 255];
const INVOKE_ZONE_COLOR: [u8; 4] = [255, 182, 193, 255];
const ADMIN_ZONE_COLOR: [u8; 4] = [144, 238, 144, 255];
const ACTIVE_ZONE_OUTLINE_COLOR: [u8; 4] = [255, 210, 70, 255];
const AVATAR_COLOR: [u8; 4] = [70, 130, 180, 255];
const ACTIVE_OUTLINE_THICKNESS_PX: i32 = 3;

pub(crate) struct LoadedSprite {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

pub(crate) struct ZoneView<'a> {
    pub(crate) zone: &'a Zone,
    pub(crate) active: bool,
}

/// Everything one frame needs from the mounted engine.
pub(crate) struct HomeView<'a> {
    pub(crate) zones: Vec<ZoneView<'a>>,
    pub(crate) avatar: Option<BoundingBox>,
}

impl<'a> HomeView<'a> {
    pub(crate) fn from_engine<H: ZoneHandler>(engine: &'a InteractionCoordinator<H>) -> Self {
        let active_id = engine.occupancy().zone_id();
        Self {
            zones: engine
                .visible_zones()
                .map(|zone| ZoneView {
                    zone,
                    active: active_id == Some(zone.id.as_str()),
                })
                .collect(),
            avatar: Some(engine.avatar_bounds()),
        }
    }

    pub(crate) fn away() -> Self {
        Self {
            zones: Vec::new(),
            avatar: None,
        }
    }
}

pub(crate) struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    buffer: Dimensions,
    asset_root: PathBuf,
    sprite_cache: HashMap<String, Option<LoadedSprite>>,
    warned_missing_sprite_keys: HashSet<String>,
}

impl Renderer {
    /// The framebuffer matches the walkable area; `pixels` scales it to the
    /// window surface.
    pub(crate) fn new(
        window: Arc<Window>,
        buffer: Dimensions,
        asset_root: PathBuf,
    ) -> Result<Self, PixelsError> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), buffer, size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            buffer,
            asset_root,
            sprite_cache: HashMap::new(),
            warned_missing_sprite_keys: HashSet::new(),
        })
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) -> Result<(), PixelsError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), self.buffer, width, height)?;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        buffer: Dimensions,
        surface_width: u32,
        surface_height: u32,
    ) -> Result<Pixels<'static>, PixelsError> {
        let (buffer_width, buffer_height) = buffer_size(buffer);
        let surface = SurfaceTexture::new(surface_width, surface_height, window);
        Pixels::new(buffer_width, buffer_height, surface)
    }

    /// Maps a physical cursor position to walkable-area pixels; `None` when the
    /// cursor sits on the letterbox outside the framebuffer.
    pub(crate) fn window_to_world(&self, cursor_px: (f32, f32)) -> Option<Position> {
        self.pixels
            .window_pos_to_pixel(cursor_px)
            .ok()
            .map(|(x, y)| Position::new(x as i32, y as i32))
    }

    pub(crate) fn render(&mut self, view: &HomeView<'_>) -> Result<(), PixelsError> {
        let (width, height) = buffer_size(self.buffer);
        let asset_root = self.asset_root.as_path();
        let sprite_cache = &mut self.sprite_cache;
        let warned_missing_sprite_keys = &mut self.warned_missing_sprite_keys;
        let frame = self.pixels.frame_mut();

        let background = if view.avatar.is_some() {
            HOME_BACKGROUND_COLOR
        } else {
            AWAY_BACKGROUND_COLOR
        };
        for chunk in frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&background);
        }

        for zone_view in &view.zones {
            let zone = zone_view.zone;
            let rect = zone.bounds();
            match resolve_cached_sprite(
                sprite_cache,
                warned_missing_sprite_keys,
                asset_root,
                &zone.asset,
            ) {
                Some(sprite) => draw_sprite_stretched(frame, width, height, rect, sprite),
                None => fill_rect(frame, width, height, rect, zone_fill_color(zone)),
            }
            if zone_view.active {
                draw_rect_outline(
                    frame,
                    width,
                    height,
                    rect,
                    ACTIVE_OUTLINE_THICKNESS_PX,
                    ACTIVE_ZONE_OUTLINE_COLOR,
                );
            }
        }

        if let Some(avatar) = view.avatar {
            fill_rect(frame, width, height, avatar, AVATAR_COLOR);
        }

        self.pixels.render()
    }
}

fn buffer_size(buffer: Dimensions) -> (u32, u32) {
    (buffer.width.max(1) as u32, buffer.height.max(1) as u32)
}

fn zone_fill_color(zone: &Zone) -> [u8; 4] {
    if zone.visibility == Visibility::Admin {
        return ADMIN_ZONE_COLOR;
    }
    match zone.effect {
        ZoneEffect::Navigate(_) => NAVIGATE_ZONE_COLOR,
        ZoneEffect::Invoke(_) => INVOKE_ZONE_COLOR,
    }
}

#[derive(Debug, Error)]
enum SpriteLoadError {
    #[error("invalid sprite key: {0}")]
    InvalidKey(#[source] SpriteKeyError),
    #[error("cannot open sprite file: {0}")]
    Open(#[source] std::io::Error),
    #[error("cannot decode sprite image: {0}")]
    Decode(#[source] ImageError),
}

/// Loads each key at most once; failures are cached as `None` so the zone
/// keeps its placeholder without retrying the file every frame.
fn resolve_cached_sprite<'a>(
    cache: &'a mut HashMap<String, Option<LoadedSprite>>,
    warned_keys: &mut HashSet<String>,
    asset_root: &Path,
    key: &str,
) -> Option<&'a LoadedSprite> {
    if !cache.contains_key(key) {
        let loaded = resolve_sprite_image_path(asset_root, key)
            .and_then(|path| load_sprite_rgba(&path))
            .map_err(|error| {
                if warned_keys.insert(key.to_string()) {
                    warn!(
                        sprite_key = key,
                        asset_root = %asset_root.display(),
                        error = %error,
                        "zone_sprite_missing_using_placeholder"
                    );
                }
            })
            .ok();
        cache.insert(key.to_string(), loaded);
    }
    cache.get(key).and_then(Option::as_ref)
}

fn resolve_sprite_image_path(asset_root: &Path, key: &str) -> Result<PathBuf, SpriteLoadError> {
    validate_sprite_key(key).map_err(SpriteLoadError::InvalidKey)?;
    Ok(asset_root.join("sprites").join(format!("{key}.png")))
}

fn load_sprite_rgba(path: &Path) -> Result<LoadedSprite, SpriteLoadError> {
    let image = ImageReader::open(path)
        .map_err(SpriteLoadError::Open)?
        .decode()
        .map_err(SpriteLoadError::Decode)?
        .into_rgba8();
    let (width, height) = image.dimensions();
    Ok(LoadedSprite {
        width,
        height,
        rgba: image.into_raw(),
    })
}

impl LoadedSprite {
    fn texel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let bytes = self.rgba.get(offset..offset + 4)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

fn clip_rect(rect: BoundingBox, width: u32, height: u32) -> Option<BoundingBox> {
    let clipped = BoundingBox {
        left: rect.left.max(0),
        top: rect.top.max(0),
        right: rect.right.min(width as i32),
        bottom: rect.bottom.min(height as i32),
    };
    (clipped.left < clipped.right && clipped.top < clipped.bottom).then_some(clipped)
}

/// Byte range of row `y` between columns `left..right`; callers pass clipped spans.
fn row_span(frame: &mut [u8], width: u32, y: i32, left: i32, right: i32) -> Option<&mut [u8]> {
    let row_start = y as usize * width as usize;
    frame.get_mut((row_start + left as usize) * 4..(row_start + right as usize) * 4)
}

fn fill_rect(frame: &mut [u8], width: u32, height: u32, rect: BoundingBox, color: [u8; 4]) {
    let Some(rect) = clip_rect(rect, width, height) else {
        return;
    };
    for y in rect.top..rect.bottom {
        if let Some(span) = row_span(frame, width, y, rect.left, rect.right) {
            for pixel in span.chunks_exact_mut(4) {
                pixel.copy_from_slice(&color);
            }
        }
    }
}

fn draw_rect_outline(
    frame: &mut [u8],
    width: u32,
    height: u32,
    rect: BoundingBox,
    thickness: i32,
    color: [u8; 4],
) {
    let thickness = thickness.max(1);
    let edges = [
        BoundingBox {
            bottom: rect.top + thickness,
            ..rect
        },
        BoundingBox {
            top: rect.bottom - thickness,
            ..rect
        },
        BoundingBox {
            right: rect.left + thickness,
            ..rect
        },
        BoundingBox {
            left: rect.right - thickness,
            ..rect
        },
    ];
    for edge in edges {
        fill_rect(frame, width, height, edge, color);
    }
}

/// Nearest-neighbour stretch of `sprite` over `rect`; fully transparent texels
/// leave the frame untouched.
fn draw_sprite_stretched(
    frame: &mut [u8],
    width: u32,
    height: u32,
    rect: BoundingBox,
    sprite: &LoadedSprite,
) {
    if sprite.width == 0 || sprite.height == 0 {
        return;
    }
    let Some(visible) = clip_rect(rect, width, height) else {
        return;
    };
    let span_w = rect.width() as u64;
    let span_h = rect.height() as u64;

    for y in visible.top..visible.bottom {
        let src_y = ((y - rect.top) as u64 * u64::from(sprite.height) / span_h) as u32;
        let Some(row) = row_span(frame, width, y, visible.left, visible.right) else {
            continue;
        };
        for (column, pixel) in row.chunks_exact_mut(4).enumerate() {
            let dx = (i64::from(visible.left) + column as i64 - i64::from(rect.left)) as u64;
            let src_x = (dx * u64::from(sprite.width) / span_w) as u32;
            match sprite.texel(src_x, src_y) {
                Some([_, _, _, 0]) | None => {}
                Some(texel) => pixel.copy_from_slice(&texel),
            }
        }
    }
}
