//! Icons Module
//!
//! Window icon lookup, scaling and PNG encoding. `_NET_WM_ICON` is preferred;
//! the `WM_HINTS` icon pixmap (and mask) is the fallback.

use anyhow::{Context, Result};
use tracing::debug;

use crate::wm::backend::{ArgbImage, Backend, Prop, WindowId};
use crate::wm::properties::Properties;

/// Largest icon we accept from a client or render (1 megapixel).
const MAX_ICON_PIXELS: usize = 1024 * 1024;

/// Icon data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconData {
    /// Icon width
    pub width: u32,
    /// Icon height
    pub height: u32,
    /// Icon pixels (ARGB32 format)
    pub pixels: Vec<u32>,
}

impl From<ArgbImage> for IconData {
    fn from(image: ArgbImage) -> Self {
        Self {
            width: image.width,
            height: image.height,
            pixels: image.pixels,
        }
    }
}

impl IconData {
    fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Nearest-neighbour resample to `width` x `height`.
    pub fn scale(&self, width: u32, height: u32) -> IconData {
        if width == self.width && height == self.height {
            return self.clone();
        }

        let capacity = (width as usize).checked_mul(height as usize).unwrap_or(0);
        let mut pixels = Vec::with_capacity(capacity);
        for y in 0..height {
            let sy = (u64::from(y) * u64::from(self.height) / u64::from(height)) as usize;
            for x in 0..width {
                let sx = (u64::from(x) * u64::from(self.width) / u64::from(width)) as usize;
                pixels.push(self.pixels[sy * self.width as usize + sx]);
            }
        }

        IconData { width, height, pixels }
    }

    /// Zero the alpha of every pixel the mask leaves unset.
    pub fn apply_mask(&mut self, mask: &ArgbImage) {
        if mask.width != self.width || mask.height != self.height {
            debug!(
                "Icon mask is {}x{}, icon is {}x{}; ignoring mask",
                mask.width, mask.height, self.width, self.height
            );
            return;
        }
        for (pixel, &bit) in self.pixels.iter_mut().zip(&mask.pixels) {
            if bit == 0 {
                *pixel &= 0x00ff_ffff;
            }
        }
    }

    /// Straight (non-premultiplied) RGBA bytes.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&argb| {
                let [a, r, g, b] = argb.to_be_bytes();
                [r, g, b, a]
            })
            .collect()
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);

            let mut writer = encoder.write_header().context("Failed to write PNG header")?;
            writer
                .write_image_data(&self.to_rgba())
                .context("Failed to write PNG data")?;
            writer.finish().context("Failed to finish PNG")?;
        }
        Ok(out)
    }
}

/// Split `_NET_WM_ICON` data (width, height, pixels...) into its icons.
/// A truncated or oversized entry ends the list.
pub fn parse_net_wm_icon(words: &[u32]) -> Vec<IconData> {
    let mut icons = Vec::new();
    let mut rest = words;

    while let [width, height, tail @ ..] = rest {
        let (width, height) = (*width, *height);
        let Some(count) = (width as usize).checked_mul(height as usize) else {
            break;
        };
        if count == 0 || count > MAX_ICON_PIXELS || tail.len() < count {
            debug!("Stopping at bad _NET_WM_ICON entry {}x{}", width, height);
            break;
        }
        icons.push(IconData {
            width,
            height,
            pixels: tail[..count].to_vec(),
        });
        rest = &tail[count..];
    }

    icons
}

/// Exact size if present, else the smallest icon at least as large as
/// requested, else the largest one available.
pub fn pick_best(icons: &[IconData], width: u32, height: u32) -> Option<&IconData> {
    if let Some(exact) = icons.iter().find(|i| i.width == width && i.height == height) {
        return Some(exact);
    }
    icons
        .iter()
        .filter(|i| i.width >= width && i.height >= height)
        .min_by_key(|i| i.area())
        .or_else(|| icons.iter().max_by_key(|i| i.area()))
}

fn net_wm_icon<B: Backend + ?Sized>(
    props: &Properties<'_, B>,
    window: WindowId,
    width: u32,
    height: u32,
) -> Result<Option<IconData>> {
    let Some(value) = props.read(window, Prop::NetWmIcon)? else {
        return Ok(None);
    };
    let Some(words) = value.words() else {
        debug!("_NET_WM_ICON on 0x{:x} is not 32-bit data", window);
        return Ok(None);
    };

    let icons = parse_net_wm_icon(words);
    Ok(pick_best(&icons, width, height).cloned())
}

fn pixmap_icon<B: Backend + ?Sized>(props: &Properties<'_, B>, window: WindowId) -> Result<Option<IconData>> {
    let Some(hints) = props.wm_hints(window)? else {
        return Ok(None);
    };
    let Some(pixmap) = hints.icon_pixmap else {
        return Ok(None);
    };

    let conn = props.connection();
    let Some(image) = conn.pixmap_image(pixmap).context("Failed to read icon pixmap")? else {
        return Ok(None);
    };

    let mut icon = IconData::from(image);
    if let Some(mask) = hints.icon_mask {
        if let Some(mask) = conn.pixmap_image(mask).context("Failed to read icon mask")? {
            icon.apply_mask(&mask);
        }
    }
    Ok(Some(icon))
}

/// Find the window icon, scale it to `width` x `height` and encode it.
pub(crate) fn render_png<B: Backend + ?Sized>(
    props: &Properties<'_, B>,
    window: WindowId,
    width: u32,
    height: u32,
) -> Result<Option<Vec<u8>>> {
    if width == 0 || height == 0 {
        anyhow::bail!("Requested icon size {}x{} is empty", width, height);
    }
    let pixels = (width as usize).checked_mul(height as usize);
    if pixels.is_none_or(|count| count > MAX_ICON_PIXELS) {
        anyhow::bail!("Requested icon size {}x{} is too large", width, height);
    }

    let icon = match net_wm_icon(props, window, width, height)? {
        Some(icon) => icon,
        None => match pixmap_icon(props, window)? {
            Some(icon) => icon,
            None => return Ok(None),
        },
    };

    debug!(
        "Rendering {}x{} icon for window 0x{:x} at {}x{}",
        icon.width, icon.height, window, width, height
    );
    icon.scale(width, height).encode_png().map(Some)
}
