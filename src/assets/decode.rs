use std::sync::Arc;

use anyhow::Context as _;

use crate::error::{BannercraftError, BannercraftResult};

/// A decoded layer image held as premultiplied RGBA8, ready to paint.
#[derive(Clone, Debug)]
pub struct LayerImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode an encoded image (PNG, JPEG, WebP, ...) into a [`LayerImage`].
pub fn decode_image(bytes: &[u8]) -> BannercraftResult<LayerImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(LayerImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

impl LayerImage {
    /// Wrap the pixels in a `vello_cpu` image paint.
    pub fn to_paint(&self) -> BannercraftResult<vello_cpu::Image> {
        let w: u16 = self
            .width
            .try_into()
            .map_err(|_| BannercraftError::render("layer width exceeds u16"))?;
        let h: u16 = self
            .height
            .try_into()
            .map_err(|_| BannercraftError::render("layer height exceeds u16"))?;
        let expected = self.width as usize * self.height as usize * 4;
        if self.rgba8_premul.len() != expected {
            return Err(BannercraftError::render("layer byte length mismatch"));
        }

        let mut may_have_opacities = false;
        let mut pixels = Vec::with_capacity(self.width as usize * self.height as usize);
        for px in self.rgba8_premul.chunks_exact(4) {
            let a = px[3];
            may_have_opacities |= a != 255;
            pixels.push(vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a,
            });
        }

        let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
        Ok(vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        })
    }
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}
