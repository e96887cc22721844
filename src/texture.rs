use image::{DynamicImage, Pixel, Rgb, RgbImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureMapping {
    #[default]
    Uv,
    /// Sampled by direction, wrapping the image around the viewer.
    EquirectangularReflection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
}

/// Decoded radiance panorama, ready to be attached to the sky material.
#[derive(Debug, Clone, PartialEq)]
pub struct PanoramaTexture {
    /// Source the pixels were decoded from.
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Linear RGBA, row major.
    pub pixels: Vec<[f32; 4]>,
    pub mapping: TextureMapping,
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
    /// Set when the pixels must be (re)uploaded by the surface.
    pub needs_update: bool,
}

impl PanoramaTexture {
    pub fn new<S: Into<String>>(name: S, width: u32, height: u32, pixels: Vec<[f32; 4]>) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            pixels,
            mapping: TextureMapping::Uv,
            min_filter: FilterMode::Nearest,
            mag_filter: FilterMode::Nearest,
            needs_update: false,
        }
    }

    pub fn from_image<S: Into<String>>(name: S, image: &DynamicImage) -> Self {
        let rgba = image.to_rgba32f();
        let pixels = rgba.pixels().map(|p| p.to_rgba().0).collect();
        Self::new(name, rgba.width(), rgba.height(), pixels)
    }

    /// Configures the texture for display on the panorama sphere.
    pub fn prepare_equirectangular(&mut self) {
        self.mapping = TextureMapping::EquirectangularReflection;
        self.min_filter = FilterMode::Linear;
        self.mag_filter = FilterMode::Linear;
        self.needs_update = true;
    }

    /// 8-bit preview using Reinhard tone mapping and sRGB gamma.
    pub fn tone_mapped(&self, exposure: f32) -> RgbImage {
        let mut out = RgbImage::new(self.width, self.height);
        for (dst, src) in out.pixels_mut().zip(self.pixels.iter()) {
            let map = |c: f32| {
                let c = (c * exposure).max(0.);
                let c = c / (1. + c);
                (c.powf(1. / 2.2) * 255.).round().clamp(0., 255.) as u8
            };
            *dst = Rgb([map(src[0]), map(src[1]), map(src[2])]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equirectangular_setup() {
        let mut tex = PanoramaTexture::new("t", 1, 1, vec![[1.; 4]]);
        assert_eq!(tex.mapping, TextureMapping::Uv);
        tex.prepare_equirectangular();
        assert_eq!(tex.mapping, TextureMapping::EquirectangularReflection);
        assert_eq!(tex.min_filter, FilterMode::Linear);
        assert_eq!(tex.mag_filter, FilterMode::Linear);
        assert!(tex.needs_update);
    }

    #[test]
    fn tone_mapping_range() {
        let tex = PanoramaTexture::new("t", 2, 1, vec![[0., 0., 0., 1.], [1000., 1., 0.25, 1.]]);
        let img = tex.tone_mapped(1.);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0]);
        let bright = img.get_pixel(1, 0).0;
        assert!(bright[0] >= 254);
        assert!(bright[1] > bright[2] && bright[2] > 0);
    }

    #[test]
    fn from_rgb_image() {
        let img = DynamicImage::ImageRgb32F(image::Rgb32FImage::from_pixel(
            3,
            2,
            Rgb([2.0, 0.5, 0.0]),
        ));
        let tex = PanoramaTexture::from_image("sky.hdr", &img);
        assert_eq!((tex.width, tex.height), (3, 2));
        assert_eq!(tex.pixels.len(), 6);
        assert_eq!(tex.pixels[0], [2.0, 0.5, 0.0, 1.0]);
    }
}
