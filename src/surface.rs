use cgmath::Deg;

use crate::source::SourceReference;
use crate::texture::PanoramaTexture;

/// The scene host that draws the panorama sphere.
pub trait RenderSurface {
    /// Shows a raster panorama the host decodes on its own.
    fn set_raster_source(&mut self, source: &SourceReference);

    /// Replaces the sky material's texture with a decoded radiance map.
    fn apply_texture(&mut self, texture: PanoramaTexture);

    fn set_field_of_view(&mut self, fov: Deg<f32>);

    /// Yaw of the camera rig around the vertical axis.
    fn set_yaw_offset(&mut self, yaw: Deg<f32>);

    /// Host viewport size; the surface always fills it.
    fn resize(&mut self, _width: u32, _height: u32) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkyContent {
    Empty,
    Raster(SourceReference),
    Radiance(PanoramaTexture),
}

/// Surface without a GPU behind it. Keeps whatever it is given.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    pub sky: SkyContent,
    pub fov: Deg<f32>,
    pub yaw: Deg<f32>,
    pub size: (u32, u32),
    /// Number of radiance textures applied so far.
    pub texture_uploads: usize,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            sky: SkyContent::Empty,
            fov: Deg(80.),
            yaw: Deg(0.),
            size: (width, height),
            texture_uploads: 0,
        }
    }

    pub fn texture(&self) -> Option<&PanoramaTexture> {
        match &self.sky {
            SkyContent::Radiance(texture) => Some(texture),
            _ => None,
        }
    }

    pub fn raster_source(&self) -> Option<&SourceReference> {
        match &self.sky {
            SkyContent::Raster(source) => Some(source),
            _ => None,
        }
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl RenderSurface for HeadlessSurface {
    fn set_raster_source(&mut self, source: &SourceReference) {
        log::debug!("sky <- raster {source}");
        self.sky = SkyContent::Raster(source.clone());
    }

    fn apply_texture(&mut self, texture: PanoramaTexture) {
        log::debug!(
            "sky <- {}x{} texture from {}",
            texture.width,
            texture.height,
            texture.name
        );
        self.texture_uploads += 1;
        self.sky = SkyContent::Radiance(texture);
    }

    fn set_field_of_view(&mut self, fov: Deg<f32>) {
        self.fov = fov;
    }

    fn set_yaw_offset(&mut self, yaw: Deg<f32>) {
        self.yaw = yaw;
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.size = (width, height);
        }
    }
}
