use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use futures_util::future::LocalBoxFuture;
use image::ImageFormat;
use thiserror::Error;

use crate::fetch::{FetchError, Fetcher};
use crate::source::FormatClass;
use crate::texture::PanoramaTexture;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("cannot decode {name}")]
    Image {
        name: String,
        #[source]
        source: image::ImageError,
    },
    #[error("no radiance decoder handles {0}")]
    UnsupportedSource(String),
}

/// Receives decode progress in `0.0..=1.0`.
pub type ProgressFn = Rc<dyn Fn(f32)>;

/// One-shot asynchronous loader for a radiance format.
pub trait PanoramaDecoder {
    fn load(
        &self,
        url: &str,
        progress: Option<ProgressFn>,
    ) -> LocalBoxFuture<'static, Result<PanoramaTexture, DecodeError>>;
}

/// Named decoder slots, filled lazily once the decoder libraries are up.
#[derive(Default)]
pub struct DecoderRegistry {
    slots: RefCell<HashMap<FormatClass, Rc<dyn PanoramaDecoder>>>,
}

impl DecoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `decoder` for `class` unless one is already registered.
    /// Returns whether it was installed.
    pub fn install(&self, class: FormatClass, decoder: Rc<dyn PanoramaDecoder>) -> bool {
        if !class.is_radiance() {
            log::warn!("ignoring decoder for {class} panoramas");
            return false;
        }
        let mut slots = self.slots.borrow_mut();
        if slots.contains_key(&class) {
            log::debug!("{class} decoder already registered");
            return false;
        }
        slots.insert(class, decoder);
        log::info!("{class} decoder ready");
        true
    }

    pub fn resolve(&self, class: FormatClass) -> Option<Rc<dyn PanoramaDecoder>> {
        self.slots.borrow().get(&class).cloned()
    }

    pub fn is_ready(&self, class: FormatClass) -> bool {
        self.slots.borrow().contains_key(&class)
    }
}

/// Decodes HDR / OpenEXR panoramas with the `image` crate.
pub struct ImageDecoder {
    format: ImageFormat,
    fetcher: Fetcher,
}

impl ImageDecoder {
    pub fn new(class: FormatClass, fetcher: Fetcher) -> Option<Self> {
        let format = match class {
            FormatClass::RadianceHdr => ImageFormat::Hdr,
            FormatClass::RadianceExr => ImageFormat::OpenExr,
            FormatClass::Standard => return None,
        };
        Some(Self { format, fetcher })
    }
}

impl PanoramaDecoder for ImageDecoder {
    fn load(
        &self,
        url: &str,
        progress: Option<ProgressFn>,
    ) -> LocalBoxFuture<'static, Result<PanoramaTexture, DecodeError>> {
        let url = url.to_string();
        let fetcher = self.fetcher.clone();
        let format = self.format;
        Box::pin(async move {
            let report = |value: f32| {
                if let Some(progress) = &progress {
                    progress(value);
                }
            };
            report(0.);
            let bytes = fetcher.fetch(&url).await?;
            report(0.5);
            let image = image::load_from_memory_with_format(&bytes, format).map_err(|source| {
                DecodeError::Image {
                    name: url.clone(),
                    source,
                }
            })?;
            let texture = PanoramaTexture::from_image(url.as_str(), &image);
            log::info!(
                "decoded {url} ({}x{}, {:?})",
                texture.width,
                texture.height,
                format
            );
            report(1.);
            Ok(texture)
        })
    }
}

/// Installs the built-in HDR and EXR decoders after `delay`.
///
/// Mirrors a host whose decoder libraries finish loading some time after
/// the viewer mounts; loads requested earlier wait in the retry loop.
pub async fn install_builtin_decoders(registry: Rc<DecoderRegistry>, fetcher: Fetcher, delay: Duration) {
    if !delay.is_zero() {
        crate::utils::sleep(delay).await;
    }
    for class in [FormatClass::RadianceHdr, FormatClass::RadianceExr] {
        if let Some(decoder) = ImageDecoder::new(class, fetcher.clone()) {
            registry.install(class, Rc::new(decoder));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{LocalFile, ResourceStore};
    use image::codecs::hdr::HdrEncoder;
    use image::Rgb;

    struct Never;

    impl PanoramaDecoder for Never {
        fn load(
            &self,
            url: &str,
            _progress: Option<ProgressFn>,
        ) -> LocalBoxFuture<'static, Result<PanoramaTexture, DecodeError>> {
            let url = url.to_string();
            Box::pin(async move { Err(DecodeError::UnsupportedSource(url)) })
        }
    }

    fn hdr_bytes() -> Vec<u8> {
        let pixels = vec![Rgb([1.5f32, 0.25, 0.0]); 4 * 2];
        let mut out = Vec::new();
        HdrEncoder::new(&mut out).encode(&pixels, 4, 2).unwrap();
        out
    }

    #[test]
    fn install_is_first_wins() {
        let registry = DecoderRegistry::new();
        assert!(!registry.is_ready(FormatClass::RadianceHdr));
        assert!(registry.install(FormatClass::RadianceHdr, Rc::new(Never)));
        assert!(!registry.install(FormatClass::RadianceHdr, Rc::new(Never)));
        assert!(registry.is_ready(FormatClass::RadianceHdr));
        assert!(registry.resolve(FormatClass::RadianceExr).is_none());
    }

    #[test]
    fn standard_has_no_decoder_slot() {
        let registry = DecoderRegistry::new();
        assert!(!registry.install(FormatClass::Standard, Rc::new(Never)));
        assert!(ImageDecoder::new(FormatClass::Standard, Fetcher::new(Default::default())).is_none());
    }

    #[tokio::test]
    async fn decodes_hdr_from_temporary_handle() {
        let store = ResourceStore::new();
        let handle = store
            .create_handle(&LocalFile::in_memory("sky.hdr", hdr_bytes()))
            .unwrap();
        let decoder =
            ImageDecoder::new(FormatClass::RadianceHdr, Fetcher::new(store.reader())).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let texture = decoder
            .load(handle.as_str(), Some(Rc::new(move |p: f32| sink.borrow_mut().push(p))))
            .await
            .unwrap();

        assert_eq!((texture.width, texture.height), (4, 2));
        assert_eq!(texture.name, handle.as_str());
        assert!((texture.pixels[0][0] - 1.5).abs() < 0.05);
        assert_eq!(*seen.borrow(), vec![0., 0.5, 1.]);
    }

    #[tokio::test]
    async fn garbage_is_a_decode_error() {
        let store = ResourceStore::new();
        let handle = store
            .create_handle(&LocalFile::in_memory("bad.exr", b"not an exr".to_vec()))
            .unwrap();
        let decoder =
            ImageDecoder::new(FormatClass::RadianceExr, Fetcher::new(store.reader())).unwrap();
        let err = decoder.load(handle.as_str(), None).await.unwrap_err();
        assert!(matches!(err, DecodeError::Image { .. }));
    }
}
