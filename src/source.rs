use std::fmt;

/// Fragment appended to temporary handles created from `.hdr` files.
pub const HDR_HINT: &str = "#type=hdr.hdr";
/// Fragment appended to temporary handles created from `.exr` files.
pub const EXR_HINT: &str = "#type=exr.exr";

const BLOB_SCHEME: &str = "blob:";

/// Opaque reference to panorama content: a remote URL, a local path or a
/// temporary `blob:` handle, optionally carrying a format hint fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceReference(String);

impl SourceReference {
    pub fn new<S: Into<String>>(raw: S) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this reference was created by the resource store.
    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(BLOB_SCHEME)
    }

    /// The reference without its `#...` fragment.
    pub fn without_fragment(&self) -> &str {
        match self.0.find('#') {
            Some(idx) => &self.0[..idx],
            None => &self.0,
        }
    }

    /// Format hint fragment, if one was appended.
    pub fn format_hint(&self) -> Option<&str> {
        let idx = self.0.find('#')?;
        let fragment = &self.0[idx..];
        let lower = fragment.to_ascii_lowercase();
        (lower.contains("type=hdr") || lower.contains("type=exr")).then_some(fragment)
    }

    pub fn classify(&self) -> FormatClass {
        classify(self)
    }
}

impl fmt::Display for SourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceReference {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SourceReference {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatClass {
    /// LDR raster decoded by the surface itself.
    Standard,
    RadianceHdr,
    RadianceExr,
}

impl FormatClass {
    pub fn is_radiance(self) -> bool {
        !matches!(self, FormatClass::Standard)
    }

    /// Hint fragment for a local file carrying this format, if any.
    pub fn hint(self) -> Option<&'static str> {
        match self {
            FormatClass::Standard => None,
            FormatClass::RadianceHdr => Some(HDR_HINT),
            FormatClass::RadianceExr => Some(EXR_HINT),
        }
    }

    /// Classifies a bare file name by its extension only.
    pub fn from_file_name(name: &str) -> Self {
        match crate::utils::extension_of(name).as_deref() {
            Some("exr") => FormatClass::RadianceExr,
            Some("hdr") => FormatClass::RadianceHdr,
            _ => FormatClass::Standard,
        }
    }
}

impl fmt::Display for FormatClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormatClass::Standard => "standard",
            FormatClass::RadianceHdr => "hdr",
            FormatClass::RadianceExr => "exr",
        };
        f.write_str(name)
    }
}

/// Determines the format class of a source reference.
///
/// Matches the `.hdr` / `.exr` suffix or an embedded `type=hdr` / `type=exr`
/// token, ignoring case. Everything else is [`FormatClass::Standard`].
pub fn classify(source: &SourceReference) -> FormatClass {
    let lower = source.as_str().to_ascii_lowercase();
    if lower.ends_with(".exr") || lower.contains("type=exr") {
        FormatClass::RadianceExr
    } else if lower.ends_with(".hdr") || lower.contains("type=hdr") {
        FormatClass::RadianceHdr
    } else {
        FormatClass::Standard
    }
}
