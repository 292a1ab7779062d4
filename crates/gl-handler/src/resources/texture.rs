//! Texture recipes, sampling options and texel data.

use std::str::FromStr;

use crate::context::{GlContext, GlEnum, Texture};
use crate::error::{GlError, Result};

/// `GL_LUMINANCE`; legacy in core profiles, so not exported by `gl`.
pub const LUMINANCE: GlEnum = 0x1909;

/// Closed set of pixel formats a texture can be created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit RGB.
    Rgb,
    /// 8-bit RGBA.
    Rgba,
    /// Half-float RGBA, uploaded from 32-bit floats.
    Rgba16f,
    /// Single-channel 32-bit float.
    R32f,
    /// Four-channel 32-bit float.
    Rgba32f,
    /// Single-channel 8-bit luminance.
    Luminance,
}

/// The `(internal format, source format, component type)` triple handed to
/// `glTexImage2D`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureRecipe {
    pub internal_format: i32,
    pub format: GlEnum,
    pub component_type: GlEnum,
}

impl TextureFormat {
    pub const ALL: [TextureFormat; 6] = [
        TextureFormat::Rgb,
        TextureFormat::Rgba,
        TextureFormat::Rgba16f,
        TextureFormat::R32f,
        TextureFormat::Rgba32f,
        TextureFormat::Luminance,
    ];

    pub fn recipe(self) -> TextureRecipe {
        let (internal_format, format, component_type) = match self {
            TextureFormat::Rgb => (gl::RGB, gl::RGB, gl::UNSIGNED_BYTE),
            TextureFormat::Rgba => (gl::RGBA, gl::RGBA, gl::UNSIGNED_BYTE),
            TextureFormat::Rgba16f => (gl::RGBA16F, gl::RGBA, gl::FLOAT),
            TextureFormat::R32f => (gl::R32F, gl::RED, gl::FLOAT),
            TextureFormat::Rgba32f => (gl::RGBA32F, gl::RGBA, gl::FLOAT),
            TextureFormat::Luminance => (LUMINANCE, LUMINANCE, gl::UNSIGNED_BYTE),
        };
        TextureRecipe {
            internal_format: internal_format as i32,
            format,
            component_type,
        }
    }

    /// Configuration key, e.g. `"RGBA16F"`.
    pub fn key(self) -> &'static str {
        match self {
            TextureFormat::Rgb => "RGB",
            TextureFormat::Rgba => "RGBA",
            TextureFormat::Rgba16f => "RGBA16F",
            TextureFormat::R32f => "R32F",
            TextureFormat::Rgba32f => "RGBA32F",
            TextureFormat::Luminance => "LUMINANCE",
        }
    }

    /// Source channels per texel.
    pub fn channels(self) -> usize {
        match self {
            TextureFormat::R32f | TextureFormat::Luminance => 1,
            TextureFormat::Rgb => 3,
            TextureFormat::Rgba | TextureFormat::Rgba16f | TextureFormat::Rgba32f => 4,
        }
    }

    /// Whether source texels are 32-bit floats rather than bytes.
    pub fn is_float(self) -> bool {
        self.recipe().component_type == gl::FLOAT
    }
}

impl FromStr for TextureFormat {
    type Err = GlError;

    fn from_str(key: &str) -> Result<Self> {
        TextureFormat::ALL
            .into_iter()
            .find(|f| f.key() == key)
            .ok_or_else(|| GlError::UnsupportedFormat {
                kind: "texture format",
                key: key.to_string(),
            })
    }
}

/// Magnification and minification filter, applied together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFilter {
    #[default]
    Nearest,
    Linear,
}

impl TextureFilter {
    pub fn gl(self) -> GlEnum {
        match self {
            TextureFilter::Nearest => gl::NEAREST,
            TextureFilter::Linear => gl::LINEAR,
        }
    }
}

impl FromStr for TextureFilter {
    type Err = GlError;

    fn from_str(key: &str) -> Result<Self> {
        match key {
            "NEAREST" => Ok(TextureFilter::Nearest),
            "LINEAR" => Ok(TextureFilter::Linear),
            _ => Err(GlError::UnsupportedFormat {
                kind: "filter",
                key: key.to_string(),
            }),
        }
    }
}

/// Wrap mode, applied to both S and T.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureWrap {
    ClampToEdge,
    #[default]
    Repeat,
    MirroredRepeat,
}

impl TextureWrap {
    pub fn gl(self) -> GlEnum {
        match self {
            TextureWrap::ClampToEdge => gl::CLAMP_TO_EDGE,
            TextureWrap::Repeat => gl::REPEAT,
            TextureWrap::MirroredRepeat => gl::MIRRORED_REPEAT,
        }
    }
}

impl FromStr for TextureWrap {
    type Err = GlError;

    fn from_str(key: &str) -> Result<Self> {
        match key {
            "CLAMP_TO_EDGE" => Ok(TextureWrap::ClampToEdge),
            "REPEAT" => Ok(TextureWrap::Repeat),
            "MIRRORED_REPEAT" => Ok(TextureWrap::MirroredRepeat),
            _ => Err(GlError::UnsupportedFormat {
                kind: "wrap",
                key: key.to_string(),
            }),
        }
    }
}

/// Initial texel contents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TexelData<'a> {
    Bytes(&'a [u8]),
    Floats(&'a [f32]),
}

impl TexelData<'_> {
    fn len(&self) -> usize {
        match self {
            TexelData::Bytes(b) => b.len(),
            TexelData::Floats(f) => f.len(),
        }
    }

    fn as_bytes(&self) -> &[u8] {
        match self {
            TexelData::Bytes(b) => *b,
            TexelData::Floats(f) => crate::bytes::as_byte_slice(*f),
        }
    }
}

/// How to create a texture.
///
/// Without a `format` the texture object is created and configured but no
/// storage is specified; the caller uploads it later.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextureOptions<'a> {
    pub format: Option<TextureFormat>,
    pub data: Option<TexelData<'a>>,
    pub filter: TextureFilter,
    pub wrap: TextureWrap,
}

impl<'a> TextureOptions<'a> {
    pub fn new(format: TextureFormat) -> Self {
        Self {
            format: Some(format),
            ..Self::default()
        }
    }

    /// Parse options from configuration keys. `None` keys take defaults.
    pub fn from_keys(format: Option<&str>, filter: Option<&str>, wrap: Option<&str>) -> Result<Self> {
        Ok(Self {
            format: format.map(str::parse::<TextureFormat>).transpose()?,
            data: None,
            filter: filter
                .map(str::parse::<TextureFilter>)
                .transpose()?
                .unwrap_or_default(),
            wrap: wrap
                .map(str::parse::<TextureWrap>)
                .transpose()?
                .unwrap_or_default(),
        })
    }

    pub fn with_data(mut self, data: TexelData<'a>) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_filter(mut self, filter: TextureFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_wrap(mut self, wrap: TextureWrap) -> Self {
        self.wrap = wrap;
        self
    }

    /// Check texel data against the recipe before anything is allocated.
    pub(crate) fn validate(&self, width: i32, height: i32) -> Result<()> {
        let (Some(format), Some(data)) = (self.format, self.data) else {
            return Ok(());
        };
        let expected = width.max(0) as usize * height.max(0) as usize * format.channels();
        let type_matches = matches!(
            (format.is_float(), data),
            (true, TexelData::Floats(_)) | (false, TexelData::Bytes(_))
        );
        if !type_matches || data.len() != expected {
            return Err(GlError::TexelDataMismatch {
                format: format.key(),
                expected,
                actual: data.len(),
            });
        }
        Ok(())
    }
}

/// Upload storage (if a format is set) and sampling state to the texture
/// bound on the active unit.
pub(crate) fn configure<C: GlContext + ?Sized>(ctx: &C, width: i32, height: i32, options: &TextureOptions<'_>) {
    if let Some(format) = options.format {
        let recipe = format.recipe();
        ctx.tex_image_2d(
            recipe.internal_format,
            width,
            height,
            recipe.format,
            recipe.component_type,
            options.data.as_ref().map(TexelData::as_bytes),
        );
    }
    apply_filter(ctx, options.filter);
    apply_wrap(ctx, options.wrap);
}

pub(crate) fn apply_filter<C: GlContext + ?Sized>(ctx: &C, filter: TextureFilter) {
    ctx.tex_parameter_i32(gl::TEXTURE_MAG_FILTER, filter.gl() as i32);
    ctx.tex_parameter_i32(gl::TEXTURE_MIN_FILTER, filter.gl() as i32);
}

pub(crate) fn apply_wrap<C: GlContext + ?Sized>(ctx: &C, wrap: TextureWrap) {
    ctx.tex_parameter_i32(gl::TEXTURE_WRAP_S, wrap.gl() as i32);
    ctx.tex_parameter_i32(gl::TEXTURE_WRAP_T, wrap.gl() as i32);
}

pub(crate) fn gen_texture<C: GlContext + ?Sized>(ctx: &C) -> Result<Texture> {
    ctx.gen_texture().ok_or(GlError::ObjectCreation("texture"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipes_match_gl_triples() {
        assert_eq!(
            TextureFormat::Rgba16f.recipe(),
            TextureRecipe {
                internal_format: gl::RGBA16F as i32,
                format: gl::RGBA,
                component_type: gl::FLOAT,
            }
        );
        assert_eq!(TextureFormat::R32f.recipe().format, gl::RED);
        assert_eq!(TextureFormat::Luminance.recipe().internal_format, 0x1909);
    }

    #[test]
    fn keys_parse_back_to_their_format() {
        for format in TextureFormat::ALL {
            assert_eq!(format.key().parse::<TextureFormat>().unwrap(), format);
        }
        assert_eq!(
            "RGB565".parse::<TextureFormat>().unwrap_err(),
            GlError::UnsupportedFormat {
                kind: "texture format",
                key: "RGB565".into(),
            }
        );
    }

    #[test]
    fn option_keys_default_to_nearest_repeat() {
        let options = TextureOptions::from_keys(Some("RGBA"), None, None).unwrap();
        assert_eq!(options.format, Some(TextureFormat::Rgba));
        assert_eq!(options.filter, TextureFilter::Nearest);
        assert_eq!(options.wrap, TextureWrap::Repeat);

        let err = TextureOptions::from_keys(None, Some("LINEAR"), Some("CLAMP")).unwrap_err();
        assert!(matches!(err, GlError::UnsupportedFormat { kind: "wrap", .. }));
        assert!("MIPMAP".parse::<TextureFilter>().is_err());
        assert_eq!("MIRRORED_REPEAT".parse::<TextureWrap>(), Ok(TextureWrap::MirroredRepeat));
    }

    #[test]
    fn texel_data_must_match_recipe() {
        let bytes = [0u8; 2 * 2 * 3];
        let floats = [0.0f32; 2 * 2 * 4];

        assert!(TextureOptions::new(TextureFormat::Rgb)
            .with_data(TexelData::Bytes(&bytes))
            .validate(2, 2)
            .is_ok());
        assert!(TextureOptions::new(TextureFormat::Rgba32f)
            .with_data(TexelData::Floats(&floats))
            .validate(2, 2)
            .is_ok());
        assert_eq!(
            TextureOptions::new(TextureFormat::Rgba)
                .with_data(TexelData::Bytes(&bytes))
                .validate(2, 2),
            Err(GlError::TexelDataMismatch {
                format: "RGBA",
                expected: 16,
                actual: 12,
            })
        );
        assert!(TextureOptions::new(TextureFormat::Rgba16f)
            .with_data(TexelData::Bytes(&[0u8; 16]))
            .validate(2, 2)
            .is_err());
    }
}
