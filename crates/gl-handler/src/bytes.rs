//! Byte views of plain numeric data for buffer, texture and uniform-block
//! uploads.

/// View plain numeric data as bytes for GPU upload.
///
/// # Safety
///
/// Only implement on `#[repr(C)]` types whose fields are all plain numeric
/// types (f32, i32, u32, etc.) with no pointers, references, or
/// padding-dependent invariants.
///
/// # Example
///
/// ```rust
/// use gl_handler::bytes::{as_byte_slice, AsBytes};
///
/// #[repr(C)]
/// struct Light {
///     position: [f32; 4],
///     colour: [f32; 4],
/// }
///
/// // SAFETY: Light is #[repr(C)] with only f32 fields.
/// unsafe impl AsBytes for Light {}
///
/// let light = Light { position: [0.0; 4], colour: [1.0; 4] };
/// assert_eq!(light.as_bytes().len(), 32);
/// assert_eq!(as_byte_slice(&[1.0f32, 2.0, 3.0]).len(), 12);
/// ```
pub unsafe trait AsBytes: Sized {
    /// View `self` as a byte slice. The returned slice has length
    /// `std::mem::size_of::<Self>()`.
    fn as_bytes(&self) -> &[u8] {
        unsafe {
            std::slice::from_raw_parts(self as *const Self as *const u8, std::mem::size_of::<Self>())
        }
    }
}

// SAFETY: primitive numeric types have no padding or pointers.
unsafe impl AsBytes for u8 {}
unsafe impl AsBytes for u16 {}
unsafe impl AsBytes for u32 {}
unsafe impl AsBytes for i32 {}
unsafe impl AsBytes for f32 {}

// SAFETY: arrays of padding-free elements are padding-free.
unsafe impl<T: AsBytes, const N: usize> AsBytes for [T; N] {}

/// View a slice of plain numeric values as bytes.
pub fn as_byte_slice<T: AsBytes>(values: &[T]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(values.as_ptr() as *const u8, std::mem::size_of_val(values))
    }
}
