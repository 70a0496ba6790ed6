//! Raster primitives for the photobooth compositor.
//!
//! Provides contain/cover fit math and renderers, alpha overlay and faded
//! edits, mask-gated pixel copy, and QR code rendering.

pub mod composite;
pub mod fit;
pub mod qr;

// Re-exports for convenience
pub use composite::{blend_changes, copy_masked, overlay, overlay_with_opacity};
pub use fit::{
    Placement, Rect, contain_placement, cover_placement, draw_contain, draw_cover, render_cover,
};
pub use qr::{QrError, generate_qr};
