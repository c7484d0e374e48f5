//! Bonkskin Render Library
//!
//! Renderer abstraction and a CPU implementation for the skin editor.
//! The CPU renderer uses tiny-skia, with resvg for embedded SVG images.

mod cpu;
mod export;
mod renderer;

pub use cpu::CpuRenderer;
pub use export::{DEFAULT_PNG_NAME, encode_png, export_png, render_stage};
pub use renderer::{CircleClip, RenderContext, RenderResult, RenderedImage, Renderer, RendererError};
