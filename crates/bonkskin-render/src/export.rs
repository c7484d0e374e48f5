//! Flattened PNG export of an editor session.

use crate::renderer::{CircleClip, RenderContext, RenderResult, RenderedImage, Renderer, RendererError};
use bonkskin_core::EditorSession;

/// Default download name for exported skins.
pub const DEFAULT_PNG_NAME: &str = "bonkverse_skin.png";

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(image: &RenderedImage) -> RenderResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, image.width, image.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| RendererError::Encode(format!("header: {:?}", e)))?;
        writer
            .write_image_data(&image.rgba_data)
            .map_err(|e| RendererError::Encode(format!("data: {:?}", e)))?;
    }
    Ok(png_data)
}

/// Render the stage as the editor shows it: clipped, at 1x, with the affordance.
pub fn render_stage(session: &EditorSession, renderer: &mut dyn Renderer) -> RenderResult<RenderedImage> {
    let ctx = RenderContext::new(session.document(), session.stage_size())
        .with_clip(Some(CircleClip::for_stage(session.stage_size())))
        .with_affordance(session.selection().affordance());
    renderer.render(&ctx)
}

/// Rasterize the skin at the export pixel ratio, clipped to the skin circle,
/// and encode it as PNG. The affordance is hidden while rendering and its
/// visibility restored afterwards, whether or not rendering succeeded.
pub fn export_png(session: &mut EditorSession, renderer: &mut dyn Renderer) -> RenderResult<Vec<u8>> {
    let was_visible = session.set_affordance_visible(false);
    let result = render_export(session, renderer);
    session.set_affordance_visible(was_visible);
    result
}

fn render_export(session: &EditorSession, renderer: &mut dyn Renderer) -> RenderResult<Vec<u8>> {
    let stage = session.stage_size();
    let ctx = RenderContext::new(session.document(), stage)
        .with_pixel_ratio(session.config().export_pixel_ratio)
        .with_clip(Some(CircleClip::for_stage(stage)))
        .with_affordance(session.selection().affordance());
    let image = renderer.render(&ctx)?;
    log::info!("Exported skin at {}x{}", image.width, image.height);
    encode_png(&image)
}
