use anyhow::{Context, Result, anyhow};
use floorsketch_core::LayerCanvas;
use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref};
use png::{BitDepth, ColorType, Compression, Encoder, FilterType};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Parses generated pages and turns them into PDF or PNG output.
pub struct Renderer {
    options: usvg::Options<'static>,
}

impl Renderer {
    pub fn new() -> Self {
        let mut opt = usvg::Options::default();
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();
        // All page text is set in `monospace`; point it at a face that is
        // actually installed, preferring a fixed-width one.
        let family = fontdb
            .faces()
            .find(|face| face.monospaced)
            .or_else(|| fontdb.faces().next())
            .and_then(|face| face.families.first().map(|(name, _)| name.clone()));
        match family {
            Some(name) => {
                debug!(family = %name, "monospace text font");
                fontdb.set_monospace_family(name);
            }
            None => warn!("no system fonts found, text will be missing from PDF and PNG output"),
        }
        opt.fontdb = Arc::new(fontdb);
        Renderer { options: opt }
    }

    pub fn parse(&self, canvas: &LayerCanvas) -> Result<usvg::Tree> {
        usvg::Tree::from_str(&canvas.svg, &self.options)
            .map_err(|e| anyhow!("SVG parse error in layer \"{}\": {e:?}", canvas.layer))
    }

    /// One PDF page per canvas, in the given order.
    pub fn to_pdf(&self, canvases: &[LayerCanvas]) -> Result<Vec<u8>> {
        let mut alloc = Ref::new(1);
        let catalog_id = alloc.bump();
        let page_tree_id = alloc.bump();
        let svg_name = Name(b"S1");
        let mut pdf = Pdf::new();
        let mut page_ids = Vec::with_capacity(canvases.len());

        for canvas in canvases {
            let tree = self.parse(canvas)?;
            let (chunk, svg_id) = svg2pdf::to_chunk(&tree, svg2pdf::ConversionOptions::default())
                .map_err(|e| anyhow!("PDF conversion of layer \"{}\" failed: {e:?}", canvas.layer))?;
            let mut map = HashMap::new();
            let chunk = chunk.renumber(|old| *map.entry(old).or_insert_with(|| alloc.bump()));
            let svg_id = *map
                .get(&svg_id)
                .context("converted page lost its root object")?;

            let (w, h) = (canvas.width as f32, canvas.height as f32);
            let page_id = alloc.bump();
            let content_id = alloc.bump();
            page_ids.push(page_id);

            let mut page = pdf.page(page_id);
            page.media_box(Rect::new(0.0, 0.0, w, h));
            page.parent(page_tree_id);
            page.contents(content_id);
            page.resources().x_objects().pair(svg_name, svg_id);
            page.finish();

            // The form XObject spans the unit square.
            let mut content = Content::new();
            content
                .save_state()
                .transform([w, 0.0, 0.0, h, 0.0, 0.0])
                .x_object(svg_name)
                .restore_state();
            pdf.stream(content_id, &content.finish());
            pdf.extend(&chunk);
        }

        pdf.catalog(catalog_id).pages(page_tree_id);
        pdf.pages(page_tree_id)
            .kids(page_ids.iter().copied())
            .count(page_ids.len() as i32);
        Ok(pdf.finish())
    }

    /// Rasterize one page at `dpi` and store it as PNG.
    pub fn write_png(&self, canvas: &LayerCanvas, dpi: f32, path: &Path) -> Result<()> {
        let tree = self.parse(canvas)?;
        let k = dpi / 72.0;
        let w_px = (canvas.width as f32 * k).ceil() as u32;
        let h_px = (canvas.height as f32 * k).ceil() as u32;
        let mut pixmap = tiny_skia::Pixmap::new(w_px, h_px).context("pixmap alloc failed")?;
        pixmap.fill(tiny_skia::Color::WHITE);
        let mut pm = pixmap.as_mut();
        resvg::render(&tree, tiny_skia::Transform::from_scale(k, k), &mut pm);
        encode_png_deterministic(&pixmap, path)
    }
}

fn encode_png_deterministic(pixmap: &tiny_skia::Pixmap, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut enc = Encoder::new(file, pixmap.width(), pixmap.height());
    enc.set_color(ColorType::Rgba);
    enc.set_depth(BitDepth::Eight);
    enc.set_filter(FilterType::NoFilter);
    enc.set_compression(Compression::Default);
    let mut writer = enc.write_header()?;
    writer.write_image_data(pixmap.data())?;
    Ok(())
}
