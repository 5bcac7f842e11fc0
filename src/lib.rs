//! Full-screen fragment shaders coloured by the currently playing album art.
//!
//! The render core (program building, the frame loop, palette extraction and
//! shader switching) is written against the [`gl::Gl`] and [`gl::Surface`]
//! traits so it runs under host tests. The browser glue lives in the `wasm`
//! module and only compiles for `wasm32`; of it, only `WebGlBackend` and
//! the `#[wasm_bindgen]` exports are public.

pub mod config;
pub mod error;
pub mod gl;
pub mod now_playing;
pub mod palette;
pub mod program;
pub mod render;
pub mod selector;
pub mod shader;
pub mod uniforms;

pub use config::Config;
pub use error::{CatalogError, ConfigError, PixelBufferError, RenderError};
pub use palette::{extract_palette, Palette, PixelBuffer};
pub use program::{build_program, Program};
pub use render::{FrameReport, LoopPhase, Renderer};
pub use selector::ShaderSelector;
pub use shader::{Catalog, ShaderBody};
pub use uniforms::UniformState;
#[cfg(target_arch = "wasm32")]
pub use wasm::backend::WebGlBackend;

// Only compile wasm-specific code when targeting wasm32.
#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use crate::config::Config;
    use crate::palette::{Palette, PixelBuffer};

    mod album;
    pub mod backend;
    mod input;
    mod render;

    pub(crate) fn to_js(err: impl std::fmt::Display) -> JsValue {
        JsValue::from_str(&err.to_string())
    }

    #[wasm_bindgen(start)]
    pub fn main() {
        console_error_panic_hook::set_once();
    }

    /// Handle returned to the page by [`boot`].
    #[wasm_bindgen]
    pub struct ShaderCanvas {
        visualizer: Rc<RefCell<render::Visualizer>>,
    }

    #[wasm_bindgen]
    impl ShaderCanvas {
        /// Advances to the next shader and returns the new index.
        pub fn next_shader(&self) -> usize {
            self.visualizer.borrow_mut().next()
        }

        pub fn previous_shader(&self) -> usize {
            self.visualizer.borrow_mut().previous()
        }

        /// Name of the program currently drawing.
        pub fn shader_name(&self) -> Option<String> {
            self.visualizer
                .borrow()
                .renderer
                .program_name()
                .map(str::to_string)
        }

        /// Replaces the palette from tightly packed RGBA bytes.
        pub fn set_palette_from_rgba(
            &self,
            width: u32,
            height: u32,
            pixels: &[u8],
        ) -> Result<(), JsValue> {
            let mut visualizer = self.visualizer.borrow_mut();
            let buffer = PixelBuffer::new(width, height, pixels).map_err(to_js)?;
            let palette = Palette::from_pixels(&buffer, visualizer.config.bucket_size);
            visualizer.renderer.replace_palette(palette);
            Ok(())
        }
    }

    fn read_config(canvas: &HtmlCanvasElement) -> Result<Config, JsValue> {
        Config::default()
            .with_overrides(|key| canvas.get_attribute(&format!("data-{key}")))
            .map_err(to_js)
    }

    /// Wires the visualizer to the page and starts the animation loop.
    #[wasm_bindgen]
    pub fn boot() -> Result<ShaderCanvas, JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas_id = Config::default().canvas_id;
        let canvas = document
            .get_element_by_id(&canvas_id)
            .ok_or("canvas not found")?
            .dyn_into::<HtmlCanvasElement>()?;

        let config = read_config(&canvas)?;
        // a second boot keeps the first logger
        console_log::init_with_level(config.log_level).ok();

        let visualizer = render::start(canvas, config.clone())?;
        input::attach(&window, &document, &visualizer)?;

        if let Some(url) = config.now_playing_url.clone() {
            let visualizer = visualizer.clone();
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(err) = album::apply_now_playing(&visualizer, &url).await {
                    log::warn!("album palette unavailable: {err:?}");
                }
            });
        }

        Ok(ShaderCanvas { visualizer })
    }
}
