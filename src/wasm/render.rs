use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{window, HtmlCanvasElement, Window};

use super::backend::WebGlBackend;
use super::to_js;
use crate::config::Config;
use crate::error::RenderError;
use crate::render::Renderer;
use crate::selector::ShaderSelector;
use crate::shader::Catalog;

/// Everything the frame callback and the input handlers share.
pub(crate) struct Visualizer {
    pub renderer: Renderer<WebGlBackend>,
    pub selector: ShaderSelector,
    pub config: Config,
}

impl Visualizer {
    pub fn next(&mut self) -> usize {
        let result = self.selector.next(&mut self.renderer);
        self.report(result)
    }

    pub fn previous(&mut self) -> usize {
        let result = self.selector.previous(&mut self.renderer);
        self.report(result)
    }

    fn report(&self, result: Result<usize, RenderError>) -> usize {
        if let Err(err) = result {
            log::warn!(
                "shader {} failed, still drawing '{}': {err}",
                self.selector.index(),
                self.renderer.program_name().unwrap_or("none")
            );
        }
        self.selector.index()
    }
}

fn schedule(window: &Window, callback: &Closure<dyn FnMut(f64)>) -> Result<i32, JsValue> {
    window.request_animation_frame(callback.as_ref().unchecked_ref())
}

/// Creates the renderer on `canvas` and starts the animation loop.
pub(crate) fn start(
    canvas: HtmlCanvasElement,
    config: Config,
) -> Result<Rc<RefCell<Visualizer>>, JsValue> {
    let window = window().ok_or("no window")?;
    let backend = WebGlBackend::new(canvas, config.antialias).map_err(to_js)?;
    log::debug!("canvas '{}' has a WebGL2 context", backend.canvas().id());

    let mut renderer = Renderer::new(backend);
    let catalog = Catalog::builtin().map_err(to_js)?;
    let selector =
        ShaderSelector::initialize(catalog, config.initial_shader, &mut renderer).map_err(to_js)?;
    renderer.start().map_err(to_js)?;

    let visualizer = Rc::new(RefCell::new(Visualizer {
        renderer,
        selector,
        config,
    }));

    // `f` holds the animation-frame closure so that it can keep requesting
    // itself. The closure is created first and then stored, which is why it
    // sits behind an `Option`.
    let f: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    let state = visualizer.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
        if let Err(err) = state.borrow_mut().renderer.tick(timestamp) {
            log::error!("frame skipped: {err}");
        }

        // schedule next
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Some(callback) = f.borrow().as_ref() {
            if let Err(err) = schedule(&window, callback) {
                log::error!("animation loop stopped: {err:?}");
            }
        }
    }) as Box<dyn FnMut(f64)>));

    if let Some(callback) = g.borrow().as_ref() {
        schedule(&window, callback)?;
    }

    Ok(visualizer)
}
